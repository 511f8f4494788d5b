// src/handlers/auth.rs

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::JsonBody, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthCheckResponse, LoginPayload, LoginResponse, PerfilResponse},
        convite::{ConfirmarConvitePayload, ConviteConfirmado, ConviteValidado, TokenQuery},
        roles::papel_principal,
    },
};

// Handler de login (telefone ou e-mail + senha)
#[utoipa::path(
    post,
    path = "/api/mobile/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token JWT e dados do perfil")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<LoginPayload>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    payload.validate()?;
    let resposta = app_state.auth_service.login(&payload).await?;
    Ok(Json(ApiResponse::ok(resposta)))
}

#[utoipa::path(
    get,
    path = "/api/mobile/auth/check",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão válida")
    ),
    security(("api_jwt" = []))
)]
pub async fn check(AuthenticatedUser(profile): AuthenticatedUser) -> Json<ApiResponse<AuthCheckResponse>> {
    Json(ApiResponse::ok(AuthCheckResponse {
        authenticated: true,
        role: papel_principal(&profile.papeis()),
    }))
}

#[utoipa::path(
    get,
    path = "/api/mobile/profile",
    tag = "Auth",
    responses(
        (status = 200, description = "Perfil com papel principal e opções de convite")
    ),
    security(("api_jwt" = []))
)]
pub async fn profile(AuthenticatedUser(profile): AuthenticatedUser) -> Json<ApiResponse<PerfilResponse>> {
    Json(ApiResponse::ok(PerfilResponse::from(profile)))
}

// GET: a tela de onboarding consulta o convite antes de pedir a senha
#[utoipa::path(
    get,
    path = "/api/mobile/auth/confirmar-convite",
    tag = "Convites",
    responses(
        (status = 200, description = "Convite válido para onboarding")
    ),
    params(
        ("token" = String, Query, description = "Token do convite")
    )
)]
pub async fn validar_convite(
    State(app_state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<ApiResponse<ConviteValidado>>, AppError> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Token é obrigatório".into()))?;

    let convite = app_state.convite_service.validar(&token).await?;
    Ok(Json(ApiResponse::ok(convite)))
}

#[utoipa::path(
    post,
    path = "/api/mobile/auth/confirmar-convite",
    tag = "Convites",
    request_body = ConfirmarConvitePayload,
    responses(
        (status = 200, description = "Senha criada e perfil vinculado")
    )
)]
pub async fn confirmar_convite(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<ConfirmarConvitePayload>,
) -> Result<Json<ApiResponse<ConviteConfirmado>>, AppError> {
    let confirmado = app_state.convite_service.confirmar(payload).await?;
    Ok(Json(ApiResponse::ok(confirmado)))
}

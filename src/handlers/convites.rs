// src/handlers/convites.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, extract::JsonBody, response::ApiResponse},
    config::AppState,
    middleware::auth::{AuthenticatedUser, CampanhaContext},
    models::{
        campanha::OnboardingAdminPayload,
        convite::{
            AceitarConviteEleitorPayload, ConviteAdminPayload, EmitirConvitePayload, OrigemConvite, PlanoTipo,
            TokenQuery,
        },
        roles::{pode_convidar_algum, Role},
    },
};

// --- Convites da equipe ---

#[utoipa::path(
    get,
    path = "/api/mobile/convites",
    tag = "Convites",
    responses(
        (status = 200, description = "Convites pendentes da campanha")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
) -> Result<impl IntoResponse, AppError> {
    let convites = app_state.convite_service.listar_pendentes(campanha_id).await?;
    Ok(Json(ApiResponse::ok(convites)))
}

#[utoipa::path(
    post,
    path = "/api/mobile/convites",
    tag = "Convites",
    request_body = EmitirConvitePayload,
    responses(
        (status = 201, description = "Convite emitido com link e mensagem de WhatsApp")
    ),
    security(("api_jwt" = []))
)]
pub async fn emitir(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<EmitirConvitePayload>,
) -> Result<impl IntoResponse, AppError> {
    let criado = app_state.convite_service.emitir(&profile, campanha_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(criado))))
}

#[utoipa::path(
    delete,
    path = "/api/mobile/convites/{id}",
    tag = "Convites",
    responses(
        (status = 200, description = "Convite cancelado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancelar(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let convite = app_state.convite_service.cancelar(&profile, campanha_id, id).await?;
    Ok(Json(ApiResponse::ok(convite)))
}

// --- Links de eleitor ---

#[utoipa::path(
    post,
    path = "/api/mobile/convites/eleitor",
    tag = "Convites",
    responses(
        (status = 201, description = "Link de indicação de eleitor")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_convite_eleitor(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    CampanhaContext(campanha_id): CampanhaContext,
) -> Result<impl IntoResponse, AppError> {
    let criado = app_state
        .convite_service
        .gerar_convite_eleitor(&profile, campanha_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(criado))))
}

#[utoipa::path(
    get,
    path = "/api/public/convite-eleitor",
    tag = "Convites",
    responses(
        (status = 200, description = "Dados públicos da campanha do link")
    ),
    params(
        ("token" = String, Query, description = "Token do link")
    )
)]
pub async fn validar_convite_eleitor(
    State(app_state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, AppError> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Token é obrigatório".into()))?;

    let publico = app_state.convite_service.validar_convite_eleitor(&token).await?;
    Ok(Json(ApiResponse::ok(publico)))
}

#[utoipa::path(
    post,
    path = "/api/public/convite-eleitor",
    tag = "Convites",
    request_body = AceitarConviteEleitorPayload,
    responses(
        (status = 201, description = "Eleitor cadastrado e novo link gerado")
    )
)]
pub async fn aceitar_convite_eleitor(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<AceitarConviteEleitorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let aceito = app_state.convite_service.aceitar_convite_eleitor(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(aceito))))
}

// --- Administradores ---

// Convite de cortesia enviado manualmente
#[utoipa::path(
    post,
    path = "/api/admin/invite",
    tag = "Admin",
    request_body = ConviteAdminPayload,
    responses(
        (status = 201, description = "Convite de administrador enviado")
    ),
    security(("api_jwt" = []))
)]
pub async fn convidar_admin(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    JsonBody(payload): JsonBody<ConviteAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if !pode_convidar_algum(&profile.papeis(), Role::Admin) {
        return Err(AppError::Forbidden("Apenas o master admin pode convidar administradores".into()));
    }

    let enviado = app_state
        .convite_service
        .convidar_admin(
            &payload.email,
            OrigemConvite::Masteradmin,
            PlanoTipo::Cortesia,
            Some(profile.id),
            None,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(enviado))))
}

#[utoipa::path(
    post,
    path = "/api/onboarding/admin",
    tag = "Admin",
    request_body = OnboardingAdminPayload,
    responses(
        (status = 201, description = "Campanha criada")
    ),
    security(("api_jwt" = []))
)]
pub async fn onboarding_admin(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    JsonBody(payload): JsonBody<OnboardingAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    let campanha = app_state
        .convite_service
        .concluir_onboarding_admin(&profile, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(campanha))))
}

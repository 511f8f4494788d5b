// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::auth::Profile};

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn autenticar(app_state: &AppState, headers: &HeaderMap) -> Result<Profile, AppError> {
    let token = bearer_token(headers).ok_or(AppError::InvalidToken)?;
    app_state.auth_service.validate_token(token).await
}

// Exige um JWT válido e um perfil ativo
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let profile = autenticar(&app_state, request.headers()).await?;

    // Insere o perfil nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(profile));
    Ok(next.run(request).await)
}

// Como o auth_guard, mas o perfil precisa estar vinculado a uma campanha.
// A campanha vem sempre do perfil, nunca da requisição.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let profile = autenticar(&app_state, request.headers()).await?;
    let campanha_id = profile.campanha_id.ok_or(AppError::SemCampanha)?;

    request.extensions_mut().insert(CampanhaContext(campanha_id));
    request.extensions_mut().insert(AuthenticatedUser(profile));
    Ok(next.run(request).await)
}

// Extrator para obter o perfil autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Profile);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

// O tenant da requisição (campanha do perfil autenticado)
#[derive(Debug, Clone, Copy)]
pub struct CampanhaContext(pub Uuid);

impl<S> FromRequestParts<S> for CampanhaContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CampanhaContext>()
            .copied()
            .ok_or(AppError::SemCampanha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer eyJabc"));
        assert_eq!(bearer_token(&headers), Some("eyJabc"));
    }
}

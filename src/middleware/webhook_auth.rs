// src/middleware/webhook_auth.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Basic, Authorization, HeaderMapExt};

use crate::{common::error::AppError, config::AppState};

// Comparação sem retorno antecipado no conteúdo
fn iguais(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn credenciais_validas(
    recebidas: Option<&Authorization<Basic>>,
    usuario: Option<&str>,
    senha: Option<&str>,
) -> bool {
    let (Some(auth), Some(usuario), Some(senha)) = (recebidas, usuario, senha) else {
        return false;
    };
    // As duas comparações sempre rodam
    let usuario_ok = iguais(auth.0.username(), usuario);
    let senha_ok = iguais(auth.0.password(), senha);
    usuario_ok & senha_ok
}

/// Basic Auth do webhook da Pagar.me. Sem credenciais configuradas, nada passa.
pub async fn webhook_basic_auth(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let recebidas = request.headers().typed_get::<Authorization<Basic>>();

    if !credenciais_validas(
        recebidas.as_ref(),
        app_state.settings.pagarme_webhook_user.as_deref(),
        app_state.settings.pagarme_webhook_password.as_deref(),
    ) {
        tracing::warn!("🔒 Webhook rejeitado: credenciais ausentes ou inválidas");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_credentials_pass() {
        let auth = Authorization::basic("pagarme", "s3nha");
        assert!(credenciais_validas(Some(&auth), Some("pagarme"), Some("s3nha")));
        assert!(!credenciais_validas(Some(&auth), Some("pagarme"), Some("s3nhA")));
        assert!(!credenciais_validas(Some(&auth), Some("pagar"), Some("s3nha")));
        assert!(!credenciais_validas(None, Some("pagarme"), Some("s3nha")));
    }

    #[test]
    fn unconfigured_credentials_reject_everything() {
        let auth = Authorization::basic("", "");
        assert!(!credenciais_validas(Some(&auth), None, None));
        assert!(!credenciais_validas(Some(&auth), Some(""), None));
    }
}

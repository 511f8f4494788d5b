// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Tipo de erro único da aplicação. Toda falha vira o envelope
// { success: false, data: null, error: "..." } com o status adequado.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Usuário inativo")]
    UsuarioInativo,

    #[error("Token inválido")]
    InvalidToken,

    // Webhook sem Basic Auth válido
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("Perfil sem campanha vinculada")]
    SemCampanha,

    #[error("{0}")]
    NotFound(String),

    #[error("Convite não encontrado")]
    ConviteNaoEncontrado,

    #[error("Este convite já foi utilizado")]
    ConviteJaUtilizado,

    #[error("Este convite foi cancelado")]
    ConviteCancelado,

    #[error("Este convite expirou")]
    ConviteExpirado,

    #[error("{0}")]
    UniqueConstraintViolation(String),

    #[error("Pagamento recusado: {0}")]
    PagamentoRecusado(String),

    #[error("Erro do gateway de pagamento ({status}): {message}")]
    GatewayError { status: u16, message: String },

    #[error("Webhook inválido: {0}")]
    WebhookInvalido(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de comunicação HTTP: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::ConviteJaUtilizado
            | AppError::ConviteCancelado
            | AppError::ConviteExpirado
            | AppError::WebhookInvalido(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::UsuarioInativo
            | AppError::InvalidToken
            | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PagamentoRecusado(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::Forbidden(_) | AppError::SemCampanha => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::ConviteNaoEncontrado => StatusCode::NOT_FOUND,
            AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::GatewayError { status, .. } => {
                // 4xx do gateway é repassado; 5xx vira 502
                match StatusCode::from_u16(*status) {
                    Ok(code) if code.is_client_error() => code,
                    _ => StatusCode::BAD_GATEWAY,
                }
            }
            AppError::HttpClientError(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match &self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "success": false,
                    "data": null,
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidCredentials => "Telefone/e-mail ou senha inválidos.".to_string(),
            AppError::UsuarioInativo => {
                "Usuário inativo. Entre em contato com o coordenador.".to_string()
            }
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::HttpClientError(e) => {
                tracing::error!("🔥 Falha na chamada ao gateway: {}", e);
                "Falha ao comunicar com o gateway de pagamento.".to_string()
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => {
                tracing::error!("🔥 Erro Interno do Servidor: {}", self);
                "Erro interno do servidor".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "data": null,
            "error": error_message,
        }));
        (status, body).into_response()
    }
}

// Converte violação de unicidade em 409 com a mensagem informada
pub(crate) fn map_unique_violation(e: sqlx::Error, message: impl Into<String>) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(message.into());
        }
    }
    AppError::DatabaseError(e)
}

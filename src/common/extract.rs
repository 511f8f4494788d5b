// src/common/extract.rs

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use crate::common::error::AppError;

/// `Json<T>` cuja rejeição sai no envelope padrão com 400.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(valor) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("JSON inválido: {}", e.body_text())))?;
        Ok(JsonBody(valor))
    }
}

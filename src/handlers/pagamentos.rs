// src/handlers/pagamentos.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    common::{error::AppError, extract::JsonBody, response::ApiResponse},
    config::AppState,
    models::pedido::{CheckoutPayload, CheckoutResponse, ConsultaGatewayQuery, StatusPedido, WebhookEvento, WebhookRecebido},
    services::gateway::ConsultaPedido,
};

#[utoipa::path(
    post,
    path = "/api/pagarme/checkout",
    tag = "Pagamentos",
    request_body = CheckoutPayload,
    responses(
        (status = 200, description = "Pedido enviado ao gateway")
    )
)]
pub async fn checkout(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CheckoutPayload>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, AppError> {
    let resposta = app_state.pagamento_service.checkout(payload).await?;
    Ok(Json(ApiResponse::ok(resposta)))
}

#[utoipa::path(
    get,
    path = "/api/pagarme/orders",
    tag = "Pagamentos",
    responses(
        (status = 200, description = "Pedido consultado na Pagar.me")
    ),
    params(
        ("orderId" = String, Query, description = "ID do pedido na Pagar.me")
    )
)]
pub async fn consultar_gateway(
    State(app_state): State<AppState>,
    Query(query): Query<ConsultaGatewayQuery>,
) -> Result<Json<ApiResponse<ConsultaPedido>>, AppError> {
    let pedido = app_state
        .pagamento_service
        .consultar_gateway(query.order_id.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(pedido)))
}

// Polling do status local pela página de obrigado
#[utoipa::path(
    get,
    path = "/api/pedidos/{codigo}",
    tag = "Pagamentos",
    responses(
        (status = 200, description = "Status local do pedido")
    ),
    params(
        ("codigo" = String, Path, description = "Código do pedido")
    )
)]
pub async fn consultar_pedido(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<Json<ApiResponse<StatusPedido>>, AppError> {
    let pedido = app_state.pagamento_service.consultar_local(&codigo).await?;
    Ok(Json(ApiResponse::ok(StatusPedido::from(pedido))))
}

// Só chega aqui depois do webhook_basic_auth
#[utoipa::path(
    post,
    path = "/api/webhooks/pagarme",
    tag = "Pagamentos",
    responses(
        (status = 200, description = "Evento recebido")
    ),
    security(("pagarme_basic" = []))
)]
pub async fn webhook_pagarme(
    State(app_state): State<AppState>,
    payload: Result<Json<WebhookEvento>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<ApiResponse<WebhookRecebido>>, AppError> {
    let Json(evento) = payload.map_err(|e| AppError::WebhookInvalido(e.body_text()))?;
    let recebido = app_state.pagamento_service.processar_webhook(evento).await?;
    Ok(Json(ApiResponse::ok(recebido)))
}

// src/models/pedido.rs

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};
use utoipa::ToSchema;

use crate::common::{error::AppError, format::somente_digitos};

// --- ENUMS ---

// Mapeia o CREATE TYPE pedido_status do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "pedido_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PedidoStatus {
    Pending,
    Processing,
    Paid,
    Failed,
    Expired,
}

impl PedidoStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PedidoStatus::Paid | PedidoStatus::Failed | PedidoStatus::Expired)
    }

    /// Regras de transição. `pending -> paid` existe porque o webhook pode
    /// chegar antes de o checkout gravar o `processing`.
    pub fn pode_transicionar_para(&self, destino: PedidoStatus) -> bool {
        use PedidoStatus::*;
        match (self, destino) {
            (Pending, Processing | Paid | Failed | Expired) => true,
            (Processing, Paid | Failed | Expired) => true,
            _ => false,
        }
    }

    /// Estados a partir dos quais `destino` é alcançável (usado no UPDATE condicional).
    pub fn predecessores(destino: PedidoStatus) -> Vec<PedidoStatus> {
        [
            PedidoStatus::Pending,
            PedidoStatus::Processing,
            PedidoStatus::Paid,
            PedidoStatus::Failed,
            PedidoStatus::Expired,
        ]
        .into_iter()
        .filter(|origem| origem.pode_transicionar_para(destino))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "meio_pagamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MeioPagamento {
    CreditCard,
    Pix,
    Boleto,
}

impl MeioPagamento {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeioPagamento::CreditCard => "credit_card",
            MeioPagamento::Pix => "pix",
            MeioPagamento::Boleto => "boleto",
        }
    }
}

// --- PEDIDO (registro local da tentativa de pagamento) ---

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Pedido {
    pub id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub documento: String,
    pub plano_slug: String,
    pub plano_nome: String,
    pub valor: Decimal,
    pub meio_pagamento: MeioPagamento,
    pub status: PedidoStatus,
    pub pagarme_order_id: Option<String>,
    pub pagarme_charge_id: Option<String>,
    pub erro: Option<String>,
    pub convite_enviado_em: Option<DateTime<Utc>>,
    pub webhook_recebido_em: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para inserir o pedido antes de chamar o gateway
#[derive(Debug, Clone)]
pub struct NovoPedido {
    pub codigo: String,
    pub nome: String,
    pub email: String,
    pub documento: String,
    pub plano_slug: String,
    pub plano_nome: String,
    pub valor: Decimal,
    pub meio_pagamento: MeioPagamento,
}

const CODIGO_ALFABETO: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Código local do pedido: `ped_<millis>_<6 caracteres>`.
pub fn gerar_codigo() -> String {
    let mut rng = rand::rng();
    let sufixo: String = (0..6)
        .map(|_| CODIGO_ALFABETO[rng.random_range(0..CODIGO_ALFABETO.len())] as char)
        .collect();
    format!("ped_{}_{}", Utc::now().timestamp_millis(), sufixo)
}

/// Slug do plano a partir do código/descrição do item.
pub fn extrair_plano_slug(codigo: Option<&str>, descricao: Option<&str>) -> &'static str {
    let codigo = codigo.unwrap_or_default().to_lowercase();
    let descricao = descricao.unwrap_or_default().to_lowercase();

    if codigo.contains("profissional") || descricao.contains("profissional") {
        "profissional"
    } else if codigo.contains("cortesia") || descricao.contains("cortesia") {
        "cortesia"
    } else {
        "basico"
    }
}

// --- CHECKOUT ---

fn validar_documento(documento: &String) -> Result<(), ValidationError> {
    if somente_digitos(documento).len() < 11 {
        let mut err = ValidationError::new("cpf");
        err.message = Some("CPF obrigatório".into());
        return Err(err);
    }
    Ok(())
}

fn validar_numero_cartao(numero: &String) -> Result<(), ValidationError> {
    let digitos = somente_digitos(numero);
    if !(13..=19).contains(&digitos.len()) {
        let mut err = ValidationError::new("card_number");
        err.message = Some("Número do cartão inválido".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CustomerPayload {
    #[validate(length(min = 1, message = "Nome obrigatório"))]
    pub name: String,

    #[validate(email(message = "Email inválido"))]
    pub email: String,

    #[validate(custom(function = "validar_documento"))]
    #[schema(example = "529.982.247-25")]
    pub document: String,

    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ItemPayload {
    // Valor em centavos
    #[validate(range(min = 1, max = 100_000_000, message = "Valor do item fora do limite"))]
    #[schema(example = 49900)]
    pub amount: i64,

    #[validate(length(min = 1, message = "Descrição obrigatória"))]
    pub description: String,

    #[serde(default = "quantidade_padrao")]
    #[validate(range(min = 1, max = 1000, message = "Quantidade fora do limite"))]
    pub quantity: i64,

    pub code: Option<String>,
}

fn quantidade_padrao() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CardPayload {
    #[validate(custom(function = "validar_numero_cartao"))]
    pub number: String,

    #[validate(length(min = 1, message = "Nome do titular obrigatório"))]
    pub holder_name: String,

    #[validate(range(min = 1, max = 12, message = "Mês de validade inválido"))]
    pub exp_month: u32,

    #[validate(range(min = 0, message = "Ano de validade inválido"))]
    pub exp_year: i32,

    #[validate(length(min = 3, max = 4, message = "CVV inválido"))]
    pub cvv: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CheckoutPayload {
    #[validate(nested)]
    pub customer: CustomerPayload,

    #[validate(length(min = 1, message = "Pelo menos um item é obrigatório"), nested)]
    pub items: Vec<ItemPayload>,

    pub payment_method: MeioPagamento,

    #[validate(nested)]
    pub card: Option<CardPayload>,
}

impl CheckoutPayload {
    /// Validação de formato completa (campos + regra do cartão).
    pub fn validar(&self) -> Result<(), AppError> {
        self.validate()?;
        self.total_centavos()?;
        if self.payment_method == MeioPagamento::CreditCard && self.card.is_none() {
            return Err(AppError::BadRequest(
                "Dados do cartão são obrigatórios para pagamento com cartão de crédito".into(),
            ));
        }
        Ok(())
    }

    pub fn total_centavos(&self) -> Result<i64, AppError> {
        self.items
            .iter()
            .try_fold(0i64, |total, item| {
                item.amount
                    .checked_mul(item.quantity)
                    .and_then(|subtotal| total.checked_add(subtotal))
            })
            .ok_or_else(|| AppError::BadRequest("Valor total do pedido fora do limite".into()))
    }

    pub fn novo_pedido(&self, codigo: String) -> Result<NovoPedido, AppError> {
        let primeiro = self.items.first();
        Ok(NovoPedido {
            codigo,
            nome: self.customer.name.trim().to_string(),
            email: self.customer.email.trim().to_lowercase(),
            documento: somente_digitos(&self.customer.document),
            plano_slug: extrair_plano_slug(
                primeiro.and_then(|i| i.code.as_deref()),
                primeiro.map(|i| i.description.as_str()),
            )
            .to_string(),
            plano_nome: primeiro.map(|i| i.description.clone()).unwrap_or_default(),
            valor: Decimal::new(self.total_centavos()?, 2),
            meio_pagamento: self.payment_method,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub pagarme_order_id: Option<String>,
    pub status: PedidoStatus,
    pub charge_id: Option<String>,
    pub pix_qr_code: Option<String>,
    pub pix_qr_code_url: Option<String>,
    pub boleto_url: Option<String>,
    pub boleto_barcode: Option<String>,
}

// Visão pública do pedido (a página de obrigado faz polling sem login)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusPedido {
    pub order_id: String,
    pub status: PedidoStatus,
    pub plano_nome: String,
    pub convite_enviado: bool,
    pub erro: Option<String>,
}

impl From<Pedido> for StatusPedido {
    fn from(pedido: Pedido) -> Self {
        Self {
            order_id: pedido.codigo,
            status: pedido.status,
            plano_nome: pedido.plano_nome,
            convite_enviado: pedido.convite_enviado_em.is_some(),
            erro: pedido.erro,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultaGatewayQuery {
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRecebido {
    pub received: bool,
    pub event_type: String,
    pub processed_at: DateTime<Utc>,
}

// --- WEBHOOK (payload enviado pela Pagar.me) ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookEvento {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub tipo: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookMetadata {
    pub local_order_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookCustomer {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookItem {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookCharge {
    pub id: Option<String>,
    pub status: Option<String>,
}

// `data` de um evento order.*
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPedido {
    pub id: Option<String>,
    pub code: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<WebhookMetadata>,
    #[serde(default)]
    pub customer: Option<WebhookCustomer>,
    #[serde(default)]
    pub items: Vec<WebhookItem>,
    #[serde(default)]
    pub charges: Vec<WebhookCharge>,
}

impl WebhookPedido {
    pub fn local_order_id(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.local_order_id.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .filter(|e| !e.trim().is_empty())
    }

    pub fn plano_slug(&self) -> &'static str {
        let item = self.items.first();
        extrair_plano_slug(
            item.and_then(|i| i.code.as_deref().or(i.id.as_deref())),
            item.and_then(|i| i.description.as_deref()),
        )
    }

    // Primeira cobrança; sem cobranças, o próprio id do pedido
    pub fn charge_id(&self) -> Option<&str> {
        self.charges
            .first()
            .and_then(|c| c.id.as_deref())
            .or(self.id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(metodo: &str) -> CheckoutPayload {
        serde_json::from_value(json!({
            "customer": { "name": "Tony Stark", "email": "Tony@Avengers.com", "document": "930.951.352-70" },
            "items": [{ "amount": 9900, "description": "Plano Profissional", "quantity": 2 }],
            "payment_method": metodo
        }))
        .unwrap()
    }

    #[test]
    fn transitions_follow_lifecycle() {
        use PedidoStatus::*;
        assert!(Pending.pode_transicionar_para(Processing));
        assert!(Pending.pode_transicionar_para(Paid));
        assert!(Processing.pode_transicionar_para(Paid));
        assert!(Processing.pode_transicionar_para(Expired));
        assert!(!Paid.pode_transicionar_para(Failed));
        assert!(!Processing.pode_transicionar_para(Pending));
        assert!(!Paid.pode_transicionar_para(Paid));
    }

    #[test]
    fn failed_never_becomes_paid() {
        assert!(!PedidoStatus::Failed.pode_transicionar_para(PedidoStatus::Paid));
        assert!(!PedidoStatus::predecessores(PedidoStatus::Paid).contains(&PedidoStatus::Failed));
        assert_eq!(
            PedidoStatus::predecessores(PedidoStatus::Paid),
            vec![PedidoStatus::Pending, PedidoStatus::Processing]
        );
    }

    #[test]
    fn codigo_format() {
        let codigo = gerar_codigo();
        let partes: Vec<&str> = codigo.split('_').collect();
        assert_eq!(partes.len(), 3);
        assert_eq!(partes[0], "ped");
        assert!(partes[1].parse::<i64>().is_ok());
        assert_eq!(partes[2].len(), 6);
        assert!(partes[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn plano_slug_from_item() {
        assert_eq!(extrair_plano_slug(Some("profissional"), None), "profissional");
        assert_eq!(extrair_plano_slug(None, Some("Plano Cortesia")), "cortesia");
        assert_eq!(extrair_plano_slug(Some("x"), Some("Plano Básico")), "basico");
        assert_eq!(extrair_plano_slug(None, None), "basico");
    }

    #[test]
    fn pix_payload_is_valid_and_builds_order() {
        let p = payload("pix");
        assert!(p.validar().is_ok());
        assert_eq!(p.total_centavos().unwrap(), 19800);

        let novo = p.novo_pedido("ped_1_ABCDEF".into()).unwrap();
        assert_eq!(novo.documento, "93095135270");
        assert_eq!(novo.email, "tony@avengers.com");
        assert_eq!(novo.plano_slug, "profissional");
        assert_eq!(novo.valor, Decimal::new(19800, 2));
        assert_eq!(novo.meio_pagamento, MeioPagamento::Pix);
    }

    #[test]
    fn oversized_items_are_rejected_without_overflow() {
        let mut p = payload("pix");
        p.items[0].amount = 4_611_686_018_427_387_904;
        p.items[0].quantity = 2;
        assert!(matches!(p.validar(), Err(AppError::ValidationError(_))));
        assert!(matches!(p.total_centavos(), Err(AppError::BadRequest(_))));
        assert!(p.novo_pedido("ped_1_ABCDEF".into()).is_err());

        let mut p = payload("pix");
        p.items[0].quantity = 1001;
        assert!(matches!(p.validar(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn total_at_the_limits_fits() {
        let mut p = payload("pix");
        p.items = vec![
            ItemPayload { amount: 100_000_000, description: "A".into(), quantity: 1000, code: None };
            3
        ];
        assert!(p.validar().is_ok());
        assert_eq!(p.total_centavos().unwrap(), 300_000_000_000);
    }

    #[test]
    fn credit_card_requires_card() {
        let p = payload("credit_card");
        assert!(matches!(p.validar(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let mut p = payload("pix");
        p.customer.document = "123".into();
        assert!(matches!(p.validar(), Err(AppError::ValidationError(_))));

        let mut p = payload("pix");
        p.items.clear();
        assert!(matches!(p.validar(), Err(AppError::ValidationError(_))));

        let mut p = payload("pix");
        p.items[0].amount = 0;
        assert!(matches!(p.validar(), Err(AppError::ValidationError(_))));

        let mut p = payload("credit_card");
        p.card = Some(CardPayload {
            number: "4000".into(),
            holder_name: "Tony Stark".into(),
            exp_month: 13,
            exp_year: 30,
            cvv: "1".into(),
        });
        assert!(matches!(p.validar(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn webhook_order_data_is_extracted() {
        let evento: WebhookEvento = serde_json::from_value(json!({
            "id": "hook_1",
            "type": "order.paid",
            "data": {
                "id": "or_123",
                "code": "ped_1_ABCDEF",
                "metadata": { "local_order_id": "c0ffee00-0000-0000-0000-000000000000" },
                "customer": { "email": "pepper@stark.com", "name": "Pepper" },
                "items": [{ "id": "oi_1", "code": "plano-profissional", "description": "Plano" }],
                "charges": [{ "id": "ch_9", "status": "paid" }]
            }
        }))
        .unwrap();

        assert_eq!(evento.tipo, "order.paid");
        let data: WebhookPedido = serde_json::from_value(evento.data).unwrap();
        assert_eq!(data.local_order_id(), Some("c0ffee00-0000-0000-0000-000000000000"));
        assert_eq!(data.email(), Some("pepper@stark.com"));
        assert_eq!(data.plano_slug(), "profissional");
        assert_eq!(data.charge_id(), Some("ch_9"));
    }

    #[test]
    fn webhook_order_without_charges_uses_order_id() {
        let data: WebhookPedido = serde_json::from_value(json!({ "id": "or_1", "customer": { "email": " " } })).unwrap();
        assert_eq!(data.charge_id(), Some("or_1"));
        assert_eq!(data.email(), None);
        assert_eq!(data.plano_slug(), "basico");
    }
}

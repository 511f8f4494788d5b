// src/services/gateway.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    common::{error::AppError, format::somente_digitos},
    models::pedido::{CheckoutPayload, MeioPagamento, Pedido},
};

const DESCRITOR_FATURA: &str = "CAMPANHA";
const PIX_EXPIRA_SEGUNDOS: u32 = 3600;
const BOLETO_DIAS_VENCIMENTO: i64 = 3;

// =============================================================================
//  CONTRATO
// =============================================================================

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn criar_pedido(&self, pedido: &PedidoGateway) -> Result<RespostaGateway, AppError>;
    async fn consultar_pedido(&self, order_id: &str) -> Result<ConsultaPedido, AppError>;
}

// =============================================================================
//  PAYLOAD ENVIADO (Pagar.me core v5)
// =============================================================================

#[derive(Debug, Serialize)]
pub struct PedidoGateway {
    pub code: String,
    pub customer: ClienteGateway,
    pub items: Vec<ItemGateway>,
    pub payments: Vec<PagamentoGateway>,
    pub metadata: MetadataGateway,
}

#[derive(Debug, Serialize)]
pub struct ClienteGateway {
    pub name: String,
    pub email: String,
    pub document: String,
    #[serde(rename = "type")]
    pub tipo: &'static str,
    pub document_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<TelefonesGateway>,
}

#[derive(Debug, Serialize)]
pub struct TelefonesGateway {
    pub mobile_phone: TelefoneGateway,
}

#[derive(Debug, Serialize)]
pub struct TelefoneGateway {
    pub country_code: &'static str,
    pub area_code: String,
    pub number: String,
}

#[derive(Debug, Serialize)]
pub struct ItemGateway {
    pub amount: i64,
    pub description: String,
    pub quantity: i64,
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "payment_method", rename_all = "snake_case")]
pub enum PagamentoGateway {
    CreditCard { credit_card: CartaoGateway },
    Pix { pix: PixGateway },
    Boleto { boleto: BoletoGateway },
}

#[derive(Debug, Serialize)]
pub struct CartaoGateway {
    pub installments: u32,
    pub statement_descriptor: &'static str,
    pub card: DadosCartao,
}

#[derive(Debug, Serialize)]
pub struct DadosCartao {
    pub number: String,
    pub holder_name: String,
    pub exp_month: u32,
    pub exp_year: i32,
    pub cvv: String,
}

#[derive(Debug, Serialize)]
pub struct PixGateway {
    pub expires_in: u32,
}

#[derive(Debug, Serialize)]
pub struct BoletoGateway {
    pub instructions: &'static str,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MetadataGateway {
    pub local_order_id: String,
}

fn telefone_gateway(telefone: Option<&str>) -> Option<TelefonesGateway> {
    let digitos = somente_digitos(telefone?);
    if !(10..=11).contains(&digitos.len()) {
        return None;
    }
    let (ddd, numero) = digitos.split_at(2);
    Some(TelefonesGateway {
        mobile_phone: TelefoneGateway {
            country_code: "55",
            area_code: ddd.to_string(),
            number: numero.to_string(),
        },
    })
}

impl PedidoGateway {
    /// Monta o pedido do gateway a partir da linha local já gravada.
    /// O `code` e o `local_order_id` permitem ao webhook achar o pedido de volta.
    pub fn montar(pedido: &Pedido, payload: &CheckoutPayload, agora: DateTime<Utc>) -> Self {
        let pagamento = match (payload.payment_method, payload.card.as_ref()) {
            (MeioPagamento::CreditCard, Some(card)) => PagamentoGateway::CreditCard {
                credit_card: CartaoGateway {
                    installments: 1,
                    statement_descriptor: DESCRITOR_FATURA,
                    card: DadosCartao {
                        number: somente_digitos(&card.number),
                        holder_name: card.holder_name.clone(),
                        exp_month: card.exp_month,
                        exp_year: card.exp_year,
                        cvv: card.cvv.clone(),
                    },
                },
            },
            (MeioPagamento::Boleto, _) => PagamentoGateway::Boleto {
                boleto: BoletoGateway {
                    instructions: "Pagar até o vencimento",
                    due_at: agora + chrono::Duration::days(BOLETO_DIAS_VENCIMENTO),
                },
            },
            // Cartão sem dados é barrado na validação; pix é o padrão
            _ => PagamentoGateway::Pix {
                pix: PixGateway { expires_in: PIX_EXPIRA_SEGUNDOS },
            },
        };

        Self {
            code: pedido.codigo.clone(),
            customer: ClienteGateway {
                name: pedido.nome.clone(),
                email: pedido.email.clone(),
                document: pedido.documento.clone(),
                tipo: "individual",
                document_type: "CPF",
                phones: telefone_gateway(payload.customer.phone.as_deref()),
            },
            items: payload
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| ItemGateway {
                    amount: item.amount,
                    description: item.description.clone(),
                    quantity: item.quantity,
                    code: item.code.clone().unwrap_or_else(|| format!("item_{}", i + 1)),
                })
                .collect(),
            payments: vec![pagamento],
            metadata: MetadataGateway {
                local_order_id: pedido.id.to_string(),
            },
        }
    }
}

// =============================================================================
//  RESPOSTAS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RespostaGateway {
    pub id: String,
    pub code: Option<String>,
    pub status: String,
    #[serde(default)]
    pub charges: Vec<CobrancaGateway>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CobrancaGateway {
    pub id: Option<String>,
    pub status: Option<String>,
    pub last_transaction: Option<TransacaoGateway>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransacaoGateway {
    pub status: Option<String>,
    pub qr_code: Option<String>,
    pub qr_code_url: Option<String>,
    pub url: Option<String>,
    pub pdf: Option<String>,
    pub line: Option<String>,
    pub barcode: Option<String>,
    pub acquirer_message: Option<String>,
}

impl RespostaGateway {
    pub fn cobranca(&self) -> Option<&CobrancaGateway> {
        self.charges.first()
    }

    pub fn transacao(&self) -> Option<&TransacaoGateway> {
        self.cobranca().and_then(|c| c.last_transaction.as_ref())
    }

    pub fn charge_id(&self) -> Option<&str> {
        self.cobranca().and_then(|c| c.id.as_deref())
    }

    /// Pedido ou cobrança recusados pelo gateway.
    pub fn falhou(&self) -> bool {
        self.status == "failed"
            || self.cobranca().and_then(|c| c.status.as_deref()) == Some("failed")
    }

    pub fn motivo_falha(&self) -> String {
        self.transacao()
            .and_then(|t| t.acquirer_message.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Pagamento recusado pela operadora".to_string())
    }
}

// Dados repassados na consulta GET /api/pagarme/orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultaPedido {
    pub id: String,
    pub status: String,
    pub amount: Option<i64>,
    pub paid_at: Option<String>,
    #[serde(default)]
    pub customer: Value,
    #[serde(default)]
    pub items: Value,
    #[serde(default)]
    pub charges: Value,
}

#[derive(Debug, Deserialize)]
struct ErroGateway {
    message: Option<String>,
}

// =============================================================================
//  CLIENTE HTTP
// =============================================================================

#[derive(Clone)]
pub struct PagarmeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PagarmeClient {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    // Respostas fora de 2xx viram GatewayError com a mensagem do corpo
    async fn ler_resposta<T>(resposta: reqwest::Response, padrao: &str) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = resposta.status();
        if !status.is_success() {
            let corpo = resposta.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErroGateway>(&corpo)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| padrao.to_string());

            tracing::error!("🔥 Pagar.me respondeu {}: {}", status, corpo);
            return Err(AppError::GatewayError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resposta.json::<T>().await?)
    }
}

#[async_trait]
impl PaymentGateway for PagarmeClient {
    async fn criar_pedido(&self, pedido: &PedidoGateway) -> Result<RespostaGateway, AppError> {
        tracing::info!("💳 Enviando pedido {} para a Pagar.me", pedido.code);

        // Basic Auth: secret key como usuário, senha vazia
        let resposta = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .json(pedido)
            .send()
            .await?;

        Self::ler_resposta(resposta, "Erro ao criar pedido").await
    }

    async fn consultar_pedido(&self, order_id: &str) -> Result<ConsultaPedido, AppError> {
        let resposta = self
            .http
            .get(format!("{}/orders/{}", self.base_url, order_id))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await?;

        Self::ler_resposta(resposta, "Erro ao consultar pedido").await
    }
}

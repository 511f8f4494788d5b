// src/models/convite.rs

use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

use crate::{common::error::AppError, models::roles::Role};

pub const TOKEN_LEN: usize = 32;

/// Token aleatório, não sequencial, usado nos links de convite.
pub fn gerar_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

// --- ENUMS ---

// Mapeia o CREATE TYPE convite_status do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "convite_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConviteStatus {
    Pendente,
    // Admin confirmou a senha mas ainda não criou a campanha
    Aceito,
    Usado,
    Cancelado,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrigemConvite {
    // Emitido de dentro do app por um usuário da campanha
    App,
    // Cortesia enviada manualmente por um admin
    Masteradmin,
    PagarmeWebhook,
}

impl OrigemConvite {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrigemConvite::App => "app",
            OrigemConvite::Masteradmin => "masteradmin",
            OrigemConvite::PagarmeWebhook => "pagarme_webhook",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanoTipo {
    Cortesia,
    Pago,
}

impl PlanoTipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanoTipo::Cortesia => "cortesia",
            PlanoTipo::Pago => "pago",
        }
    }
}

// --- CONVITE (onboarding de equipe) ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Convite {
    pub id: Uuid,
    pub campanha_id: Option<Uuid>,
    pub token: String,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub nome_convidado: Option<String>,
    pub role: String,
    pub status: ConviteStatus,
    pub origem: String,
    pub created_by: Option<Uuid>,
    pub lideranca_id: Option<Uuid>,
    pub coordenador_regional_id: Option<Uuid>,
    pub plano_tipo: Option<String>,
    pub pagarme_charge_id: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Convite {
    /// Um convite só pode ser validado/confirmado enquanto pendente e dentro do prazo.
    pub fn verificar_utilizavel(&self, agora: DateTime<Utc>) -> Result<(), AppError> {
        match self.status {
            ConviteStatus::Pendente => {}
            ConviteStatus::Aceito | ConviteStatus::Usado => return Err(AppError::ConviteJaUtilizado),
            ConviteStatus::Cancelado => return Err(AppError::ConviteCancelado),
        }

        if self.expires_at < agora {
            return Err(AppError::ConviteExpirado);
        }

        Ok(())
    }

    pub fn role_alvo(&self) -> Result<Role, AppError> {
        self.role
            .parse()
            .map_err(|e: String| AppError::InternalServerError(anyhow::anyhow!(e)))
    }
}

// Linha a ser inserida em `convites`
#[derive(Debug, Clone)]
pub struct NovoConvite {
    pub campanha_id: Option<Uuid>,
    pub token: String,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub nome_convidado: Option<String>,
    pub role: Role,
    pub origem: OrigemConvite,
    pub created_by: Option<Uuid>,
    pub lideranca_id: Option<Uuid>,
    pub coordenador_regional_id: Option<Uuid>,
    pub plano_tipo: Option<PlanoTipo>,
    pub pagarme_charge_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

// Dados para emitir um convite
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmitirConvitePayload {
    #[serde(default = "role_padrao")]
    pub role: Role,

    pub telefone: Option<String>,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome_completo: String,

    pub nome_popular: Option<String>,
    pub tipo_lideranca: Option<String>,
    pub coordenador_regional_id: Option<Uuid>,

    #[validate(range(min = 1, max = 720, message = "Validade deve ficar entre 1 e 720 horas"))]
    pub expires_hours: Option<i64>,
}

fn role_padrao() -> Role {
    Role::Lideranca
}

#[derive(Debug, Serialize)]
pub struct ConviteComLink {
    #[serde(flatten)]
    pub convite: Convite,
    pub link_onboarding: String,
}

#[derive(Debug, Serialize)]
pub struct ConviteCriadoResponse {
    #[serde(flatten)]
    pub convite: Convite,
    pub link_onboarding: String,
    pub mensagem_whatsapp: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConviteValidado {
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub nome: Option<String>,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConfirmarConvitePayload {
    #[validate(length(min = 1, message = "Token é obrigatório"))]
    pub token: String,

    #[validate(length(min = 6, message = "Senha deve ter pelo menos 6 caracteres"))]
    #[schema(example = "minhaSenha123")]
    pub senha: String,
}

#[derive(Debug, Serialize)]
pub struct ConviteConfirmado {
    pub profile_id: Uuid,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub nome: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConviteAdminPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConviteAdminEnviado {
    pub convite_id: Uuid,
    pub email: String,
    pub link_onboarding: String,
}

// --- CONVITE DE ELEITOR (link público de indicação) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "convite_eleitor_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConviteEleitorStatus {
    Ativo,
    Usado,
    Expirado,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConviteEleitor {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub token: String,
    pub origem_tipo: String,
    pub origem_id: Option<Uuid>,
    pub eleitor_id: Option<Uuid>,
    pub status: ConviteEleitorStatus,
    pub cliques: i32,
    pub aceite_lgpd: bool,
    pub aceite_lgpd_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConviteEleitor {
    pub fn verificar_utilizavel(&self, agora: DateTime<Utc>) -> Result<(), AppError> {
        if self.status != ConviteEleitorStatus::Ativo {
            return Err(AppError::ConviteJaUtilizado);
        }
        if matches!(self.expires_at, Some(exp) if exp < agora) {
            return Err(AppError::ConviteExpirado);
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConviteEleitorCriado {
    pub convite_id: Uuid,
    pub token: String,
    pub link_compartilhar: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConviteEleitorPublico {
    pub convite_id: Uuid,
    pub campanha: crate::models::campanha::CampanhaPublica,
    pub origem_tipo: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AceitarConviteEleitorPayload {
    #[validate(length(min = 1, message = "Token, nome e telefone são obrigatórios"))]
    pub token: String,

    #[validate(length(min = 1, message = "Token, nome e telefone são obrigatórios"))]
    pub nome_completo: String,

    #[validate(length(min = 1, message = "Token, nome e telefone são obrigatórios"))]
    pub telefone: String,

    #[serde(default)]
    pub aceite_lgpd: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConviteEleitorAceito {
    pub eleitor_id: Uuid,
    pub link_compartilhar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn convite(status: ConviteStatus, expira_em: Duration) -> Convite {
        let agora = Utc::now();
        Convite {
            id: Uuid::new_v4(),
            campanha_id: Some(Uuid::new_v4()),
            token: gerar_token(),
            telefone: Some("61998765432".into()),
            email: None,
            nome_convidado: Some("Maria".into()),
            role: "lideranca".into(),
            status,
            origem: OrigemConvite::App.as_str().into(),
            created_by: None,
            lideranca_id: None,
            coordenador_regional_id: None,
            plano_tipo: None,
            pagarme_charge_id: None,
            expires_at: agora + expira_em,
            created_at: agora,
            updated_at: agora,
        }
    }

    #[test]
    fn pending_and_in_time_is_usable() {
        let c = convite(ConviteStatus::Pendente, Duration::hours(48));
        assert!(c.verificar_utilizavel(Utc::now()).is_ok());
        assert_eq!(c.role_alvo().unwrap(), Role::Lideranca);
    }

    #[test]
    fn used_invite_fails_as_already_used() {
        let c = convite(ConviteStatus::Usado, Duration::hours(48));
        assert!(matches!(c.verificar_utilizavel(Utc::now()), Err(AppError::ConviteJaUtilizado)));

        let c = convite(ConviteStatus::Aceito, Duration::hours(48));
        assert!(matches!(c.verificar_utilizavel(Utc::now()), Err(AppError::ConviteJaUtilizado)));
    }

    #[test]
    fn cancelled_invite_fails() {
        let c = convite(ConviteStatus::Cancelado, Duration::hours(48));
        assert!(matches!(c.verificar_utilizavel(Utc::now()), Err(AppError::ConviteCancelado)));
    }

    #[test]
    fn expired_invite_fails_even_if_pending() {
        let c = convite(ConviteStatus::Pendente, Duration::seconds(-1));
        assert!(matches!(c.verificar_utilizavel(Utc::now()), Err(AppError::ConviteExpirado)));

        // Relógio "antes" da expiração: ainda válido
        let c = convite(ConviteStatus::Pendente, Duration::hours(-1));
        let antes = c.expires_at - Duration::minutes(5);
        assert!(c.verificar_utilizavel(antes).is_ok());
    }

    #[test]
    fn tokens_are_random_alphanumeric() {
        let a = gerar_token();
        let b = gerar_token();
        assert_eq!(a.len(), TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn eleitor_link_rules() {
        let agora = Utc::now();
        let mut c = ConviteEleitor {
            id: Uuid::new_v4(),
            campanha_id: Uuid::new_v4(),
            token: gerar_token(),
            origem_tipo: "lideranca".into(),
            origem_id: None,
            eleitor_id: None,
            status: ConviteEleitorStatus::Ativo,
            cliques: 0,
            aceite_lgpd: false,
            aceite_lgpd_at: None,
            expires_at: None,
            created_at: agora,
            updated_at: agora,
        };
        assert!(c.verificar_utilizavel(agora).is_ok());

        c.expires_at = Some(agora - Duration::minutes(1));
        assert!(matches!(c.verificar_utilizavel(agora), Err(AppError::ConviteExpirado)));

        c.status = ConviteEleitorStatus::Usado;
        assert!(matches!(c.verificar_utilizavel(agora), Err(AppError::ConviteJaUtilizado)));
    }
}

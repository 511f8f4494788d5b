// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

use crate::models::roles::{opcoes_convite, papel_principal, parse_roles, OpcaoConvite, Role};

// Um perfil por identidade autenticada. O campanha_id é a chave do tenant;
// fica nulo apenas para o admin que ainda não concluiu o onboarding.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub nome_completo: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cpf: Option<String>,
    pub roles: Vec<String>,
    pub campanha_id: Option<Uuid>,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub senha_hash: Option<String>,

    pub auth_method: String,
    pub status: String,
    pub ultimo_acesso: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn papeis(&self) -> Vec<Role> {
        parse_roles(&self.roles)
    }

    pub fn tem_papel(&self, role: Role) -> bool {
        self.papeis().contains(&role)
    }

    pub fn is_ativo(&self) -> bool {
        self.status == "ativo"
    }
}

// Login do app: telefone OU e-mail, mais a senha
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[schema(example = "61998765432")]
    pub telefone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "coordenacao@campanha.com.br")]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub senha: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub profile_id: Uuid,
    pub nome: String,
    pub telefone: Option<String>,
    pub roles: Vec<String>,
    pub role_principal: Option<Role>,
    pub campanha_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    pub role: Option<Role>,
}

// GET /api/mobile/profile: o perfil mais o que ele pode fazer no app
#[derive(Debug, Serialize)]
pub struct PerfilResponse {
    #[serde(flatten)]
    pub profile: Profile,
    pub role_principal: Option<Role>,
    pub opcoes_convite: Vec<OpcaoConvite>,
}

impl From<Profile> for PerfilResponse {
    fn from(profile: Profile) -> Self {
        let papeis = profile.papeis();
        Self {
            role_principal: papel_principal(&papeis),
            opcoes_convite: opcoes_convite(&papeis),
            profile,
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do perfil)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

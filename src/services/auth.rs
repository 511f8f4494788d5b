// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::{error::AppError, format::normalizar_telefone},
    db::ProfileRepository,
    models::{
        auth::{Claims, LoginPayload, LoginResponse, Profile},
        roles::papel_principal,
    },
};

const TOKEN_VALIDADE_DIAS: i64 = 7;

/// Gera o hash bcrypt fora do runtime assíncrono.
pub async fn gerar_hash(senha: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&senha, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn conferir_senha(senha: String, senha_hash: String) -> Result<bool, AppError> {
    let valida = tokio::task::spawn_blocking(move || verify(&senha, &senha_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valida)
}

pub fn emitir_token(secret: &str, profile_id: Uuid, agora: DateTime<Utc>) -> Result<String, AppError> {
    let expires_at = agora + chrono::Duration::days(TOKEN_VALIDADE_DIAS);

    let claims = Claims {
        sub: profile_id,
        exp: expires_at.timestamp() as usize,
        iat: agora.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decodificar_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}

#[derive(Clone)]
pub struct AuthService {
    profile_repo: ProfileRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(profile_repo: ProfileRepository, jwt_secret: String) -> Self {
        Self { profile_repo, jwt_secret }
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, AppError> {
        let telefone = payload.telefone.as_deref().filter(|t| !t.trim().is_empty());
        let email = payload.email.as_deref().filter(|e| !e.trim().is_empty());

        let profile = match (telefone, email) {
            (Some(telefone), _) => {
                let telefone = normalizar_telefone(telefone)?;
                self.profile_repo.find_by_telefone(&telefone).await?
            }
            (None, Some(email)) => self.profile_repo.find_by_email(email.trim()).await?,
            (None, None) => {
                return Err(AppError::BadRequest("Informe telefone ou e-mail".into()));
            }
        }
        .ok_or(AppError::InvalidCredentials)?;

        let senha_hash = profile.senha_hash.clone().ok_or(AppError::InvalidCredentials)?;
        if !conferir_senha(payload.senha.clone(), senha_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        if !profile.is_ativo() {
            return Err(AppError::UsuarioInativo);
        }

        if let Err(e) = self.profile_repo.registrar_acesso(profile.id).await {
            tracing::warn!("⚠️ Falha ao registrar último acesso de {}: {}", profile.id, e);
        }

        let token = emitir_token(&self.jwt_secret, profile.id, Utc::now())?;
        tracing::info!("🔑 Login realizado: {}", profile.id);

        Ok(LoginResponse {
            token,
            profile_id: profile.id,
            role_principal: papel_principal(&profile.papeis()),
            nome: profile.nome_completo,
            telefone: profile.telefone,
            roles: profile.roles,
            campanha_id: profile.campanha_id,
        })
    }

    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let claims = decodificar_token(&self.jwt_secret, token)?;

        let profile = self
            .profile_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !profile.is_ativo() {
            return Err(AppError::UsuarioInativo);
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let id = Uuid::new_v4();
        let token = emitir_token("segredo", id, Utc::now()).unwrap();
        let claims = decodificar_token("segredo", &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn token_with_other_secret_is_rejected() {
        let token = emitir_token("segredo", Uuid::new_v4(), Utc::now()).unwrap();
        assert!(matches!(decodificar_token("outro", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let emitido = Utc::now() - chrono::Duration::days(8);
        let token = emitir_token("segredo", Uuid::new_v4(), emitido).unwrap();
        assert!(matches!(decodificar_token("segredo", &token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn hash_is_verifiable() {
        let hashed = gerar_hash("segredo123".into()).await.unwrap();
        assert!(conferir_senha("segredo123".into(), hashed.clone()).await.unwrap());
        assert!(!conferir_senha("errada".into(), hashed).await.unwrap());
    }
}

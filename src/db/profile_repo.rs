// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::{auth::Profile, roles::Role},
};

// Responsável pela tabela 'profiles'
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    pub async fn find_by_telefone(&self, telefone: &str) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE telefone = $1")
            .bind(telefone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let profile =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(profile)
    }

    /// Perfil existente com o mesmo telefone ou e-mail do convite.
    pub async fn find_by_contato<'e, E>(
        &self,
        executor: E,
        telefone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profiles
            WHERE ($1::text IS NOT NULL AND telefone = $1)
               OR ($2::text IS NOT NULL AND lower(email) = lower($2))
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(telefone)
        .bind(email)
        .fetch_optional(executor)
        .await?;
        Ok(profile)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        nome_completo: &str,
        telefone: Option<&str>,
        email: Option<&str>,
        senha_hash: &str,
        role: Role,
        campanha_id: Option<Uuid>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (nome_completo, telefone, email, senha_hash, roles, campanha_id)
            VALUES ($1, $2, $3, $4, ARRAY[$5]::text[], $6)
            RETURNING *
            "#,
        )
        .bind(nome_completo)
        .bind(telefone)
        .bind(email)
        .bind(senha_hash)
        .bind(role.as_str())
        .bind(campanha_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um usuário com este telefone ou e-mail"))
    }

    pub async fn definir_campanha<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        campanha_id: Uuid,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET campanha_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(campanha_id)
        .fetch_one(executor)
        .await?;
        Ok(profile)
    }

    pub async fn registrar_acesso(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE profiles SET ultimo_acesso = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// src/db/campanha_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::campanha::{Campanha, CampanhaPublica, OnboardingAdminPayload},
};

#[derive(Clone)]
pub struct CampanhaRepository {
    pool: PgPool,
}

impl CampanhaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        dados: &OnboardingAdminPayload,
        plano_tipo: Option<&str>,
        created_by: Uuid,
    ) -> Result<Campanha, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campanha = sqlx::query_as::<_, Campanha>(
            r#"
            INSERT INTO campanha (nome, nome_candidato, cargo_pretendido, partido, uf, plano_tipo, created_by)
            VALUES ($1, $2, $3, $4, upper($5), $6, $7)
            RETURNING *
            "#,
        )
        .bind(dados.nome.trim())
        .bind(dados.nome_candidato.as_deref())
        .bind(dados.cargo_pretendido.as_deref())
        .bind(dados.partido.as_deref())
        .bind(&dados.uf)
        .bind(plano_tipo)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(campanha)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Campanha>, AppError> {
        let campanha = sqlx::query_as::<_, Campanha>("SELECT * FROM campanha WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(campanha)
    }

    pub async fn find_publica(&self, id: Uuid) -> Result<Option<CampanhaPublica>, AppError> {
        let campanha = sqlx::query_as::<_, CampanhaPublica>(
            "SELECT nome, nome_candidato, cargo_pretendido, partido FROM campanha WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(campanha)
    }
}

// src/db/convite_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::convite::{Convite, ConviteEleitor, ConviteStatus, NovoConvite},
};

#[derive(Clone)]
pub struct ConviteRepository {
    pool: PgPool,
}

impl ConviteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CONVITES DE EQUIPE
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, novo: &NovoConvite) -> Result<Convite, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Convite>(
            r#"
            INSERT INTO convites (
                campanha_id, token, telefone, email, nome_convidado, role, origem,
                created_by, lideranca_id, coordenador_regional_id, plano_tipo,
                pagarme_charge_id, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(novo.campanha_id)
        .bind(&novo.token)
        .bind(novo.telefone.as_deref())
        .bind(novo.email.as_deref())
        .bind(novo.nome_convidado.as_deref())
        .bind(novo.role.as_str())
        .bind(novo.origem.as_str())
        .bind(novo.created_by)
        .bind(novo.lideranca_id)
        .bind(novo.coordenador_regional_id)
        .bind(novo.plano_tipo.map(|p| p.as_str()))
        .bind(novo.pagarme_charge_id.as_deref())
        .bind(novo.expires_at)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Token de convite duplicado"))
    }

    /// Convite gerado por pagamento: no máximo um por cobrança.
    /// `None` quando a cobrança já tem convite.
    pub async fn inserir_convite_webhook<'e, E>(
        &self,
        executor: E,
        novo: &NovoConvite,
    ) -> Result<Option<Convite>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Convite>(
            r#"
            INSERT INTO convites (
                campanha_id, token, telefone, email, nome_convidado, role, origem,
                created_by, lideranca_id, coordenador_regional_id, plano_tipo,
                pagarme_charge_id, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (pagarme_charge_id) WHERE origem = 'pagarme_webhook' DO NOTHING
            RETURNING *
            "#,
        )
        .bind(novo.campanha_id)
        .bind(&novo.token)
        .bind(novo.telefone.as_deref())
        .bind(novo.email.as_deref())
        .bind(novo.nome_convidado.as_deref())
        .bind(novo.role.as_str())
        .bind(novo.origem.as_str())
        .bind(novo.created_by)
        .bind(novo.lideranca_id)
        .bind(novo.coordenador_regional_id)
        .bind(novo.plano_tipo.map(|p| p.as_str()))
        .bind(novo.pagarme_charge_id.as_deref())
        .bind(novo.expires_at)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Token de convite duplicado"))
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<Convite>, AppError> {
        let convite = sqlx::query_as::<_, Convite>("SELECT * FROM convites WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(convite)
    }

    /// Trava a linha até o fim da transação: duas confirmações simultâneas
    /// do mesmo token são serializadas e a segunda vê o status já alterado.
    pub async fn find_by_token_for_update<'e, E>(
        &self,
        executor: E,
        token: &str,
    ) -> Result<Option<Convite>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite =
            sqlx::query_as::<_, Convite>("SELECT * FROM convites WHERE token = $1 FOR UPDATE")
                .bind(token)
                .fetch_optional(executor)
                .await?;
        Ok(convite)
    }

    pub async fn atualizar_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ConviteStatus,
    ) -> Result<Convite, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite = sqlx::query_as::<_, Convite>(
            "UPDATE convites SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(convite)
    }

    pub async fn listar_pendentes(&self, campanha_id: Uuid) -> Result<Vec<Convite>, AppError> {
        let convites = sqlx::query_as::<_, Convite>(
            r#"
            SELECT * FROM convites
            WHERE campanha_id = $1 AND status = 'pendente' AND expires_at > NOW()
            ORDER BY created_at DESC
            "#,
        )
        .bind(campanha_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(convites)
    }

    pub async fn find_by_id(&self, id: Uuid, campanha_id: Uuid) -> Result<Option<Convite>, AppError> {
        let convite = sqlx::query_as::<_, Convite>(
            "SELECT * FROM convites WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(convite)
    }

    /// Só cancela convites pendentes da própria campanha.
    pub async fn cancelar(&self, id: Uuid, campanha_id: Uuid) -> Result<Option<Convite>, AppError> {
        let convite = sqlx::query_as::<_, Convite>(
            r#"
            UPDATE convites
            SET status = 'cancelado', updated_at = NOW()
            WHERE id = $1 AND campanha_id = $2 AND status = 'pendente'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(campanha_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(convite)
    }

    /// Convite de admin aceito (senha definida) aguardando o onboarding.
    pub async fn find_admin_aceito_for_update<'e, E>(
        &self,
        executor: E,
        telefone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Convite>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite = sqlx::query_as::<_, Convite>(
            r#"
            SELECT * FROM convites
            WHERE role = 'admin' AND status = 'aceito'
              AND (($1::text IS NOT NULL AND telefone = $1)
                OR ($2::text IS NOT NULL AND lower(email) = lower($2)))
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(telefone)
        .bind(email)
        .fetch_optional(executor)
        .await?;
        Ok(convite)
    }

    // =========================================================================
    //  CONVITES DE ELEITOR (links públicos)
    // =========================================================================

    pub async fn criar_convite_eleitor<'e, E>(
        &self,
        executor: E,
        campanha_id: Uuid,
        token: &str,
        origem_tipo: &str,
        origem_id: Option<Uuid>,
    ) -> Result<ConviteEleitor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ConviteEleitor>(
            r#"
            INSERT INTO convites_eleitor (campanha_id, token, origem_tipo, origem_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(token)
        .bind(origem_tipo)
        .bind(origem_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Token de convite duplicado"))
    }

    pub async fn find_eleitor_by_token(&self, token: &str) -> Result<Option<ConviteEleitor>, AppError> {
        let convite =
            sqlx::query_as::<_, ConviteEleitor>("SELECT * FROM convites_eleitor WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(convite)
    }

    pub async fn find_eleitor_by_token_for_update<'e, E>(
        &self,
        executor: E,
        token: &str,
    ) -> Result<Option<ConviteEleitor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite = sqlx::query_as::<_, ConviteEleitor>(
            "SELECT * FROM convites_eleitor WHERE token = $1 FOR UPDATE",
        )
        .bind(token)
        .fetch_optional(executor)
        .await?;
        Ok(convite)
    }

    pub async fn registrar_clique(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE convites_eleitor SET cliques = cliques + 1, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn marcar_eleitor_usado<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        eleitor_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE convites_eleitor
            SET status = 'usado', eleitor_id = $2, aceite_lgpd = TRUE,
                aceite_lgpd_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(eleitor_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

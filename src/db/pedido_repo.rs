// src/db/pedido_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    db::ConviteRepository,
    models::{
        convite::{Convite, NovoConvite},
        pedido::{NovoPedido, Pedido, PedidoStatus},
    },
};

// Campos opcionais gravados junto com a mudança de status
#[derive(Debug, Default)]
pub struct AtualizacaoPedido<'a> {
    pub pagarme_order_id: Option<&'a str>,
    pub pagarme_charge_id: Option<&'a str>,
    pub erro: Option<&'a str>,
    pub webhook_recebido: bool,
}

/// Persistência dos pedidos usada pelo fluxo de pagamento.
#[async_trait]
pub trait PedidoStore: Send + Sync {
    async fn inserir(&self, novo: &NovoPedido) -> Result<Pedido, AppError>;

    /// Compare-and-set: só altera a linha se o status atual for um dos
    /// predecessores válidos de `destino`. `None` significa que outra
    /// execução já fez a transição (ou que ela não é permitida).
    async fn atualizar_status(
        &self,
        id: Uuid,
        destino: PedidoStatus,
        campos: AtualizacaoPedido<'_>,
    ) -> Result<Option<Pedido>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pedido>, AppError>;
    async fn find_by_codigo(&self, codigo: &str) -> Result<Option<Pedido>, AppError>;
    async fn find_by_pagarme_order_id(&self, order_id: &str) -> Result<Option<Pedido>, AppError>;

    /// Marca `convite_enviado_em` do pedido pago e grava o convite na mesma
    /// transação. `None` quando o envio já foi feito por outra execução.
    async fn registrar_convite_do_pedido(
        &self,
        pedido_id: Uuid,
        convite: &NovoConvite,
    ) -> Result<Option<Convite>, AppError>;

    /// Convite de pagamento sem pedido local. `None` se a cobrança já gerou um.
    async fn registrar_convite_avulso(&self, convite: &NovoConvite) -> Result<Option<Convite>, AppError>;
}

#[derive(Clone)]
pub struct PedidoRepository {
    pool: PgPool,
    convite_repo: ConviteRepository,
}

impl PedidoRepository {
    pub fn new(pool: PgPool, convite_repo: ConviteRepository) -> Self {
        Self { pool, convite_repo }
    }

    async fn reivindicar_convite<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reivindicado = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE pedidos
            SET convite_enviado_em = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'paid' AND convite_enviado_em IS NULL
            RETURNING id
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(reivindicado.is_some())
    }
}

#[async_trait]
impl PedidoStore for PedidoRepository {
    async fn inserir(&self, novo: &NovoPedido) -> Result<Pedido, AppError> {
        sqlx::query_as::<_, Pedido>(
            r#"
            INSERT INTO pedidos (
                codigo, nome, email, documento, plano_slug, plano_nome, valor, meio_pagamento
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&novo.codigo)
        .bind(&novo.nome)
        .bind(&novo.email)
        .bind(&novo.documento)
        .bind(&novo.plano_slug)
        .bind(&novo.plano_nome)
        .bind(novo.valor)
        .bind(novo.meio_pagamento)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Código de pedido duplicado"))
    }

    async fn atualizar_status(
        &self,
        id: Uuid,
        destino: PedidoStatus,
        campos: AtualizacaoPedido<'_>,
    ) -> Result<Option<Pedido>, AppError> {
        let pedido = sqlx::query_as::<_, Pedido>(
            r#"
            UPDATE pedidos
            SET status = $2,
                pagarme_order_id = COALESCE($4, pagarme_order_id),
                pagarme_charge_id = COALESCE($5, pagarme_charge_id),
                erro = COALESCE($6, erro),
                webhook_recebido_em = CASE WHEN $7 THEN NOW() ELSE webhook_recebido_em END,
                updated_at = NOW()
            WHERE id = $1 AND status = ANY($3)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(destino)
        .bind(PedidoStatus::predecessores(destino))
        .bind(campos.pagarme_order_id)
        .bind(campos.pagarme_charge_id)
        .bind(campos.erro)
        .bind(campos.webhook_recebido)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pedido)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pedido>, AppError> {
        let pedido = sqlx::query_as::<_, Pedido>("SELECT * FROM pedidos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pedido)
    }

    async fn find_by_codigo(&self, codigo: &str) -> Result<Option<Pedido>, AppError> {
        let pedido = sqlx::query_as::<_, Pedido>("SELECT * FROM pedidos WHERE codigo = $1")
            .bind(codigo)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pedido)
    }

    async fn find_by_pagarme_order_id(&self, order_id: &str) -> Result<Option<Pedido>, AppError> {
        let pedido =
            sqlx::query_as::<_, Pedido>("SELECT * FROM pedidos WHERE pagarme_order_id = $1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(pedido)
    }

    async fn registrar_convite_do_pedido(
        &self,
        pedido_id: Uuid,
        convite: &NovoConvite,
    ) -> Result<Option<Convite>, AppError> {
        let mut tx = self.pool.begin().await?;

        // A trava da linha serializa reentregas simultâneas do mesmo evento
        if !self.reivindicar_convite(&mut *tx, pedido_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        // Cobrança que já gerou convite mantém o envio marcado e não duplica
        let criado = self.convite_repo.inserir_convite_webhook(&mut *tx, convite).await?;
        tx.commit().await?;
        Ok(criado)
    }

    async fn registrar_convite_avulso(&self, convite: &NovoConvite) -> Result<Option<Convite>, AppError> {
        self.convite_repo.inserir_convite_webhook(&self.pool, convite).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        convite::{OrigemConvite, PlanoTipo},
        pedido::MeioPagamento,
        roles::Role,
    };
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn repo(pool: &PgPool) -> PedidoRepository {
        PedidoRepository::new(pool.clone(), ConviteRepository::new(pool.clone()))
    }

    fn novo_pedido() -> NovoPedido {
        NovoPedido {
            codigo: "ped_1_ABCDEF".into(),
            nome: "Pepper Potts".into(),
            email: "pepper@stark.com".into(),
            documento: "93095135270".into(),
            plano_slug: "profissional".into(),
            plano_nome: "Plano Profissional".into(),
            valor: Decimal::new(49900, 2),
            meio_pagamento: MeioPagamento::Pix,
        }
    }

    fn convite(token: &str) -> NovoConvite {
        NovoConvite {
            campanha_id: None,
            token: token.into(),
            telefone: None,
            email: Some("pepper@stark.com".into()),
            nome_convidado: None,
            role: Role::Admin,
            origem: OrigemConvite::PagarmeWebhook,
            created_by: None,
            lideranca_id: None,
            coordenador_regional_id: None,
            plano_tipo: Some(PlanoTipo::Pago),
            pagarme_charge_id: Some("ch_1".into()),
            expires_at: Utc::now() + Duration::hours(48),
        }
    }

    #[sqlx::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn paid_order_invite_is_claimed_once(pool: PgPool) {
        let repo = repo(&pool);
        let pedido = repo.inserir(&novo_pedido()).await.unwrap();

        // Ainda não pago: nada a reivindicar
        assert!(repo.registrar_convite_do_pedido(pedido.id, &convite("t1")).await.unwrap().is_none());

        repo.atualizar_status(pedido.id, PedidoStatus::Paid, AtualizacaoPedido::default())
            .await
            .unwrap()
            .unwrap();

        assert!(repo.registrar_convite_do_pedido(pedido.id, &convite("t2")).await.unwrap().is_some());
        assert!(repo.registrar_convite_do_pedido(pedido.id, &convite("t3")).await.unwrap().is_none());

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM convites")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert!(repo.find_by_id(pedido.id).await.unwrap().unwrap().convite_enviado_em.is_some());
    }

    #[sqlx::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn standalone_invite_is_unique_per_charge(pool: PgPool) {
        let repo = repo(&pool);
        assert!(repo.registrar_convite_avulso(&convite("a1")).await.unwrap().is_some());
        assert!(repo.registrar_convite_avulso(&convite("a2")).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn failed_order_is_never_paid(pool: PgPool) {
        let repo = repo(&pool);
        let pedido = repo.inserir(&novo_pedido()).await.unwrap();
        repo.atualizar_status(pedido.id, PedidoStatus::Failed, AtualizacaoPedido::default())
            .await
            .unwrap()
            .unwrap();

        let pago = repo
            .atualizar_status(pedido.id, PedidoStatus::Paid, AtualizacaoPedido::default())
            .await
            .unwrap();
        assert!(pago.is_none());
        assert_eq!(repo.find_by_id(pedido.id).await.unwrap().unwrap().status, PedidoStatus::Failed);
    }
}

// src/db/projeto_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        error::{map_unique_violation, AppError},
        response::Pagination,
    },
    models::campanha::{
        AtualizarTarefaPayload, CategoriaPayload, CategoriaProjeto, NovaTarefaPayload, Projeto,
        ProjetoEquipe, ProjetoEquipeFiltro, ProjetoFiltro, ProjetoPayload, Tarefa, TarefaFiltro,
        TarefaStatus, VincularEquipePayload,
    },
};

pub const ORDENACAO_PROJETO: &[&str] = &["nome", "status", "prioridade", "data_inicio", "data_fim", "created_at"];
pub const ORDENACAO_TAREFA: &[&str] = &["titulo", "status", "prioridade", "data_vencimento", "created_at"];

fn filtro_projetos(qb: &mut QueryBuilder<'static, Postgres>, campanha_id: Uuid, filtro: &ProjetoFiltro) {
    qb.push(" WHERE campanha_id = ").push_bind(campanha_id);
    qb.push(" AND archived = ").push_bind(filtro.archived);

    if let Some(status) = filtro.status.clone() {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(categoria_id) = filtro.categoria_id {
        qb.push(" AND categoria_id = ").push_bind(categoria_id);
    }
    if let Some(search) = filtro.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND nome ILIKE ").push_bind(format!("%{}%", search.trim()));
    }
}

fn filtro_tarefas(qb: &mut QueryBuilder<'static, Postgres>, campanha_id: Uuid, filtro: &TarefaFiltro) {
    qb.push(" WHERE campanha_id = ").push_bind(campanha_id);
    qb.push(" AND archived = ").push_bind(filtro.archived);

    if let Some(projeto_id) = filtro.projeto_id {
        qb.push(" AND projeto_id = ").push_bind(projeto_id);
    }
    if let Some(status) = filtro.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(responsavel) = filtro.colaborador_responsavel_id {
        qb.push(" AND colaborador_responsavel_id = ").push_bind(responsavel);
    }
    if let Some(search) = filtro.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND titulo ILIKE ").push_bind(format!("%{}%", search.trim()));
    }
}

const SELECT_PROJETO_EQUIPE: &str = r#"
    SELECT pe.*, p.nome AS projeto_nome, e.nome AS equipe_nome, e.tipo_equipe AS equipe_tipo
    FROM projeto_equipe pe
    JOIN projetos p ON p.id = pe.projeto_id
    JOIN equipe e ON e.id = pe.equipe_id
"#;

// Sem `ativo` na query, lista só os vínculos ativos
fn filtro_projeto_equipes(
    qb: &mut QueryBuilder<'static, Postgres>,
    campanha_id: Uuid,
    filtro: &ProjetoEquipeFiltro,
) {
    qb.push(" WHERE pe.campanha_id = ").push_bind(campanha_id);
    qb.push(" AND pe.ativo = ").push_bind(filtro.ativo.unwrap_or(true));

    if let Some(projeto_id) = filtro.projeto_id {
        qb.push(" AND pe.projeto_id = ").push_bind(projeto_id);
    }
    if let Some(equipe_id) = filtro.equipe_id {
        qb.push(" AND pe.equipe_id = ").push_bind(equipe_id);
    }
    if let Some(papel) = filtro.papel.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND pe.papel = ").push_bind(papel.trim().to_string());
    }
}

#[derive(Clone)]
pub struct ProjetoRepository {
    pool: PgPool,
}

impl ProjetoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn listar_categorias(&self, campanha_id: Uuid) -> Result<Vec<CategoriaProjeto>, AppError> {
        let categorias = sqlx::query_as::<_, CategoriaProjeto>(
            "SELECT * FROM categoria_projeto WHERE campanha_id = $1 AND ativo = TRUE ORDER BY nome",
        )
        .bind(campanha_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categorias)
    }

    pub async fn criar_categoria(
        &self,
        campanha_id: Uuid,
        nome: &str,
        dados: &CategoriaPayload,
    ) -> Result<CategoriaProjeto, AppError> {
        sqlx::query_as::<_, CategoriaProjeto>(
            r#"
            INSERT INTO categoria_projeto (campanha_id, nome, descricao, cor)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(nome)
        .bind(dados.descricao.as_deref())
        .bind(dados.cor.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("A categoria '{}' já existe.", nome)))
    }

    pub async fn atualizar_categoria(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        dados: &CategoriaPayload,
    ) -> Result<Option<CategoriaProjeto>, AppError> {
        sqlx::query_as::<_, CategoriaProjeto>(
            r#"
            UPDATE categoria_projeto
            SET nome = COALESCE($3, nome),
                descricao = COALESCE($4, descricao),
                cor = COALESCE($5, cor),
                updated_at = NOW()
            WHERE id = $1 AND campanha_id = $2 AND ativo = TRUE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(campanha_id)
        .bind(dados.nome.as_deref().map(str::trim))
        .bind(dados.descricao.as_deref())
        .bind(dados.cor.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe uma categoria com este nome."))
    }

    pub async fn desativar_categoria(&self, campanha_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE categoria_projeto SET ativo = FALSE, updated_at = NOW() WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PROJETOS
    // =========================================================================

    pub async fn listar_projetos(
        &self,
        campanha_id: Uuid,
        filtro: &ProjetoFiltro,
        pagination: &Pagination,
    ) -> Result<(Vec<Projeto>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM projetos");
        filtro_projetos(&mut count, campanha_id, filtro);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM projetos");
        filtro_projetos(&mut qb, campanha_id, filtro);
        qb.push(" ORDER BY ")
            .push(pagination.order_clause(ORDENACAO_PROJETO, "created_at"))
            .push(" LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let projetos = qb.build_query_as::<Projeto>().fetch_all(&self.pool).await?;

        Ok((projetos, total))
    }

    pub async fn find_projeto(&self, campanha_id: Uuid, id: Uuid) -> Result<Option<Projeto>, AppError> {
        let projeto = sqlx::query_as::<_, Projeto>(
            "SELECT * FROM projetos WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(projeto)
    }

    pub async fn criar_projeto(
        &self,
        campanha_id: Uuid,
        nome: &str,
        dados: &ProjetoPayload,
    ) -> Result<Projeto, AppError> {
        let projeto = sqlx::query_as::<_, Projeto>(
            r#"
            INSERT INTO projetos (
                campanha_id, categoria_id, responsavel_id, nome, descricao,
                status, prioridade, data_inicio, data_fim
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'planejamento'), COALESCE($7, 'media'), $8, $9)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(dados.categoria_id)
        .bind(dados.responsavel_id)
        .bind(nome)
        .bind(dados.descricao.as_deref())
        .bind(dados.status.as_deref())
        .bind(dados.prioridade.as_deref())
        .bind(dados.data_inicio)
        .bind(dados.data_fim)
        .fetch_one(&self.pool)
        .await?;
        Ok(projeto)
    }

    pub async fn atualizar_projeto(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        dados: &ProjetoPayload,
    ) -> Result<Option<Projeto>, AppError> {
        let projeto = sqlx::query_as::<_, Projeto>(
            r#"
            UPDATE projetos
            SET nome = COALESCE($3, nome),
                descricao = COALESCE($4, descricao),
                categoria_id = COALESCE($5, categoria_id),
                responsavel_id = COALESCE($6, responsavel_id),
                status = COALESCE($7, status),
                prioridade = COALESCE($8, prioridade),
                data_inicio = COALESCE($9, data_inicio),
                data_fim = COALESCE($10, data_fim),
                updated_at = NOW()
            WHERE id = $1 AND campanha_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(campanha_id)
        .bind(dados.nome.as_deref().map(str::trim))
        .bind(dados.descricao.as_deref())
        .bind(dados.categoria_id)
        .bind(dados.responsavel_id)
        .bind(dados.status.as_deref())
        .bind(dados.prioridade.as_deref())
        .bind(dados.data_inicio)
        .bind(dados.data_fim)
        .fetch_optional(&self.pool)
        .await?;
        Ok(projeto)
    }

    pub async fn arquivar_projeto(&self, campanha_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE projetos SET archived = TRUE, updated_at = NOW() WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// (total, concluídas) das tarefas não arquivadas do projeto.
    pub async fn contar_tarefas(&self, campanha_id: Uuid, projeto_id: Uuid) -> Result<(i64, i64), AppError> {
        let contagem: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'concluida')
            FROM tarefas
            WHERE campanha_id = $1 AND projeto_id = $2 AND archived = FALSE
            "#,
        )
        .bind(campanha_id)
        .bind(projeto_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(contagem)
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn listar_tarefas(
        &self,
        campanha_id: Uuid,
        filtro: &TarefaFiltro,
        pagination: &Pagination,
    ) -> Result<(Vec<Tarefa>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM tarefas");
        filtro_tarefas(&mut count, campanha_id, filtro);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM tarefas");
        filtro_tarefas(&mut qb, campanha_id, filtro);
        qb.push(" ORDER BY ")
            .push(pagination.order_clause(ORDENACAO_TAREFA, "created_at"))
            .push(" LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let tarefas = qb.build_query_as::<Tarefa>().fetch_all(&self.pool).await?;

        Ok((tarefas, total))
    }

    pub async fn find_tarefa(&self, campanha_id: Uuid, id: Uuid) -> Result<Option<Tarefa>, AppError> {
        let tarefa = sqlx::query_as::<_, Tarefa>(
            "SELECT * FROM tarefas WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tarefa)
    }

    pub async fn criar_tarefa(
        &self,
        campanha_id: Uuid,
        dados: &NovaTarefaPayload,
        status: TarefaStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Tarefa, AppError> {
        let tarefa = sqlx::query_as::<_, Tarefa>(
            r#"
            INSERT INTO tarefas (
                campanha_id, projeto_id, colaborador_responsavel_id, titulo, descricao,
                status, prioridade, data_vencimento, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'media'), $8, $9)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(dados.projeto_id)
        .bind(dados.colaborador_responsavel_id)
        .bind(dados.titulo.trim())
        .bind(dados.descricao.as_deref())
        .bind(status)
        .bind(dados.prioridade.as_deref())
        .bind(dados.data_vencimento)
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(tarefa)
    }

    /// `completed_at` é gravado como veio (já resolvido pelo serviço).
    pub async fn atualizar_tarefa(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        dados: &AtualizarTarefaPayload,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Tarefa>, AppError> {
        let tarefa = sqlx::query_as::<_, Tarefa>(
            r#"
            UPDATE tarefas
            SET titulo = COALESCE($3, titulo),
                descricao = COALESCE($4, descricao),
                status = COALESCE($5, status),
                prioridade = COALESCE($6, prioridade),
                colaborador_responsavel_id = COALESCE($7, colaborador_responsavel_id),
                data_vencimento = COALESCE($8, data_vencimento),
                completed_at = $9,
                updated_at = NOW()
            WHERE id = $1 AND campanha_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(campanha_id)
        .bind(dados.titulo.as_deref().map(str::trim))
        .bind(dados.descricao.as_deref())
        .bind(dados.status)
        .bind(dados.prioridade.as_deref())
        .bind(dados.colaborador_responsavel_id)
        .bind(dados.data_vencimento)
        .bind(completed_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tarefa)
    }

    pub async fn arquivar_tarefa(&self, campanha_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE tarefas SET archived = TRUE, updated_at = NOW() WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  EQUIPES DO PROJETO
    // =========================================================================

    pub async fn listar_projeto_equipes(
        &self,
        campanha_id: Uuid,
        filtro: &ProjetoEquipeFiltro,
    ) -> Result<Vec<ProjetoEquipe>, AppError> {
        let mut qb = QueryBuilder::new(SELECT_PROJETO_EQUIPE);
        filtro_projeto_equipes(&mut qb, campanha_id, filtro);
        qb.push(" ORDER BY pe.created_at DESC");

        let vinculos = qb.build_query_as::<ProjetoEquipe>().fetch_all(&self.pool).await?;
        Ok(vinculos)
    }

    pub async fn vincular_equipe(
        &self,
        campanha_id: Uuid,
        projeto_id: Uuid,
        equipe_id: Uuid,
        dados: &VincularEquipePayload,
    ) -> Result<ProjetoEquipe, AppError> {
        sqlx::query_as::<_, ProjetoEquipe>(
            r#"
            WITH novo AS (
                INSERT INTO projeto_equipe (
                    campanha_id, projeto_id, equipe_id, papel, observacoes, data_inicio, data_fim
                )
                VALUES ($1, $2, $3, $4, $5, COALESCE($6, CURRENT_DATE), $7)
                RETURNING *
            )
            SELECT novo.*, p.nome AS projeto_nome, e.nome AS equipe_nome, e.tipo_equipe AS equipe_tipo
            FROM novo
            JOIN projetos p ON p.id = novo.projeto_id
            JOIN equipe e ON e.id = novo.equipe_id
            "#,
        )
        .bind(campanha_id)
        .bind(projeto_id)
        .bind(equipe_id)
        .bind(dados.papel.as_deref().map(str::trim))
        .bind(dados.observacoes.as_deref())
        .bind(dados.data_inicio)
        .bind(dados.data_fim)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Equipe já está vinculada a este projeto"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_listing_is_scoped_and_excludes_archived() {
        let mut qb = QueryBuilder::new("SELECT * FROM projetos");
        filtro_projetos(&mut qb, Uuid::new_v4(), &ProjetoFiltro::default());
        assert_eq!(qb.sql(), "SELECT * FROM projetos WHERE campanha_id = $1 AND archived = $2");
    }

    #[test]
    fn task_filters_compose() {
        let filtro = TarefaFiltro {
            projeto_id: Some(Uuid::new_v4()),
            status: Some(TarefaStatus::Concluida),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT * FROM tarefas");
        filtro_tarefas(&mut qb, Uuid::new_v4(), &filtro);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM tarefas WHERE campanha_id = $1 AND archived = $2 AND projeto_id = $3 AND status = $4"
        );
    }

    #[test]
    fn team_links_default_to_active_and_filter_by_role() {
        let mut qb = QueryBuilder::new("SELECT pe.* FROM projeto_equipe pe");
        filtro_projeto_equipes(&mut qb, Uuid::new_v4(), &ProjetoEquipeFiltro::default());
        assert_eq!(qb.sql(), "SELECT pe.* FROM projeto_equipe pe WHERE pe.campanha_id = $1 AND pe.ativo = $2");

        let filtro = ProjetoEquipeFiltro {
            equipe_id: Some(Uuid::new_v4()),
            papel: Some(" apoio ".into()),
            ativo: Some(false),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT pe.* FROM projeto_equipe pe");
        filtro_projeto_equipes(&mut qb, Uuid::new_v4(), &filtro);
        assert_eq!(
            qb.sql(),
            "SELECT pe.* FROM projeto_equipe pe WHERE pe.campanha_id = $1 AND pe.ativo = $2 AND pe.equipe_id = $3 AND pe.papel = $4"
        );
    }

    async fn projeto_e_equipe(pool: &PgPool) -> (Uuid, Uuid, Uuid) {
        let campanha: Uuid = sqlx::query_scalar("INSERT INTO campanha (nome) VALUES ('Campanha') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
        let projeto: Uuid =
            sqlx::query_scalar("INSERT INTO projetos (campanha_id, nome) VALUES ($1, 'Mutirão') RETURNING id")
                .bind(campanha)
                .fetch_one(pool)
                .await
                .unwrap();
        let equipe: Uuid =
            sqlx::query_scalar("INSERT INTO equipe (campanha_id, nome) VALUES ($1, 'Rua') RETURNING id")
                .bind(campanha)
                .fetch_one(pool)
                .await
                .unwrap();
        (campanha, projeto, equipe)
    }

    #[sqlx::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn duplicate_team_link_is_a_conflict(pool: PgPool) {
        let repo = ProjetoRepository::new(pool.clone());
        let (campanha, projeto, equipe) = projeto_e_equipe(&pool).await;
        let dados = VincularEquipePayload {
            projeto_id: Some(projeto),
            equipe_id: Some(equipe),
            papel: Some("apoio".into()),
            observacoes: None,
            data_inicio: None,
            data_fim: None,
        };

        let vinculo = repo.vincular_equipe(campanha, projeto, equipe, &dados).await.unwrap();
        assert_eq!(vinculo.projeto_nome, "Mutirão");
        assert_eq!(vinculo.equipe_nome, "Rua");
        assert_eq!(vinculo.equipe_tipo, "operacional");
        assert!(vinculo.ativo);

        let err = repo.vincular_equipe(campanha, projeto, equipe, &dados).await.unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraintViolation(_)));

        let lista = repo.listar_projeto_equipes(campanha, &ProjetoEquipeFiltro::default()).await.unwrap();
        assert_eq!(lista.len(), 1);
    }
}

// src/db/cadastro_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, response::Pagination},
    models::campanha::{
        Area, AreaComContagem, AreaFiltro, AtualizarEleitorPayload, AtualizarLiderancaPayload,
        Colaborador, ColaboradorFiltro, CoordenadorRegional, Eleitor, EleitorFiltro, Lideranca,
        LiderancaFiltro, Municipio, MunicipioQuery, NovaAreaPayload, NovaLiderancaPayload,
        NovoColaboradorPayload, NovoEleitorPayload,
    },
};

// Colunas aceitas em `sort_by`, por recurso
pub const ORDENACAO_ELEITOR: &[&str] = &["nome_completo", "created_at", "updated_at"];
pub const ORDENACAO_LIDERANCA: &[&str] = &["nome_completo", "tipo", "cidade", "created_at"];
pub const ORDENACAO_COLABORADOR: &[&str] = &["nome_completo", "funcao", "created_at"];
pub const ORDENACAO_AREA: &[&str] = &["nome", "tipo", "cidade", "created_at"];

fn like(termo: &str) -> String {
    format!("%{}%", termo.trim())
}

// =============================================================================
//  MONTAGEM DAS LISTAGENS
//  Todo filtro começa por campanha_id; o restante é opcional.
// =============================================================================

fn filtro_eleitores(
    qb: &mut QueryBuilder<'static, Postgres>,
    campanha_id: Uuid,
    filtro: &EleitorFiltro,
) {
    qb.push(" WHERE campanha_id = ").push_bind(campanha_id);

    match filtro.ativo {
        Some(ativo) => {
            qb.push(" AND ativo = ").push_bind(ativo);
        }
        None => {
            qb.push(" AND ativo = TRUE");
        }
    }
    if let Some(area_id) = filtro.area_id {
        qb.push(" AND area_id = ").push_bind(area_id);
    }
    if let Some(search) = filtro.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let termo = like(search);
        qb.push(" AND (nome_completo ILIKE ")
            .push_bind(termo.clone())
            .push(" OR telefone ILIKE ")
            .push_bind(termo.clone())
            .push(" OR email ILIKE ")
            .push_bind(termo)
            .push(")");
    }
}

fn filtro_liderancas(
    qb: &mut QueryBuilder<'static, Postgres>,
    campanha_id: Uuid,
    filtro: &LiderancaFiltro,
) {
    qb.push(" WHERE campanha_id = ").push_bind(campanha_id);

    match filtro.ativo {
        Some(ativo) => {
            qb.push(" AND ativo = ").push_bind(ativo);
        }
        None => {
            qb.push(" AND ativo = TRUE");
        }
    }
    if let Some(coordenador) = filtro.coordenador_regional_id {
        qb.push(" AND coordenador_regional_id = ").push_bind(coordenador);
    }
    if let Some(tipo) = filtro.tipo.clone() {
        qb.push(" AND tipo = ").push_bind(tipo);
    }
    if let Some(search) = filtro.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let termo = like(search);
        qb.push(" AND (nome_completo ILIKE ")
            .push_bind(termo.clone())
            .push(" OR nome_popular ILIKE ")
            .push_bind(termo.clone())
            .push(" OR bairro ILIKE ")
            .push_bind(termo)
            .push(")");
    }
    if filtro.centro_e_raio().is_some() {
        qb.push(" AND latitude IS NOT NULL AND longitude IS NOT NULL");
    }
}

fn filtro_colaboradores(
    qb: &mut QueryBuilder<'static, Postgres>,
    campanha_id: Uuid,
    filtro: &ColaboradorFiltro,
) {
    qb.push(" WHERE campanha_id = ").push_bind(campanha_id);
    qb.push(" AND ativo = ").push_bind(filtro.ativo.unwrap_or(true));

    if let Some(search) = filtro.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let termo = like(search);
        qb.push(" AND (nome_completo ILIKE ")
            .push_bind(termo.clone())
            .push(" OR email ILIKE ")
            .push_bind(termo)
            .push(")");
    }
}

fn filtro_areas(qb: &mut QueryBuilder<'static, Postgres>, campanha_id: Uuid, filtro: &AreaFiltro) {
    qb.push(" WHERE a.campanha_id = ").push_bind(campanha_id);
    qb.push(" AND a.ativo = TRUE");

    if let Some(municipio_id) = filtro.municipio_id {
        qb.push(" AND a.municipio_id = ").push_bind(municipio_id);
    }
    if let Some(tipo) = filtro.tipo.clone() {
        qb.push(" AND a.tipo = ").push_bind(tipo);
    }
    if let Some(search) = filtro.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let termo = like(search);
        qb.push(" AND (a.nome ILIKE ")
            .push_bind(termo.clone())
            .push(" OR a.bairro ILIKE ")
            .push_bind(termo)
            .push(")");
    }
}

fn paginar(qb: &mut QueryBuilder<'static, Postgres>, ordem: String, pagination: &Pagination) {
    qb.push(" ORDER BY ")
        .push(ordem)
        .push(" LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());
}

#[derive(Clone)]
pub struct CadastroRepository {
    pool: PgPool,
}

impl CadastroRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Escritas fora de transação usam o próprio pool como executor
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  ELEITORES
    // =========================================================================

    pub async fn listar_eleitores(
        &self,
        campanha_id: Uuid,
        filtro: &EleitorFiltro,
        pagination: &Pagination,
    ) -> Result<(Vec<Eleitor>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM eleitor");
        filtro_eleitores(&mut count, campanha_id, filtro);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM eleitor");
        filtro_eleitores(&mut qb, campanha_id, filtro);
        paginar(&mut qb, pagination.order_clause(ORDENACAO_ELEITOR, "nome_completo"), pagination);
        let eleitores = qb.build_query_as::<Eleitor>().fetch_all(&self.pool).await?;

        Ok((eleitores, total))
    }

    pub async fn criar_eleitor<'e, E>(
        &self,
        executor: E,
        campanha_id: Uuid,
        dados: &NovoEleitorPayload,
        responsavel: Option<Uuid>,
    ) -> Result<Eleitor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let eleitor = sqlx::query_as::<_, Eleitor>(
            r#"
            INSERT INTO eleitor (
                campanha_id, area_id, nome_completo, cpf, email, telefone,
                data_nascimento, responsavel_cadastro
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(dados.area_id)
        .bind(dados.nome_completo.trim())
        .bind(dados.cpf.as_deref())
        .bind(dados.email.as_deref())
        .bind(dados.telefone.as_deref())
        .bind(dados.data_nascimento)
        .bind(responsavel)
        .fetch_one(executor)
        .await?;
        Ok(eleitor)
    }

    pub async fn atualizar_eleitor(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        dados: &AtualizarEleitorPayload,
    ) -> Result<Option<Eleitor>, AppError> {
        let eleitor = sqlx::query_as::<_, Eleitor>(
            r#"
            UPDATE eleitor
            SET nome_completo = COALESCE($3, nome_completo),
                cpf = COALESCE($4, cpf),
                email = COALESCE($5, email),
                telefone = COALESCE($6, telefone),
                data_nascimento = COALESCE($7, data_nascimento),
                area_id = COALESCE($8, area_id),
                ativo = COALESCE($9, ativo),
                updated_at = NOW()
            WHERE id = $1 AND campanha_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(campanha_id)
        .bind(dados.nome_completo.as_deref())
        .bind(dados.cpf.as_deref())
        .bind(dados.email.as_deref())
        .bind(dados.telefone.as_deref())
        .bind(dados.data_nascimento)
        .bind(dados.area_id)
        .bind(dados.ativo)
        .fetch_optional(&self.pool)
        .await?;
        Ok(eleitor)
    }

    pub async fn desativar_eleitor(&self, campanha_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE eleitor SET ativo = FALSE, updated_at = NOW() WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn vincular_lideranca_eleitor<'e, E>(
        &self,
        executor: E,
        campanha_id: Uuid,
        lideranca_id: Uuid,
        eleitor_id: Uuid,
        tipo_relacao: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO lideranca_eleitor (campanha_id, lideranca_id, eleitor_id, tipo_relacao)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(campanha_id)
        .bind(lideranca_id)
        .bind(eleitor_id)
        .bind(tipo_relacao)
        .execute(executor)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  LIDERANÇAS
    // =========================================================================

    pub async fn listar_liderancas(
        &self,
        campanha_id: Uuid,
        filtro: &LiderancaFiltro,
        pagination: &Pagination,
    ) -> Result<(Vec<Lideranca>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM lideranca");
        filtro_liderancas(&mut count, campanha_id, filtro);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM lideranca");
        filtro_liderancas(&mut qb, campanha_id, filtro);
        paginar(&mut qb, pagination.order_clause(ORDENACAO_LIDERANCA, "nome_completo"), pagination);
        let liderancas = qb.build_query_as::<Lideranca>().fetch_all(&self.pool).await?;

        Ok((liderancas, total))
    }

    /// Sem paginação: usado pelo filtro por raio, que precisa ver todas as
    /// lideranças com coordenadas antes de cortar a página.
    pub async fn listar_liderancas_com_coordenadas(
        &self,
        campanha_id: Uuid,
        filtro: &LiderancaFiltro,
        ordem: String,
    ) -> Result<Vec<Lideranca>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM lideranca");
        filtro_liderancas(&mut qb, campanha_id, filtro);
        qb.push(" ORDER BY ").push(ordem);
        let liderancas = qb.build_query_as::<Lideranca>().fetch_all(&self.pool).await?;
        Ok(liderancas)
    }

    pub async fn criar_lideranca<'e, E>(
        &self,
        executor: E,
        campanha_id: Uuid,
        dados: &NovaLiderancaPayload,
        status: &str,
    ) -> Result<Lideranca, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lideranca = sqlx::query_as::<_, Lideranca>(
            r#"
            INSERT INTO lideranca (
                campanha_id, coordenador_regional_id, nome_completo, nome_popular, telefone,
                tipo, nivel, alcance_estimado, cidade, bairro, estado, cep, logradouro,
                numero, complemento, latitude, longitude, status
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'comunitaria'), $7, $8, $9, $10,
                    upper($11), $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(dados.coordenador_regional_id)
        .bind(dados.nome_completo.trim())
        .bind(dados.nome_popular.as_deref())
        .bind(dados.telefone.as_deref())
        .bind(dados.tipo.as_deref())
        .bind(dados.nivel)
        .bind(dados.alcance_estimado)
        .bind(dados.cidade.as_deref())
        .bind(dados.bairro.as_deref())
        .bind(dados.estado.as_deref())
        .bind(dados.cep.as_deref())
        .bind(dados.logradouro.as_deref())
        .bind(dados.numero.as_deref())
        .bind(dados.complemento.as_deref())
        .bind(dados.latitude)
        .bind(dados.longitude)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(lideranca)
    }

    pub async fn atualizar_lideranca(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        dados: &AtualizarLiderancaPayload,
    ) -> Result<Option<Lideranca>, AppError> {
        let lideranca = sqlx::query_as::<_, Lideranca>(
            r#"
            UPDATE lideranca
            SET nome_completo = COALESCE($3, nome_completo),
                nome_popular = COALESCE($4, nome_popular),
                telefone = COALESCE($5, telefone),
                tipo = COALESCE($6, tipo),
                nivel = COALESCE($7, nivel),
                alcance_estimado = COALESCE($8, alcance_estimado),
                coordenador_regional_id = COALESCE($9, coordenador_regional_id),
                cidade = COALESCE($10, cidade),
                bairro = COALESCE($11, bairro),
                latitude = COALESCE($12, latitude),
                longitude = COALESCE($13, longitude),
                ativo = COALESCE($14, ativo),
                updated_at = NOW()
            WHERE id = $1 AND campanha_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(campanha_id)
        .bind(dados.nome_completo.as_deref())
        .bind(dados.nome_popular.as_deref())
        .bind(dados.telefone.as_deref())
        .bind(dados.tipo.as_deref())
        .bind(dados.nivel)
        .bind(dados.alcance_estimado)
        .bind(dados.coordenador_regional_id)
        .bind(dados.cidade.as_deref())
        .bind(dados.bairro.as_deref())
        .bind(dados.latitude)
        .bind(dados.longitude)
        .bind(dados.ativo)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lideranca)
    }

    pub async fn desativar_lideranca(&self, campanha_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE lideranca SET ativo = FALSE, updated_at = NOW() WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_lideranca(&self, campanha_id: Uuid, id: Uuid) -> Result<Option<Lideranca>, AppError> {
        let lideranca = sqlx::query_as::<_, Lideranca>(
            "SELECT * FROM lideranca WHERE id = $1 AND campanha_id = $2",
        )
        .bind(id)
        .bind(campanha_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lideranca)
    }

    pub async fn find_lideranca_by_profile<'e, E>(
        &self,
        executor: E,
        campanha_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Lideranca>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lideranca = sqlx::query_as::<_, Lideranca>(
            "SELECT * FROM lideranca WHERE campanha_id = $1 AND profile_id = $2 AND ativo = TRUE LIMIT 1",
        )
        .bind(campanha_id)
        .bind(profile_id)
        .fetch_optional(executor)
        .await?;
        Ok(lideranca)
    }

    /// Liderança provisória (criada com o convite) passa a ativa e ganha o perfil.
    pub async fn ativar_lideranca<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
    ) -> Result<Lideranca, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lideranca = sqlx::query_as::<_, Lideranca>(
            r#"
            UPDATE lideranca
            SET profile_id = $2, status = 'ativo', ativo = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(profile_id)
        .fetch_one(executor)
        .await?;
        Ok(lideranca)
    }

    pub async fn vincular_lideranca_area(
        &self,
        campanha_id: Uuid,
        lideranca_id: Uuid,
        area_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO lideranca_area (campanha_id, lideranca_id, area_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (lideranca_id, area_id) DO NOTHING
            "#,
        )
        .bind(campanha_id)
        .bind(lideranca_id)
        .bind(area_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  COORDENADORES E COLABORADORES
    // =========================================================================

    pub async fn listar_coordenadores(&self, campanha_id: Uuid) -> Result<Vec<CoordenadorRegional>, AppError> {
        let coordenadores = sqlx::query_as::<_, CoordenadorRegional>(
            "SELECT * FROM coordenador_regional WHERE campanha_id = $1 AND ativo = TRUE ORDER BY nome_completo",
        )
        .bind(campanha_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(coordenadores)
    }

    pub async fn criar_coordenador<'e, E>(
        &self,
        executor: E,
        campanha_id: Uuid,
        profile_id: Uuid,
        nome_completo: &str,
        telefone: Option<&str>,
    ) -> Result<CoordenadorRegional, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let coordenador = sqlx::query_as::<_, CoordenadorRegional>(
            r#"
            INSERT INTO coordenador_regional (campanha_id, profile_id, nome_completo, telefone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(profile_id)
        .bind(nome_completo)
        .bind(telefone)
        .fetch_one(executor)
        .await?;
        Ok(coordenador)
    }

    pub async fn listar_colaboradores(
        &self,
        campanha_id: Uuid,
        filtro: &ColaboradorFiltro,
        pagination: &Pagination,
    ) -> Result<(Vec<Colaborador>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM colaborador");
        filtro_colaboradores(&mut count, campanha_id, filtro);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM colaborador");
        filtro_colaboradores(&mut qb, campanha_id, filtro);
        paginar(&mut qb, pagination.order_clause(ORDENACAO_COLABORADOR, "nome_completo"), pagination);
        let colaboradores = qb.build_query_as::<Colaborador>().fetch_all(&self.pool).await?;

        Ok((colaboradores, total))
    }

    // Autocomplete: no máximo 10 resultados
    pub async fn buscar_colaboradores(&self, campanha_id: Uuid, termo: &str) -> Result<Vec<Colaborador>, AppError> {
        let colaboradores = sqlx::query_as::<_, Colaborador>(
            r#"
            SELECT * FROM colaborador
            WHERE campanha_id = $1 AND ativo = TRUE
              AND (nome_completo ILIKE $2 OR email ILIKE $2)
            ORDER BY nome_completo
            LIMIT 10
            "#,
        )
        .bind(campanha_id)
        .bind(like(termo))
        .fetch_all(&self.pool)
        .await?;
        Ok(colaboradores)
    }

    pub async fn criar_colaborador<'e, E>(
        &self,
        executor: E,
        campanha_id: Uuid,
        profile_id: Option<Uuid>,
        dados: &NovoColaboradorPayload,
    ) -> Result<Colaborador, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let colaborador = sqlx::query_as::<_, Colaborador>(
            r#"
            INSERT INTO colaborador (campanha_id, profile_id, nome_completo, email, telefone, funcao)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(profile_id)
        .bind(dados.nome_completo.trim())
        .bind(dados.email.as_deref())
        .bind(dados.telefone.as_deref())
        .bind(dados.funcao.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(colaborador)
    }

    // =========================================================================
    //  ÁREAS E MUNICÍPIOS
    // =========================================================================

    pub async fn listar_areas(
        &self,
        campanha_id: Uuid,
        filtro: &AreaFiltro,
        pagination: &Pagination,
    ) -> Result<(Vec<AreaComContagem>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM area a");
        filtro_areas(&mut count, campanha_id, filtro);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(
            r#"
            SELECT a.*,
                   (SELECT COUNT(*) FROM lideranca_area la
                     WHERE la.area_id = a.id AND la.ativo = TRUE) AS liderancas_count
            FROM area a
            "#,
        );
        filtro_areas(&mut qb, campanha_id, filtro);
        let ordem = format!("a.{}", pagination.order_clause(ORDENACAO_AREA, "nome"));
        paginar(&mut qb, ordem, pagination);
        let areas = qb.build_query_as::<AreaComContagem>().fetch_all(&self.pool).await?;

        Ok((areas, total))
    }

    pub async fn criar_area(
        &self,
        campanha_id: Uuid,
        dados: &NovaAreaPayload,
        needs_review: bool,
    ) -> Result<Area, AppError> {
        let area = sqlx::query_as::<_, Area>(
            r#"
            INSERT INTO area (
                campanha_id, municipio_id, nome, codigo, descricao, tipo, cidade, bairro,
                estado, latitude, longitude, needs_review
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'bairro'), $7, $8, upper($9), $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(campanha_id)
        .bind(dados.municipio_id)
        .bind(dados.nome.trim())
        .bind(dados.codigo.as_deref())
        .bind(dados.descricao.as_deref())
        .bind(dados.tipo.as_deref())
        .bind(dados.cidade.as_deref())
        .bind(dados.bairro.as_deref())
        .bind(dados.estado.as_deref())
        .bind(dados.latitude)
        .bind(dados.longitude)
        .bind(needs_review)
        .fetch_one(&self.pool)
        .await?;
        Ok(area)
    }

    // Primeira área ativa da campanha (destino padrão de eleitores via link)
    pub async fn find_area_padrao<'e, E>(&self, executor: E, campanha_id: Uuid) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let area_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM area WHERE campanha_id = $1 AND ativo = TRUE ORDER BY created_at LIMIT 1",
        )
        .bind(campanha_id)
        .fetch_optional(executor)
        .await?;
        Ok(area_id)
    }

    /// Área da campanha para o bairro informado, no mesmo município (ou cidade).
    pub async fn find_area_por_bairro(
        &self,
        campanha_id: Uuid,
        municipio_id: Option<Uuid>,
        cidade: &str,
        bairro: &str,
    ) -> Result<Option<Area>, AppError> {
        let area = sqlx::query_as::<_, Area>(
            r#"
            SELECT * FROM area
            WHERE campanha_id = $1 AND ativo = TRUE
              AND lower(bairro) = lower($4)
              AND (municipio_id = $2 OR lower(cidade) = lower($3))
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(campanha_id)
        .bind(municipio_id)
        .bind(cidade)
        .bind(bairro)
        .fetch_optional(&self.pool)
        .await?;
        Ok(area)
    }

    pub async fn listar_municipios(&self, query: &MunicipioQuery) -> Result<Vec<Municipio>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM municipio WHERE ativo = TRUE");
        if let Some(uf) = query.uf.as_deref().filter(|u| !u.trim().is_empty()) {
            qb.push(" AND uf = upper(").push_bind(uf.trim().to_string()).push(")");
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            qb.push(" AND nome ILIKE ").push_bind(like(search));
        }
        qb.push(" ORDER BY nome LIMIT 50");
        let municipios = qb.build_query_as::<Municipio>().fetch_all(&self.pool).await?;
        Ok(municipios)
    }

    pub async fn find_municipio_por_nome(&self, nome: &str, uf: Option<&str>) -> Result<Option<Municipio>, AppError> {
        let municipio = sqlx::query_as::<_, Municipio>(
            r#"
            SELECT * FROM municipio
            WHERE lower(nome) = lower($1) AND ($2::text IS NULL OR uf = upper($2))
            LIMIT 1
            "#,
        )
        .bind(nome.trim())
        .bind(uf)
        .fetch_optional(&self.pool)
        .await?;
        Ok(municipio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campanha() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn eleitor_listing_is_scoped_to_campanha() {
        let mut qb = QueryBuilder::new("SELECT * FROM eleitor");
        filtro_eleitores(&mut qb, campanha(), &EleitorFiltro::default());
        assert_eq!(qb.sql(), "SELECT * FROM eleitor WHERE campanha_id = $1 AND ativo = TRUE");
    }

    #[test]
    fn eleitor_filters_are_bound_after_campanha() {
        let filtro = EleitorFiltro {
            search: Some("maria".into()),
            area_id: Some(Uuid::new_v4()),
            ativo: Some(false),
        };
        let mut qb = QueryBuilder::new("SELECT * FROM eleitor");
        filtro_eleitores(&mut qb, campanha(), &filtro);
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT * FROM eleitor WHERE campanha_id = $1"));
        assert!(sql.contains("ativo = $2"));
        assert!(sql.contains("area_id = $3"));
        assert!(sql.contains("nome_completo ILIKE $4"));
        // Termo de busca sempre vai como parâmetro
        assert!(!sql.contains("maria"));
    }

    #[test]
    fn every_listing_starts_with_campanha_filter() {
        let mut qb = QueryBuilder::new("SELECT * FROM lideranca");
        filtro_liderancas(&mut qb, campanha(), &LiderancaFiltro { search: Some("x".into()), ..Default::default() });
        assert!(qb.sql().starts_with("SELECT * FROM lideranca WHERE campanha_id = $1"));

        let mut qb = QueryBuilder::new("SELECT * FROM colaborador");
        filtro_colaboradores(&mut qb, campanha(), &ColaboradorFiltro::default());
        assert!(qb.sql().starts_with("SELECT * FROM colaborador WHERE campanha_id = $1"));

        let mut qb = QueryBuilder::new("SELECT * FROM area a");
        filtro_areas(&mut qb, campanha(), &AreaFiltro::default());
        assert!(qb.sql().starts_with("SELECT * FROM area a WHERE a.campanha_id = $1"));
    }

    #[test]
    fn radius_filter_requires_coordinates() {
        let filtro = LiderancaFiltro { lat: Some(-15.8), lng: Some(-47.9), raio_km: Some(3.0), ..Default::default() };
        let mut qb = QueryBuilder::new("SELECT * FROM lideranca");
        filtro_liderancas(&mut qb, campanha(), &filtro);
        assert!(qb.sql().ends_with("AND latitude IS NOT NULL AND longitude IS NOT NULL"));
    }

    #[test]
    fn unknown_sort_column_falls_back() {
        let pagination = Pagination {
            sort_by: Some("senha_hash; DROP TABLE eleitor".into()),
            sort_order: Some("desc".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT * FROM eleitor");
        filtro_eleitores(&mut qb, campanha(), &EleitorFiltro::default());
        paginar(&mut qb, pagination.order_clause(ORDENACAO_ELEITOR, "nome_completo"), &pagination);
        assert!(qb.sql().contains("ORDER BY nome_completo DESC LIMIT $2 OFFSET $3"));
    }
}

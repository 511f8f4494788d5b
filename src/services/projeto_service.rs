// src/services/projeto_service.rs

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        response::{PaginatedResponse, Pagination},
    },
    db::{
        referencia::{exigir_da_campanha, Referencia},
        ProjetoRepository,
    },
    models::campanha::{
        resolver_completed_at, AtualizarTarefaPayload, CategoriaPayload, CategoriaProjeto, EstatisticasProjeto,
        NovaTarefaPayload, Projeto, ProjetoDetalhe, ProjetoEquipe, ProjetoEquipeFiltro, ProjetoFiltro,
        ProjetoPayload, Tarefa, TarefaFiltro, TarefaStatus, VincularEquipePayload,
    },
};

fn nome_obrigatorio(nome: Option<&str>) -> Result<&str, AppError> {
    nome.map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Nome é obrigatório".into()))
}

fn projeto_nao_encontrado() -> AppError {
    AppError::NotFound("Projeto não encontrado".into())
}

fn tarefa_nao_encontrada() -> AppError {
    AppError::NotFound("Tarefa não encontrada".into())
}

#[derive(Clone)]
pub struct ProjetoService {
    repo: ProjetoRepository,
}

impl ProjetoService {
    pub fn new(repo: ProjetoRepository) -> Self {
        Self { repo }
    }

    // --- Categorias ---

    pub async fn listar_categorias(&self, campanha_id: Uuid) -> Result<Vec<CategoriaProjeto>, AppError> {
        self.repo.listar_categorias(campanha_id).await
    }

    pub async fn criar_categoria(
        &self,
        campanha_id: Uuid,
        payload: CategoriaPayload,
    ) -> Result<CategoriaProjeto, AppError> {
        payload.validate()?;
        let nome = nome_obrigatorio(payload.nome.as_deref())?;
        self.repo.criar_categoria(campanha_id, nome, &payload).await
    }

    pub async fn atualizar_categoria(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        payload: CategoriaPayload,
    ) -> Result<CategoriaProjeto, AppError> {
        payload.validate()?;
        self.repo
            .atualizar_categoria(campanha_id, id, &payload)
            .await?
            .ok_or_else(|| AppError::NotFound("Categoria não encontrada".into()))
    }

    pub async fn desativar_categoria(&self, campanha_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.desativar_categoria(campanha_id, id).await? {
            return Err(AppError::NotFound("Categoria não encontrada".into()));
        }
        Ok(())
    }

    // --- Projetos ---

    pub async fn listar_projetos(
        &self,
        campanha_id: Uuid,
        filtro: &ProjetoFiltro,
        pagination: &Pagination,
    ) -> Result<PaginatedResponse<Projeto>, AppError> {
        let (projetos, total) = self.repo.listar_projetos(campanha_id, filtro, pagination).await?;
        Ok(PaginatedResponse::new(projetos, total, pagination))
    }

    /// Projeto com o progresso calculado a partir das tarefas não arquivadas.
    pub async fn detalhar_projeto(&self, campanha_id: Uuid, id: Uuid) -> Result<ProjetoDetalhe, AppError> {
        let projeto = self
            .repo
            .find_projeto(campanha_id, id)
            .await?
            .ok_or_else(projeto_nao_encontrado)?;

        let (total, concluidas) = self.repo.contar_tarefas(campanha_id, id).await?;

        Ok(ProjetoDetalhe {
            projeto,
            estatisticas: EstatisticasProjeto::new(total, concluidas),
        })
    }

    pub async fn criar_projeto(&self, campanha_id: Uuid, payload: ProjetoPayload) -> Result<Projeto, AppError> {
        payload.validate()?;
        let nome = nome_obrigatorio(payload.nome.as_deref())?;
        self.exigir_referencias_do_projeto(campanha_id, &payload).await?;

        let projeto = self.repo.criar_projeto(campanha_id, nome, &payload).await?;
        tracing::info!("📁 Projeto {} criado na campanha {}", projeto.id, campanha_id);
        Ok(projeto)
    }

    pub async fn atualizar_projeto(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        payload: ProjetoPayload,
    ) -> Result<Projeto, AppError> {
        payload.validate()?;
        self.exigir_referencias_do_projeto(campanha_id, &payload).await?;
        self.repo
            .atualizar_projeto(campanha_id, id, &payload)
            .await?
            .ok_or_else(projeto_nao_encontrado)
    }

    async fn exigir_referencias_do_projeto(&self, campanha_id: Uuid, payload: &ProjetoPayload) -> Result<(), AppError> {
        exigir_da_campanha(self.repo.pool(), Referencia::CategoriaProjeto, payload.categoria_id, campanha_id).await?;
        exigir_da_campanha(self.repo.pool(), Referencia::Colaborador, payload.responsavel_id, campanha_id).await
    }

    pub async fn arquivar_projeto(&self, campanha_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.arquivar_projeto(campanha_id, id).await? {
            return Err(projeto_nao_encontrado());
        }
        Ok(())
    }

    // --- Tarefas ---

    pub async fn listar_tarefas(
        &self,
        campanha_id: Uuid,
        filtro: &TarefaFiltro,
        pagination: &Pagination,
    ) -> Result<PaginatedResponse<Tarefa>, AppError> {
        let (tarefas, total) = self.repo.listar_tarefas(campanha_id, filtro, pagination).await?;
        Ok(PaginatedResponse::new(tarefas, total, pagination))
    }

    pub async fn buscar_tarefa(&self, campanha_id: Uuid, id: Uuid) -> Result<Tarefa, AppError> {
        self.repo
            .find_tarefa(campanha_id, id)
            .await?
            .ok_or_else(tarefa_nao_encontrada)
    }

    pub async fn criar_tarefa(&self, campanha_id: Uuid, payload: NovaTarefaPayload) -> Result<Tarefa, AppError> {
        payload.validate()?;

        // Projeto e responsável precisam ser da mesma campanha
        if self.repo.find_projeto(campanha_id, payload.projeto_id).await?.is_none() {
            return Err(projeto_nao_encontrado());
        }
        exigir_da_campanha(
            self.repo.pool(),
            Referencia::Colaborador,
            payload.colaborador_responsavel_id,
            campanha_id,
        )
        .await?;

        let status = payload.status.unwrap_or(TarefaStatus::AFazer);
        let completed_at = resolver_completed_at(Some(status), None, Utc::now());

        self.repo.criar_tarefa(campanha_id, &payload, status, completed_at).await
    }

    pub async fn atualizar_tarefa(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        payload: AtualizarTarefaPayload,
    ) -> Result<Tarefa, AppError> {
        payload.validate()?;

        let atual = self.buscar_tarefa(campanha_id, id).await?;
        exigir_da_campanha(
            self.repo.pool(),
            Referencia::Colaborador,
            payload.colaborador_responsavel_id,
            campanha_id,
        )
        .await?;
        let completed_at = resolver_completed_at(payload.status, atual.completed_at, Utc::now());

        self.repo
            .atualizar_tarefa(campanha_id, id, &payload, completed_at)
            .await?
            .ok_or_else(tarefa_nao_encontrada)
    }

    pub async fn arquivar_tarefa(&self, campanha_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.arquivar_tarefa(campanha_id, id).await? {
            return Err(tarefa_nao_encontrada());
        }
        Ok(())
    }

    // --- Equipes do projeto ---

    pub async fn listar_projeto_equipes(
        &self,
        campanha_id: Uuid,
        filtro: &ProjetoEquipeFiltro,
    ) -> Result<Vec<ProjetoEquipe>, AppError> {
        self.repo.listar_projeto_equipes(campanha_id, filtro).await
    }

    pub async fn vincular_equipe(
        &self,
        campanha_id: Uuid,
        payload: VincularEquipePayload,
    ) -> Result<ProjetoEquipe, AppError> {
        payload.validate()?;
        let (projeto_id, equipe_id) = payload.ids()?;

        exigir_da_campanha(self.repo.pool(), Referencia::Projeto, Some(projeto_id), campanha_id).await?;
        exigir_da_campanha(self.repo.pool(), Referencia::Equipe, Some(equipe_id), campanha_id).await?;

        let vinculo = self.repo.vincular_equipe(campanha_id, projeto_id, equipe_id, &payload).await?;
        tracing::info!("🤝 Equipe {} vinculada ao projeto {}", equipe_id, projeto_id);
        Ok(vinculo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert!(matches!(nome_obrigatorio(None), Err(AppError::BadRequest(_))));
        assert!(matches!(nome_obrigatorio(Some("   ")), Err(AppError::BadRequest(_))));
        assert_eq!(nome_obrigatorio(Some(" Mutirão ")).unwrap(), "Mutirão");
    }

    async fn campanha_com_projeto(pool: &sqlx::PgPool, nome: &str) -> (Uuid, Uuid) {
        let campanha: Uuid = sqlx::query_scalar("INSERT INTO campanha (nome) VALUES ($1) RETURNING id")
            .bind(nome)
            .fetch_one(pool)
            .await
            .unwrap();
        let projeto: Uuid =
            sqlx::query_scalar("INSERT INTO projetos (campanha_id, nome) VALUES ($1, 'Mutirão') RETURNING id")
                .bind(campanha)
                .fetch_one(pool)
                .await
                .unwrap();
        (campanha, projeto)
    }

    fn vinculo(projeto_id: Uuid, equipe_id: Uuid) -> VincularEquipePayload {
        VincularEquipePayload {
            projeto_id: Some(projeto_id),
            equipe_id: Some(equipe_id),
            papel: None,
            observacoes: None,
            data_inicio: None,
            data_fim: None,
        }
    }

    #[sqlx::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn linking_unknown_or_foreign_team_is_not_found(pool: sqlx::PgPool) {
        let service = ProjetoService::new(ProjetoRepository::new(pool.clone()));
        let (minha, projeto) = campanha_com_projeto(&pool, "Minha").await;
        let (outra, _) = campanha_com_projeto(&pool, "Outra").await;
        let equipe_alheia: Uuid =
            sqlx::query_scalar("INSERT INTO equipe (campanha_id, nome) VALUES ($1, 'Rua') RETURNING id")
                .bind(outra)
                .fetch_one(&pool)
                .await
                .unwrap();

        let err = service.vincular_equipe(minha, vinculo(projeto, equipe_alheia)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(m) if m == "Equipe não encontrada"));

        let err = service.vincular_equipe(minha, vinculo(Uuid::new_v4(), equipe_alheia)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(m) if m == "Projeto não encontrado"));

        let sem_equipe = VincularEquipePayload { equipe_id: None, ..vinculo(projeto, equipe_alheia) };
        assert!(matches!(service.vincular_equipe(minha, sem_equipe).await, Err(AppError::BadRequest(_))));
    }
}

// src/models/campanha.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

use crate::common::error::AppError;

// =============================================================================
//  CAMPANHA (o tenant)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Campanha {
    pub id: Uuid,
    pub nome: String,
    pub nome_candidato: Option<String>,
    pub cargo_pretendido: Option<String>,
    pub partido: Option<String>,
    pub uf: String,
    pub plano_tipo: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados expostos na página pública do convite de eleitor
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CampanhaPublica {
    pub nome: String,
    pub nome_candidato: Option<String>,
    pub cargo_pretendido: Option<String>,
    pub partido: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OnboardingAdminPayload {
    #[validate(length(min = 2, message = "O nome da campanha deve ter no mínimo 2 caracteres"))]
    pub nome: String,
    pub nome_candidato: Option<String>,
    pub cargo_pretendido: Option<String>,
    pub partido: Option<String>,
    #[validate(length(equal = 2, message = "UF deve ter 2 letras"))]
    pub uf: String,
}

// =============================================================================
//  GEOGRAFIA
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Municipio {
    pub id: Uuid,
    pub nome: String,
    pub uf: String,
    pub codigo_ibge: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ativo: bool,
}

#[derive(Debug, Deserialize)]
pub struct MunicipioQuery {
    pub search: Option<String>,
    pub uf: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Area {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub municipio_id: Option<Uuid>,
    pub nome: String,
    pub codigo: Option<String>,
    pub descricao: Option<String>,
    pub tipo: String,
    pub cidade: Option<String>,
    pub bairro: Option<String>,
    pub estado: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub needs_review: bool,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AreaComContagem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub area: Area,
    pub liderancas_count: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovaAreaPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: String,
    pub codigo: Option<String>,
    pub descricao: Option<String>,
    pub tipo: Option<String>,
    pub municipio_id: Option<Uuid>,
    pub cidade: Option<String>,
    pub bairro: Option<String>,
    #[validate(length(equal = 2, message = "UF deve ter 2 letras"))]
    pub estado: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude inválida"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude inválida"))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AreaFiltro {
    pub search: Option<String>,
    pub municipio_id: Option<Uuid>,
    pub tipo: Option<String>,
}

// =============================================================================
//  PESSOAS: ELEITORES, LIDERANÇAS, COLABORADORES, COORDENADORES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Eleitor {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub area_id: Option<Uuid>,
    pub nome_completo: String,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub responsavel_cadastro: Option<Uuid>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovoEleitorPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome_completo: String,
    pub cpf: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub area_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AtualizarEleitorPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome_completo: Option<String>,
    pub cpf: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub area_id: Option<Uuid>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EleitorFiltro {
    pub search: Option<String>,
    pub area_id: Option<Uuid>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lideranca {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub coordenador_regional_id: Option<Uuid>,
    pub nome_completo: String,
    pub nome_popular: Option<String>,
    pub telefone: Option<String>,
    pub tipo: String,
    pub nivel: Option<i32>,
    pub alcance_estimado: Option<i32>,
    pub cidade: Option<String>,
    pub bairro: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub logradouro: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lideranca {
    pub fn coordenadas(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovaLiderancaPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome_completo: String,
    pub nome_popular: Option<String>,
    pub telefone: Option<String>,
    pub tipo: Option<String>,
    pub nivel: Option<i32>,
    pub alcance_estimado: Option<i32>,
    pub coordenador_regional_id: Option<Uuid>,
    pub cidade: Option<String>,
    pub bairro: Option<String>,
    #[validate(length(equal = 2, message = "UF deve ter 2 letras"))]
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub logradouro: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude inválida"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude inválida"))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AtualizarLiderancaPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome_completo: Option<String>,
    pub nome_popular: Option<String>,
    pub telefone: Option<String>,
    pub tipo: Option<String>,
    pub nivel: Option<i32>,
    pub alcance_estimado: Option<i32>,
    pub coordenador_regional_id: Option<Uuid>,
    pub cidade: Option<String>,
    pub bairro: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LiderancaFiltro {
    pub search: Option<String>,
    pub coordenador_regional_id: Option<Uuid>,
    pub tipo: Option<String>,
    pub ativo: Option<bool>,
    // Filtro por raio (Haversine)
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub raio_km: Option<f64>,
}

impl LiderancaFiltro {
    pub fn centro_e_raio(&self) -> Option<((f64, f64), f64)> {
        Some(((self.lat?, self.lng?), self.raio_km?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Colaborador {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub nome_completo: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub funcao: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovoColaboradorPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome_completo: String,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub funcao: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ColaboradorFiltro {
    pub search: Option<String>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct BuscaQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CoordenadorRegional {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub nome_completo: String,
    pub telefone: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
//  GESTÃO DE PROJETOS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CategoriaProjeto {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub nome: String,
    pub descricao: Option<String>,
    pub cor: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoriaPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: Option<String>,
    pub descricao: Option<String>,
    #[validate(length(equal = 7, message = "Cor deve estar no formato #RRGGBB"))]
    pub cor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Projeto {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub categoria_id: Option<Uuid>,
    pub responsavel_id: Option<Uuid>,
    pub nome: String,
    pub descricao: Option<String>,
    pub status: String,
    pub prioridade: String,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProjetoPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub categoria_id: Option<Uuid>,
    pub responsavel_id: Option<Uuid>,
    pub status: Option<String>,
    pub prioridade: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjetoFiltro {
    pub search: Option<String>,
    pub status: Option<String>,
    pub categoria_id: Option<Uuid>,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Serialize)]
pub struct EstatisticasProjeto {
    pub total_tarefas: i64,
    pub tarefas_concluidas: i64,
    pub progresso: i64,
}

impl EstatisticasProjeto {
    pub fn new(total_tarefas: i64, tarefas_concluidas: i64) -> Self {
        let progresso = if total_tarefas > 0 {
            (tarefas_concluidas * 100 + total_tarefas / 2) / total_tarefas
        } else {
            0
        };
        Self { total_tarefas, tarefas_concluidas, progresso }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjetoDetalhe {
    #[serde(flatten)]
    pub projeto: Projeto,
    pub estatisticas: EstatisticasProjeto,
}

// --- Equipes vinculadas a projetos ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProjetoEquipe {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub projeto_id: Uuid,
    pub equipe_id: Uuid,
    pub papel: Option<String>,
    pub observacoes: Option<String>,
    pub ativo: bool,
    pub data_inicio: NaiveDate,
    pub data_fim: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub projeto_nome: String,
    pub equipe_nome: String,
    pub equipe_tipo: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VincularEquipePayload {
    pub projeto_id: Option<Uuid>,
    pub equipe_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Papel não pode ser vazio"))]
    pub papel: Option<String>,
    pub observacoes: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

impl VincularEquipePayload {
    /// (projeto_id, equipe_id); os dois são obrigatórios.
    pub fn ids(&self) -> Result<(Uuid, Uuid), AppError> {
        match (self.projeto_id, self.equipe_id) {
            (Some(projeto_id), Some(equipe_id)) => Ok((projeto_id, equipe_id)),
            _ => Err(AppError::BadRequest("projeto_id e equipe_id são obrigatórios".into())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjetoEquipeFiltro {
    pub projeto_id: Option<Uuid>,
    pub equipe_id: Option<Uuid>,
    pub papel: Option<String>,
    pub ativo: Option<bool>,
}

// Mapeia o CREATE TYPE tarefa_status do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "tarefa_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TarefaStatus {
    AFazer,
    EmAndamento,
    Concluida,
}

/// `completed_at` acompanha o status: preenchido ao concluir, limpo ao reabrir.
pub fn resolver_completed_at(
    novo_status: Option<TarefaStatus>,
    atual: Option<DateTime<Utc>>,
    agora: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match novo_status {
        Some(TarefaStatus::Concluida) => atual.or(Some(agora)),
        Some(_) => None,
        None => atual,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tarefa {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub projeto_id: Uuid,
    pub colaborador_responsavel_id: Option<Uuid>,
    pub titulo: String,
    pub descricao: Option<String>,
    pub status: TarefaStatus,
    pub prioridade: String,
    pub data_vencimento: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovaTarefaPayload {
    pub projeto_id: Uuid,
    #[validate(length(min = 1, message = "Título é obrigatório"))]
    pub titulo: String,
    pub descricao: Option<String>,
    pub status: Option<TarefaStatus>,
    pub prioridade: Option<String>,
    pub colaborador_responsavel_id: Option<Uuid>,
    pub data_vencimento: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AtualizarTarefaPayload {
    #[validate(length(min = 1, message = "Título é obrigatório"))]
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub status: Option<TarefaStatus>,
    pub prioridade: Option<String>,
    pub colaborador_responsavel_id: Option<Uuid>,
    pub data_vencimento: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TarefaFiltro {
    pub projeto_id: Option<Uuid>,
    pub status: Option<TarefaStatus>,
    pub colaborador_responsavel_id: Option<Uuid>,
    pub search: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

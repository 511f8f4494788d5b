// src/handlers/projetos.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::{error::AppError, extract::JsonBody, response::{ApiResponse, Pagination}},
    config::AppState,
    middleware::auth::CampanhaContext,
    models::campanha::{
        AtualizarTarefaPayload, CategoriaPayload, NovaTarefaPayload, ProjetoEquipeFiltro, ProjetoFiltro,
        ProjetoPayload, TarefaFiltro, VincularEquipePayload,
    },
};

// --- Categorias ---

#[utoipa::path(
    get,
    path = "/api/supabase/categorias-projeto",
    tag = "Projetos",
    responses(
        (status = 200, description = "Categorias ativas")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_categorias(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
) -> Result<impl IntoResponse, AppError> {
    let categorias = app_state.projeto_service.listar_categorias(campanha_id).await?;
    Ok(Json(ApiResponse::ok(categorias)))
}

#[utoipa::path(
    post,
    path = "/api/supabase/categorias-projeto",
    tag = "Projetos",
    request_body = CategoriaPayload,
    responses(
        (status = 201, description = "Categoria criada")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_categoria(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<CategoriaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let categoria = app_state.projeto_service.criar_categoria(campanha_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(categoria))))
}

#[utoipa::path(
    put,
    path = "/api/supabase/categorias-projeto/{id}",
    tag = "Projetos",
    request_body = CategoriaPayload,
    responses(
        (status = 200, description = "Categoria atualizada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_categoria(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<CategoriaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let categoria = app_state
        .projeto_service
        .atualizar_categoria(campanha_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::ok(categoria)))
}

#[utoipa::path(
    delete,
    path = "/api/supabase/categorias-projeto/{id}",
    tag = "Projetos",
    responses(
        (status = 200, description = "Categoria desativada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn desativar_categoria(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.projeto_service.desativar_categoria(campanha_id, id).await?;
    Ok(Json(ApiResponse::ok(json!({ "id": id }))))
}

// --- Projetos ---

#[utoipa::path(
    get,
    path = "/api/supabase/projetos",
    tag = "Projetos",
    responses(
        (status = 200, description = "Projetos paginados")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_projetos(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Query(filtro): Query<ProjetoFiltro>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let pagina = app_state
        .projeto_service
        .listar_projetos(campanha_id, &filtro, &pagination)
        .await?;
    Ok(Json(pagina))
}

#[utoipa::path(
    get,
    path = "/api/supabase/projetos/{id}",
    tag = "Projetos",
    responses(
        (status = 200, description = "Projeto com estatísticas")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn detalhar_projeto(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detalhe = app_state.projeto_service.detalhar_projeto(campanha_id, id).await?;
    Ok(Json(ApiResponse::ok(detalhe)))
}

#[utoipa::path(
    post,
    path = "/api/supabase/projetos",
    tag = "Projetos",
    request_body = ProjetoPayload,
    responses(
        (status = 201, description = "Projeto criado")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_projeto(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<ProjetoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let projeto = app_state.projeto_service.criar_projeto(campanha_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(projeto))))
}

#[utoipa::path(
    put,
    path = "/api/supabase/projetos/{id}",
    tag = "Projetos",
    request_body = ProjetoPayload,
    responses(
        (status = 200, description = "Projeto atualizado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_projeto(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<ProjetoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let projeto = app_state
        .projeto_service
        .atualizar_projeto(campanha_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::ok(projeto)))
}

#[utoipa::path(
    delete,
    path = "/api/supabase/projetos/{id}",
    tag = "Projetos",
    responses(
        (status = 200, description = "Projeto arquivado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn arquivar_projeto(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.projeto_service.arquivar_projeto(campanha_id, id).await?;
    Ok(Json(ApiResponse::ok(json!({ "id": id }))))
}

// --- Tarefas ---

#[utoipa::path(
    get,
    path = "/api/supabase/tarefas",
    tag = "Projetos",
    responses(
        (status = 200, description = "Tarefas paginadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_tarefas(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Query(filtro): Query<TarefaFiltro>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let pagina = app_state
        .projeto_service
        .listar_tarefas(campanha_id, &filtro, &pagination)
        .await?;
    Ok(Json(pagina))
}

#[utoipa::path(
    get,
    path = "/api/supabase/tarefas/{id}",
    tag = "Projetos",
    responses(
        (status = 200, description = "Tarefa")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn buscar_tarefa(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tarefa = app_state.projeto_service.buscar_tarefa(campanha_id, id).await?;
    Ok(Json(ApiResponse::ok(tarefa)))
}

#[utoipa::path(
    post,
    path = "/api/supabase/tarefas",
    tag = "Projetos",
    request_body = NovaTarefaPayload,
    responses(
        (status = 201, description = "Tarefa criada")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_tarefa(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<NovaTarefaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tarefa = app_state.projeto_service.criar_tarefa(campanha_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tarefa))))
}

#[utoipa::path(
    put,
    path = "/api/supabase/tarefas/{id}",
    tag = "Projetos",
    request_body = AtualizarTarefaPayload,
    responses(
        (status = 200, description = "Tarefa atualizada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_tarefa(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<AtualizarTarefaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tarefa = app_state
        .projeto_service
        .atualizar_tarefa(campanha_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::ok(tarefa)))
}

#[utoipa::path(
    delete,
    path = "/api/supabase/tarefas/{id}",
    tag = "Projetos",
    responses(
        (status = 200, description = "Tarefa arquivada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn arquivar_tarefa(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.projeto_service.arquivar_tarefa(campanha_id, id).await?;
    Ok(Json(ApiResponse::ok(json!({ "id": id }))))
}

// --- Equipes do projeto ---

#[utoipa::path(
    get,
    path = "/api/supabase/projeto-equipes",
    tag = "Projetos",
    params(
        ("projeto_id" = Option<Uuid>, Query, description = "Filtra por projeto"),
        ("equipe_id" = Option<Uuid>, Query, description = "Filtra por equipe"),
        ("papel" = Option<String>, Query, description = "Papel da equipe no projeto"),
        ("ativo" = Option<bool>, Query, description = "Padrão: true")
    ),
    responses(
        (status = 200, description = "Vínculos equipe/projeto")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_projeto_equipes(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Query(filtro): Query<ProjetoEquipeFiltro>,
) -> Result<impl IntoResponse, AppError> {
    let vinculos = app_state
        .projeto_service
        .listar_projeto_equipes(campanha_id, &filtro)
        .await?;
    Ok(Json(ApiResponse::ok(vinculos)))
}

#[utoipa::path(
    post,
    path = "/api/supabase/projeto-equipes",
    tag = "Projetos",
    request_body = VincularEquipePayload,
    responses(
        (status = 201, description = "Equipe vinculada"),
        (status = 404, description = "Projeto ou equipe não encontrado"),
        (status = 409, description = "Equipe já vinculada ao projeto")
    ),
    security(("api_jwt" = []))
)]
pub async fn vincular_equipe(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<VincularEquipePayload>,
) -> Result<impl IntoResponse, AppError> {
    let vinculo = app_state.projeto_service.vincular_equipe(campanha_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(vinculo))))
}

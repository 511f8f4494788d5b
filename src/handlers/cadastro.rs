// src/handlers/cadastro.rs

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
    middleware::auth::{AuthenticatedUser, CampanhaContext},
    models::campanha::{
        AreaFiltro, AtualizarEleitorPayload, AtualizarLiderancaPayload, BuscaQuery, ColaboradorFiltro, EleitorFiltro,
        LiderancaFiltro, MunicipioQuery, NovaAreaPayload, NovaLiderancaPayload, NovoColaboradorPayload,
        NovoEleitorPayload,
    },
};

// ---
// Eleitores
// ---

#[utoipa::path(
    get,
    path = "/api/supabase/eleitores",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Eleitores paginados")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_eleitores(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Query(filtro): Query<EleitorFiltro>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let pagina = app_state
        .cadastro_service
        .listar_eleitores(campanha_id, &filtro, &pagination)
        .await?;
    Ok(Json(pagina))
}

#[utoipa::path(
    post,
    path = "/api/supabase/eleitores",
    tag = "Cadastro",
    request_body = NovoEleitorPayload,
    responses(
        (status = 201, description = "Eleitor criado")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_eleitor(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<NovoEleitorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let eleitor = app_state
        .cadastro_service
        .criar_eleitor(campanha_id, profile.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(eleitor))))
}

#[utoipa::path(
    put,
    path = "/api/supabase/eleitores/{id}",
    tag = "Cadastro",
    request_body = AtualizarEleitorPayload,
    responses(
        (status = 200, description = "Eleitor atualizado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_eleitor(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<AtualizarEleitorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let eleitor = app_state
        .cadastro_service
        .atualizar_eleitor(campanha_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::ok(eleitor)))
}

#[utoipa::path(
    delete,
    path = "/api/supabase/eleitores/{id}",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Eleitor desativado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn desativar_eleitor(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.cadastro_service.desativar_eleitor(campanha_id, id).await?;
    Ok(Json(ApiResponse::ok(json!({ "id": id }))))
}

// ---
// Lideranças
// ---

#[utoipa::path(
    get,
    path = "/api/mobile/liderancas",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Lideranças paginadas (com filtro por raio)")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_liderancas(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Query(filtro): Query<LiderancaFiltro>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let pagina = app_state
        .cadastro_service
        .listar_liderancas(campanha_id, &filtro, &pagination)
        .await?;
    Ok(Json(pagina))
}

#[utoipa::path(
    post,
    path = "/api/mobile/liderancas",
    tag = "Cadastro",
    request_body = NovaLiderancaPayload,
    responses(
        (status = 201, description = "Liderança criada")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_lideranca(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<NovaLiderancaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lideranca = app_state.cadastro_service.criar_lideranca(campanha_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(lideranca))))
}

#[utoipa::path(
    put,
    path = "/api/mobile/liderancas/{id}",
    tag = "Cadastro",
    request_body = AtualizarLiderancaPayload,
    responses(
        (status = 200, description = "Liderança atualizada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_lideranca(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<AtualizarLiderancaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lideranca = app_state
        .cadastro_service
        .atualizar_lideranca(campanha_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::ok(lideranca)))
}

#[utoipa::path(
    delete,
    path = "/api/mobile/liderancas/{id}",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Liderança desativada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn desativar_lideranca(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.cadastro_service.desativar_lideranca(campanha_id, id).await?;
    Ok(Json(ApiResponse::ok(json!({ "id": id }))))
}

// ---
// Coordenadores e municípios
// ---

#[utoipa::path(
    get,
    path = "/api/mobile/coordenadores",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Coordenadores regionais")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_coordenadores(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
) -> Result<impl IntoResponse, AppError> {
    let coordenadores = app_state.cadastro_service.listar_coordenadores(campanha_id).await?;
    Ok(Json(ApiResponse::ok(coordenadores)))
}

#[utoipa::path(
    get,
    path = "/api/mobile/municipios",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Municípios")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_municipios(
    State(app_state): State<AppState>,
    Query(query): Query<MunicipioQuery>,
) -> Result<impl IntoResponse, AppError> {
    let municipios = app_state.cadastro_service.listar_municipios(&query).await?;
    Ok(Json(ApiResponse::ok(municipios)))
}

// ---
// Colaboradores
// ---

#[utoipa::path(
    get,
    path = "/api/supabase/colaboradores",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Colaboradores paginados")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_colaboradores(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Query(filtro): Query<ColaboradorFiltro>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let pagina = app_state
        .cadastro_service
        .listar_colaboradores(campanha_id, &filtro, &pagination)
        .await?;
    Ok(Json(pagina))
}

// Autocomplete (responsável de tarefa)
#[utoipa::path(
    get,
    path = "/api/supabase/colaboradores/search",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Até 10 colaboradores")
    ),
    params(
        ("q" = String, Query, description = "Termo de busca")
    ),
    security(("api_jwt" = []))
)]
pub async fn buscar_colaboradores(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Query(busca): Query<BuscaQuery>,
) -> Result<impl IntoResponse, AppError> {
    let colaboradores = app_state
        .cadastro_service
        .buscar_colaboradores(campanha_id, busca.q.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(colaboradores)))
}

#[utoipa::path(
    post,
    path = "/api/supabase/colaboradores",
    tag = "Cadastro",
    request_body = NovoColaboradorPayload,
    responses(
        (status = 201, description = "Colaborador criado")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_colaborador(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<NovoColaboradorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let colaborador = app_state.cadastro_service.criar_colaborador(campanha_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(colaborador))))
}

// ---
// Áreas
// ---

#[utoipa::path(
    get,
    path = "/api/supabase/areas",
    tag = "Cadastro",
    responses(
        (status = 200, description = "Áreas com contagem de lideranças")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_areas(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    Query(filtro): Query<AreaFiltro>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let pagina = app_state
        .cadastro_service
        .listar_areas(campanha_id, &filtro, &pagination)
        .await?;
    Ok(Json(pagina))
}

#[utoipa::path(
    post,
    path = "/api/supabase/areas",
    tag = "Cadastro",
    request_body = NovaAreaPayload,
    responses(
        (status = 201, description = "Área criada")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_area(
    State(app_state): State<AppState>,
    CampanhaContext(campanha_id): CampanhaContext,
    JsonBody(payload): JsonBody<NovaAreaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let area = app_state.cadastro_service.criar_area(campanha_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(area))))
}

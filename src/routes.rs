// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{
        auth::{auth_guard, tenant_guard},
        webhook_auth::webhook_basic_auth,
    },
};

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "data": { "status": "ok" }, "error": null }))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn app(app_state: AppState) -> Router {
    // Rotas públicas (onboarding, checkout, links de eleitor)
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/mobile/auth/login", post(handlers::auth::login))
        .route(
            "/mobile/auth/confirmar-convite",
            get(handlers::auth::validar_convite).post(handlers::auth::confirmar_convite),
        )
        .route(
            "/public/convite-eleitor",
            get(handlers::convites::validar_convite_eleitor).post(handlers::convites::aceitar_convite_eleitor),
        )
        .route("/pagarme/checkout", post(handlers::pagamentos::checkout))
        .route("/pagarme/orders", get(handlers::pagamentos::consultar_gateway))
        .route("/pedidos/{codigo}", get(handlers::pagamentos::consultar_pedido));

    // Só exigem login (o admin recém-criado ainda não tem campanha)
    let auth_routes = Router::new()
        .route("/mobile/auth/check", get(handlers::auth::check))
        .route("/mobile/profile", get(handlers::auth::profile))
        .route("/mobile/municipios", get(handlers::cadastro::listar_municipios))
        .route("/admin/invite", post(handlers::convites::convidar_admin))
        .route("/onboarding/admin", post(handlers::convites::onboarding_admin))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Tudo aqui é filtrado pela campanha do perfil
    let tenant_routes = Router::new()
        .route(
            "/mobile/convites",
            get(handlers::convites::listar).post(handlers::convites::emitir),
        )
        .route("/mobile/convites/eleitor", post(handlers::convites::gerar_convite_eleitor))
        .route("/mobile/convites/{id}", axum::routing::delete(handlers::convites::cancelar))
        .route(
            "/mobile/liderancas",
            get(handlers::cadastro::listar_liderancas).post(handlers::cadastro::criar_lideranca),
        )
        .route(
            "/mobile/liderancas/{id}",
            put(handlers::cadastro::atualizar_lideranca).delete(handlers::cadastro::desativar_lideranca),
        )
        .route("/mobile/coordenadores", get(handlers::cadastro::listar_coordenadores))
        .route(
            "/supabase/eleitores",
            get(handlers::cadastro::listar_eleitores).post(handlers::cadastro::criar_eleitor),
        )
        .route(
            "/supabase/eleitores/{id}",
            put(handlers::cadastro::atualizar_eleitor).delete(handlers::cadastro::desativar_eleitor),
        )
        .route(
            "/supabase/colaboradores",
            get(handlers::cadastro::listar_colaboradores).post(handlers::cadastro::criar_colaborador),
        )
        .route("/supabase/colaboradores/search", get(handlers::cadastro::buscar_colaboradores))
        .route(
            "/supabase/areas",
            get(handlers::cadastro::listar_areas).post(handlers::cadastro::criar_area),
        )
        .route(
            "/supabase/projetos",
            get(handlers::projetos::listar_projetos).post(handlers::projetos::criar_projeto),
        )
        .route(
            "/supabase/projetos/{id}",
            get(handlers::projetos::detalhar_projeto)
                .put(handlers::projetos::atualizar_projeto)
                .delete(handlers::projetos::arquivar_projeto),
        )
        .route(
            "/supabase/tarefas",
            get(handlers::projetos::listar_tarefas).post(handlers::projetos::criar_tarefa),
        )
        .route(
            "/supabase/tarefas/{id}",
            get(handlers::projetos::buscar_tarefa)
                .put(handlers::projetos::atualizar_tarefa)
                .delete(handlers::projetos::arquivar_tarefa),
        )
        .route(
            "/supabase/categorias-projeto",
            get(handlers::projetos::listar_categorias).post(handlers::projetos::criar_categoria),
        )
        .route(
            "/supabase/categorias-projeto/{id}",
            put(handlers::projetos::atualizar_categoria).delete(handlers::projetos::desativar_categoria),
        )
        .route(
            "/supabase/projeto-equipes",
            get(handlers::projetos::listar_projeto_equipes).post(handlers::projetos::vincular_equipe),
        )
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), tenant_guard));

    let webhook_routes = Router::new()
        .route("/webhooks/pagarme", post(handlers::pagamentos::webhook_pagarme))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), webhook_basic_auth));

    let api = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(tenant_routes)
        .merge(webhook_routes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api-docs/openapi.json", get(openapi))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::check,
        handlers::auth::profile,

        // --- Convites ---
        handlers::auth::validar_convite,
        handlers::auth::confirmar_convite,
        handlers::convites::listar,
        handlers::convites::emitir,
        handlers::convites::cancelar,
        handlers::convites::gerar_convite_eleitor,
        handlers::convites::validar_convite_eleitor,
        handlers::convites::aceitar_convite_eleitor,

        // --- Admin ---
        handlers::convites::convidar_admin,
        handlers::convites::onboarding_admin,

        // --- Pagamentos ---
        handlers::pagamentos::checkout,
        handlers::pagamentos::consultar_gateway,
        handlers::pagamentos::consultar_pedido,
        handlers::pagamentos::webhook_pagarme,

        // --- Cadastro ---
        handlers::cadastro::listar_eleitores,
        handlers::cadastro::criar_eleitor,
        handlers::cadastro::atualizar_eleitor,
        handlers::cadastro::desativar_eleitor,
        handlers::cadastro::listar_liderancas,
        handlers::cadastro::criar_lideranca,
        handlers::cadastro::atualizar_lideranca,
        handlers::cadastro::desativar_lideranca,
        handlers::cadastro::listar_coordenadores,
        handlers::cadastro::listar_municipios,
        handlers::cadastro::listar_colaboradores,
        handlers::cadastro::buscar_colaboradores,
        handlers::cadastro::criar_colaborador,
        handlers::cadastro::listar_areas,
        handlers::cadastro::criar_area,

        // --- Projetos ---
        handlers::projetos::listar_categorias,
        handlers::projetos::criar_categoria,
        handlers::projetos::atualizar_categoria,
        handlers::projetos::desativar_categoria,
        handlers::projetos::listar_projetos,
        handlers::projetos::detalhar_projeto,
        handlers::projetos::criar_projeto,
        handlers::projetos::atualizar_projeto,
        handlers::projetos::arquivar_projeto,
        handlers::projetos::listar_tarefas,
        handlers::projetos::buscar_tarefa,
        handlers::projetos::criar_tarefa,
        handlers::projetos::atualizar_tarefa,
        handlers::projetos::arquivar_tarefa,
        handlers::projetos::listar_projeto_equipes,
        handlers::projetos::vincular_equipe,
    ),
    components(
        schemas(
            // --- Auth ---
            models::roles::Role,
            models::auth::LoginPayload,
            models::auth::LoginResponse,

            // --- Convites ---
            models::convite::ConviteStatus,
            models::convite::Convite,
            models::convite::EmitirConvitePayload,
            models::convite::ConfirmarConvitePayload,
            models::convite::ConviteAdminPayload,
            models::convite::AceitarConviteEleitorPayload,

            // --- Pagamentos ---
            models::pedido::PedidoStatus,
            models::pedido::MeioPagamento,
            models::pedido::CustomerPayload,
            models::pedido::ItemPayload,
            models::pedido::CardPayload,
            models::pedido::CheckoutPayload,
            models::pedido::CheckoutResponse,
            models::pedido::StatusPedido,

            // --- Campanha e cadastro ---
            models::campanha::Campanha,
            models::campanha::OnboardingAdminPayload,
            models::campanha::Municipio,
            models::campanha::Area,
            models::campanha::NovaAreaPayload,
            models::campanha::Eleitor,
            models::campanha::NovoEleitorPayload,
            models::campanha::AtualizarEleitorPayload,
            models::campanha::Lideranca,
            models::campanha::NovaLiderancaPayload,
            models::campanha::AtualizarLiderancaPayload,
            models::campanha::Colaborador,
            models::campanha::NovoColaboradorPayload,
            models::campanha::CoordenadorRegional,

            // --- Projetos ---
            models::campanha::CategoriaProjeto,
            models::campanha::CategoriaPayload,
            models::campanha::Projeto,
            models::campanha::ProjetoPayload,
            models::campanha::TarefaStatus,
            models::campanha::Tarefa,
            models::campanha::NovaTarefaPayload,
            models::campanha::AtualizarTarefaPayload,
            models::campanha::ProjetoEquipe,
            models::campanha::VincularEquipePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão do app"),
        (name = "Convites", description = "Convites da equipe e links de eleitor"),
        (name = "Admin", description = "Convite e onboarding de administradores"),
        (name = "Pagamentos", description = "Checkout Pagar.me e webhook"),
        (name = "Cadastro", description = "Eleitores, lideranças, colaboradores e áreas"),
        (name = "Projetos", description = "Projetos, tarefas, categorias e equipes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
        components.add_security_scheme("pagarme_basic", SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_public_and_tenant_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/mobile/auth/login",
            "/api/mobile/auth/confirmar-convite",
            "/api/pagarme/checkout",
            "/api/webhooks/pagarme",
            "/api/supabase/tarefas/{id}",
            "/api/supabase/projeto-equipes",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{}", path);
        }

        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("api_jwt"));
        assert!(schemes.contains_key("pagarme_basic"));
    }
}

// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Sistema ---
        handlers::health::health,

        // --- Relatórios ---
        handlers::relatorios::api_lucratividade,
        handlers::relatorios::api_custos,
        handlers::relatorios::api_folha,

        // --- IA ---
        handlers::ia::api_analise,
    ),
    components(
        schemas(
            handlers::health::HealthStatus,

            // --- Relatórios ---
            models::relatorio::LucratividadeProjeto,
            models::relatorio::CustoCategoria,
            models::relatorio::FolhaFuncionario,
            models::relatorio::FolhaPagamento,
            models::relatorio::Formato,

            // --- IA ---
            models::ia::MediaTaxas,
            models::ia::ResumoFinanceiro,
            models::ia::AnaliseIa,
            models::ia::PerguntaIa,
        )
    ),
    tags(
        (name = "Sistema", description = "Saúde da aplicação e do banco"),
        (name = "Relatórios", description = "Lucratividade, custos e folha de pagamento"),
        (name = "IA", description = "Análise financeira assistida por IA")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        // As rotas /api usam o mesmo cookie de sessão das páginas
        components.add_security_scheme(
            "sessao",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("sessao"))),
        );
    }
}

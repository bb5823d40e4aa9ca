//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod views;

use crate::config::{AppState, Settings};
use crate::middleware::auth::auth_guard;

/// Monta todas as rotas. Tudo fora de login, logout, health e docs passa pelo `auth_guard`.
pub fn build_router(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/login", get(handlers::auth::login_form).post(handlers::auth::login))
        .route("/logout", get(handlers::auth::logout).post(handlers::auth::logout))
        .route("/health", get(handlers::health::health))
        .route("/api/health", get(handlers::health::health));

    let protected_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::dashboard))
        // Clientes
        .route("/clientes"
               ,get(handlers::clientes::lista)
               .post(handlers::clientes::criar)
        )
        .route("/clientes/novo", get(handlers::clientes::novo))
        .route("/clientes/{id}"
               ,get(handlers::clientes::detalhe)
               .post(handlers::clientes::atualizar)
        )
        .route("/clientes/{id}/editar", get(handlers::clientes::editar))
        .route("/clientes/{id}/excluir", post(handlers::clientes::excluir))
        // Projetos e gastos
        .route("/projetos"
               ,get(handlers::projetos::lista)
               .post(handlers::projetos::criar)
        )
        .route("/projetos/novo", get(handlers::projetos::novo))
        .route("/projetos/{id}"
               ,get(handlers::projetos::detalhe)
               .post(handlers::projetos::atualizar)
        )
        .route("/projetos/{id}/editar", get(handlers::projetos::editar))
        .route("/projetos/{id}/excluir", post(handlers::projetos::excluir))
        .route("/projetos/{id}/gastos", post(handlers::projetos::criar_gasto))
        .route("/projetos/{id}/gastos/{gasto_id}/excluir", post(handlers::projetos::excluir_gasto))
        // Funcionários, trabalhos e adiantamentos
        .route("/funcionarios"
               ,get(handlers::funcionarios::lista)
               .post(handlers::funcionarios::criar)
        )
        .route("/funcionarios/novo", get(handlers::funcionarios::novo))
        .route("/funcionarios/{id}"
               ,get(handlers::funcionarios::detalhe)
               .post(handlers::funcionarios::atualizar)
        )
        .route("/funcionarios/{id}/editar", get(handlers::funcionarios::editar))
        .route("/funcionarios/{id}/excluir", post(handlers::funcionarios::excluir))
        .route("/funcionarios/{id}/trabalhos", post(handlers::funcionarios::criar_trabalho))
        .route("/funcionarios/{id}/adiantamentos", post(handlers::funcionarios::criar_adiantamento))
        .route("/trabalhos/{id}/excluir", post(handlers::funcionarios::excluir_trabalho))
        .route("/adiantamentos/{id}/excluir", post(handlers::funcionarios::excluir_adiantamento))
        // Orçamentos
        .route("/orcamentos"
               ,get(handlers::orcamentos::lista)
               .post(handlers::orcamentos::criar)
        )
        .route("/orcamentos/novo", get(handlers::orcamentos::novo))
        .route("/orcamentos/{id}"
               ,get(handlers::orcamentos::detalhe)
               .post(handlers::orcamentos::atualizar)
        )
        .route("/orcamentos/{id}/editar", get(handlers::orcamentos::editar))
        .route("/orcamentos/{id}/excluir", post(handlers::orcamentos::excluir))
        .route("/orcamentos/{id}/itens", post(handlers::orcamentos::adicionar_item))
        .route("/orcamentos/{id}/itens/{item_id}/excluir", post(handlers::orcamentos::excluir_item))
        .route("/orcamentos/{id}/pdf", get(handlers::orcamentos::baixar_pdf))
        // Relatórios
        .route("/relatorios", get(handlers::relatorios::index))
        .route("/relatorios/lucratividade", get(handlers::relatorios::lucratividade))
        .route("/relatorios/custos", get(handlers::relatorios::custos))
        .route("/relatorios/folha", get(handlers::relatorios::folha))
        // IA
        .route("/ia"
               ,get(handlers::ia::pagina_ia)
               .post(handlers::ia::analisar)
        )
        // Usuários (admin)
        .route("/usuarios"
               ,get(handlers::usuarios::lista)
               .post(handlers::usuarios::criar)
        )
        .route("/usuarios/novo", get(handlers::usuarios::novo))
        .route("/usuarios/{id}/excluir", post(handlers::usuarios::excluir))
        // API JSON
        .route("/api/relatorios/lucratividade", get(handlers::relatorios::api_lucratividade))
        .route("/api/relatorios/custos", get(handlers::relatorios::api_custos))
        .route("/api/relatorios/folha", get(handlers::relatorios::api_folha))
        .route("/api/ia/analise", post(handlers::ia::api_analise))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env é opcional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env().context("Configuração inválida")?;
    let port = settings.port;
    let admin = settings.admin_email.clone().zip(settings.admin_password.clone());

    let app_state = AppState::new(settings)
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    app_state
        .db
        .migrate()
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;
    tracing::info!(
        "✅ Migrações do banco de dados ({}) executadas com sucesso!",
        app_state.db.backend().as_str()
    );

    if let Some((email, senha)) = admin {
        if let Err(e) = app_state.auth_service.bootstrap_admin(&email, &senha).await {
            tracing::error!("Falha ao criar o administrador inicial: {}", e);
        }
    }

    let app = build_router(app_state);

    // Inicia o servidor
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::Database, models::auth::PAPEL_USUARIO};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    async fn app() -> (Router, AppState) {
        let db = Database::in_memory().await;
        let state = AppState::build(db, Settings::for_tests(), None).unwrap();
        (build_router(state.clone()), state)
    }

    /// Faz login e devolve o cabeçalho `Cookie` para as próximas requisições.
    async fn login(router: &Router, state: &AppState, papel: &str) -> String {
        state
            .auth_service
            .register_user("Ana", "ana@obra.com", "senha123", papel)
            .await
            .unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::post("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("email=ana%40obra.com&senha=senha123"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");

        cookies(&response)
    }

    fn cookies(response: &Response) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn pedido(uri: &str, cookie: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn post_form(uri: &str, cookie: &str, body: &'static str) -> Request<Body> {
        Request::post(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let (router, _) = app().await;
        let response = router.oneshot(pedido("/health", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["banco"], "sqlite");
    }

    #[tokio::test]
    async fn unauthenticated_requests_go_to_login() {
        let (router, _) = app().await;
        for uri in ["/dashboard", "/clientes", "/relatorios/folha", "/api/relatorios/custos"] {
            let response = router.clone().oneshot(pedido(uri, "")).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(response.headers()[header::LOCATION], "/login");
        }
    }

    #[tokio::test]
    async fn login_sets_session_and_opens_dashboard() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;
        assert!(cookie.contains("sessao="));
        assert!(cookie.contains("token="));

        let response = router.clone().oneshot(pedido("/dashboard", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Visão geral"));
    }

    #[tokio::test]
    async fn jwt_cookie_alone_is_accepted() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;
        let token_only = cookie
            .split("; ")
            .find(|c| c.starts_with("token="))
            .unwrap()
            .to_string();

        let response = router.oneshot(pedido("/dashboard", &token_only)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_shows_login_again() {
        let (router, state) = app().await;
        state
            .auth_service
            .register_user("Ana", "ana@obra.com", "senha123", PAPEL_USUARIO)
            .await
            .unwrap();

        let response = router
            .oneshot(post_form("/login", "", "email=ana%40obra.com&senha=errada"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("E-mail ou senha inválidos."));
    }

    #[tokio::test]
    async fn user_admin_area_is_forbidden_for_regular_users() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;
        let response = router.oneshot(pedido("/usuarios", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn client_crud_redirects_and_missing_rows_are_404() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;

        let response = router
            .clone()
            .oneshot(post_form("/clientes", &cookie, "nome=Dona+L%C3%BAcia&email=&telefone=11999990000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with("/clientes/"));

        let response = router.clone().oneshot(pedido(&location, &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Dona Lúcia"));

        let response = router.clone().oneshot(pedido("/clientes/999", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // nome em branco é rejeitado pela validação
        let response = router
            .oneshot(post_form("/clientes", &cookie, "nome="))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reports_export_csv_and_reject_bad_periods() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;

        let response = router
            .clone()
            .oneshot(pedido("/relatorios/lucratividade?formato=csv", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
        assert!(body_text(response).await.starts_with("projeto;cliente;status"));

        let response = router
            .oneshot(pedido("/api/relatorios/folha?inicio=2024-04-01&fim=2024-03-01", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["error"].as_str().unwrap().contains("data inicial"));
    }

    #[tokio::test]
    async fn ia_page_works_without_api_key() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;

        let response = router
            .clone()
            .oneshot(post_form("/ia", &cookie, "pergunta=Como+estou%3F"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Assistente de IA não configurado"));

        let response = router
            .oneshot(
                Request::post("/api/ia/analise")
                    .header(header::COOKIE, &cookie)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn project_values_accept_brazilian_format_and_reject_nan() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;

        let response = router
            .clone()
            .oneshot(post_form("/projetos", &cookie, "nome=Casa&status=pendente&valor_total=NaN"))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        assert!(state.projetos.list(None).await.unwrap().is_empty());

        let response = router
            .oneshot(post_form(
                "/projetos",
                &cookie,
                "nome=Casa&status=pendente&valor_total=12.500%2C75",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let projetos = state.projetos.list(None).await.unwrap();
        assert_eq!(projetos[0].valor_total, 12500.75);
    }

    #[tokio::test]
    async fn employee_pages_render_inactive_status() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;

        let response = router
            .clone()
            .oneshot(post_form(
                "/funcionarios",
                &cookie,
                "nome=Z%C3%A9&valor_diaria=200&valor_hora_extra=25",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();

        let response = router.clone().oneshot(pedido("/funcionarios", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Inativo"));

        let response = router.oneshot(pedido(&location, &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("(inativo)"));
    }

    #[tokio::test]
    async fn database_outage_is_not_reported_as_logged_out() {
        let (router, state) = app().await;
        let cookie = login(&router, &state, PAPEL_USUARIO).await;

        state.db.close().await;

        let response = router.oneshot(pedido("/dashboard", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::LOCATION).is_none());
    }
}

// src/handlers/dashboard.rs

use axum::{extract::State, response::Html};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::pagina,
    middleware::auth::AuthenticatedUser,
    views,
};

// GET /dashboard
pub async fn dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Html<String>, AppError> {
    let resumo = app_state.relatorio_service.resumo().await?;
    views::render(
        "dashboard",
        &pagina(&user, "dashboard", "Visão geral", json!({ "resumo": resumo })),
    )
}

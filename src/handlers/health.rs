// src/handlers/health.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: &'static str,
    /// Backend em uso: "postgres" ou "sqlite"
    #[schema(example = "sqlite")]
    pub banco: &'static str,
}

// GET /health e /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Sistema",
    responses(
        (status = 200, description = "Aplicação e banco respondendo", body = HealthStatus),
        (status = 503, description = "Banco indisponível", body = HealthStatus)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let banco = app_state.db.backend().as_str();
    if app_state.db.ping().await {
        (StatusCode::OK, Json(HealthStatus { status: "ok", banco }))
    } else {
        tracing::error!("Health check: banco {} não respondeu", banco);
        (StatusCode::SERVICE_UNAVAILABLE, Json(HealthStatus { status: "erro", banco }))
    }
}

// src/handlers/ia.rs

use axum::{extract::State, response::Html, Form, Json};
use serde_json::json;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::pagina,
    middleware::auth::AuthenticatedUser,
    models::ia::{AnaliseIa, PerguntaIa},
    views,
};

// GET /ia
pub async fn pagina_ia(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Html<String>, AppError> {
    let resumo = app_state.ia_service.resumo().await?;
    views::render(
        "ia",
        &pagina(
            &user,
            "ia",
            "Assistente de IA",
            json!({ "resumo": resumo, "configurado": app_state.ia_service.configurado() }),
        ),
    )
}

// POST /ia
pub async fn analisar(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Form(form): Form<PerguntaIa>,
) -> Result<Html<String>, AppError> {
    let resumo = app_state.ia_service.resumo().await?;

    // Falha da IA não derruba a página: o resumo numérico continua visível
    let (resposta, erro) = match app_state
        .ia_service
        .responder(&resumo, form.pergunta.as_deref())
        .await
    {
        Ok(texto) => (Some(texto), None),
        Err(e @ (AppError::LlmNotConfigured | AppError::LlmError(_))) => {
            tracing::warn!("Análise de IA indisponível: {}", e);
            (None, Some(e.to_string()))
        }
        Err(e) => return Err(e),
    };

    views::render(
        "ia",
        &pagina(
            &user,
            "ia",
            "Assistente de IA",
            json!({
                "resumo": resumo,
                "configurado": app_state.ia_service.configurado(),
                "pergunta": form.pergunta,
                "resposta": resposta,
                "erro": erro,
            }),
        ),
    )
}

// POST /api/ia/analise
#[utoipa::path(
    post,
    path = "/api/ia/analise",
    tag = "IA",
    request_body = PerguntaIa,
    responses(
        (status = 200, description = "Resposta da IA e números usados no prompt", body = AnaliseIa),
        (status = 502, description = "Falha na API de IA"),
        (status = 503, description = "IA não configurada")
    ),
    security(("sessao" = []))
)]
pub async fn api_analise(
    State(app_state): State<AppState>,
    Json(payload): Json<PerguntaIa>,
) -> Result<Json<AnaliseIa>, ApiError> {
    Ok(Json(app_state.ia_service.analisar(payload.pergunta.as_deref()).await?))
}

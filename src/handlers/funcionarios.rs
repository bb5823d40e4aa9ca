// src/handlers/funcionarios.rs

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::pagina,
    middleware::auth::AuthenticatedUser,
    models::{
        funcionario::{AdiantamentoPayload, Funcionario, FuncionarioPayload, TrabalhoPayload},
        relatorio::Periodo,
    },
    views,
};

async fn buscar(app_state: &AppState, id: i64) -> Result<Funcionario, AppError> {
    app_state
        .funcionarios
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Funcionário".into()))
}

// GET /funcionarios
pub async fn lista(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Html<String>, AppError> {
    let funcionarios = app_state.funcionarios.list().await?;
    views::render(
        "funcionarios/lista",
        &pagina(&user, "funcionarios", "Funcionários", json!({ "funcionarios": funcionarios })),
    )
}

// GET /funcionarios/novo
pub async fn novo(AuthenticatedUser(user): AuthenticatedUser) -> Result<Html<String>, AppError> {
    views::render(
        "funcionarios/form",
        &pagina(
            &user,
            "funcionarios",
            "Novo funcionário",
            json!({ "acao": "/funcionarios", "ativo": true }),
        ),
    )
}

// POST /funcionarios
pub async fn criar(
    State(app_state): State<AppState>,
    Form(payload): Form<FuncionarioPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    let funcionario = app_state.funcionarios.create(&payload).await?;
    tracing::info!("Funcionário #{} criado", funcionario.id);
    Ok(Redirect::to(&format!("/funcionarios/{}", funcionario.id)))
}

// GET /funcionarios/{id}
pub async fn detalhe(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let funcionario = buscar(&app_state, id).await?;
    let trabalhos = app_state.funcionarios.list_trabalhos(id).await?;
    let adiantamentos = app_state.funcionarios.list_adiantamentos(id).await?;
    let projetos = app_state.projetos.list(None).await?;

    let total_trabalhos: f64 = trabalhos.iter().map(|t| t.valor).sum();
    let total_adiantamentos: f64 = adiantamentos.iter().map(|a| a.valor).sum();

    let titulo = funcionario.nome.clone();
    views::render(
        "funcionarios/detalhe",
        &pagina(
            &user,
            "funcionarios",
            &titulo,
            json!({
                "funcionario": funcionario,
                "trabalhos": trabalhos,
                "adiantamentos": adiantamentos,
                "projetos": projetos,
                "total_trabalhos": total_trabalhos,
                "total_adiantamentos": total_adiantamentos,
                "saldo": total_trabalhos - total_adiantamentos,
                "hoje": Periodo::hoje().format("%Y-%m-%d").to_string(),
            }),
        ),
    )
}

// GET /funcionarios/{id}/editar
pub async fn editar(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let funcionario = buscar(&app_state, id).await?;
    let ativo = funcionario.ativo;
    views::render(
        "funcionarios/form",
        &pagina(
            &user,
            "funcionarios",
            "Editar funcionário",
            json!({
                "funcionario": funcionario,
                "ativo": ativo,
                "acao": format!("/funcionarios/{}", id),
            }),
        ),
    )
}

// POST /funcionarios/{id}
pub async fn atualizar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Form(payload): Form<FuncionarioPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    app_state
        .funcionarios
        .update(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Funcionário".into()))?;
    Ok(Redirect::to(&format!("/funcionarios/{}", id)))
}

// POST /funcionarios/{id}/excluir
pub async fn excluir(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if app_state.funcionarios.delete(id).await? == 0 {
        return Err(AppError::NotFound("Funcionário".into()));
    }
    tracing::info!("Funcionário #{} excluído", id);
    Ok(Redirect::to("/funcionarios"))
}

// =============================================================================
//  TRABALHOS E ADIANTAMENTOS
// =============================================================================

// POST /funcionarios/{id}/trabalhos
pub async fn criar_trabalho(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Form(payload): Form<TrabalhoPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    payload.validate_consistency()?;
    buscar(&app_state, id).await?;
    app_state.funcionarios.create_trabalho(id, &payload).await?;
    Ok(Redirect::to(&format!("/funcionarios/{}", id)))
}

// POST /trabalhos/{id}/excluir
pub async fn excluir_trabalho(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let funcionario_id = app_state
        .funcionarios
        .delete_trabalho(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Trabalho".into()))?;
    Ok(Redirect::to(&format!("/funcionarios/{}", funcionario_id)))
}

// POST /funcionarios/{id}/adiantamentos
pub async fn criar_adiantamento(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Form(payload): Form<AdiantamentoPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    buscar(&app_state, id).await?;
    app_state.funcionarios.create_adiantamento(id, &payload).await?;
    Ok(Redirect::to(&format!("/funcionarios/{}", id)))
}

// POST /adiantamentos/{id}/excluir
pub async fn excluir_adiantamento(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let funcionario_id = app_state
        .funcionarios
        .delete_adiantamento(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Adiantamento".into()))?;
    Ok(Redirect::to(&format!("/funcionarios/{}", funcionario_id)))
}

// src/handlers/orcamentos.rs

use axum::{
    extract::{Path, State},
    response::{Html, Redirect, Response},
    Form,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{opcoes, pagina, pdf},
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Usuario,
        orcamento::{Orcamento, OrcamentoItemPayload, OrcamentoPayload, OrcamentoStatus},
    },
    views,
};

fn statuses() -> Vec<Value> {
    opcoes(
        [
            OrcamentoStatus::Rascunho,
            OrcamentoStatus::Enviado,
            OrcamentoStatus::Aprovado,
            OrcamentoStatus::Rejeitado,
        ]
        .iter()
        .map(|s| s.as_str()),
    )
}

async fn buscar(app_state: &AppState, id: i64) -> Result<Orcamento, AppError> {
    app_state
        .orcamentos
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Orçamento".into()))
}

async fn formulario(
    app_state: &AppState,
    user: &Usuario,
    orcamento: Option<Orcamento>,
) -> Result<Html<String>, AppError> {
    let clientes = app_state.clientes.list().await?;
    let projetos = app_state.projetos.list(None).await?;
    let (titulo, acao, status_atual) = match &orcamento {
        Some(o) => ("Editar orçamento", format!("/orcamentos/{}", o.id), o.status.clone()),
        None => (
            "Novo orçamento",
            "/orcamentos".to_string(),
            OrcamentoStatus::Rascunho.as_str().to_string(),
        ),
    };
    views::render(
        "orcamentos/form",
        &pagina(
            user,
            "orcamentos",
            titulo,
            json!({
                "orcamento": orcamento,
                "clientes": clientes,
                "projetos": projetos,
                "statuses": statuses(),
                "status_atual": status_atual,
                "acao": acao,
            }),
        ),
    )
}

// GET /orcamentos
pub async fn lista(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Html<String>, AppError> {
    let orcamentos = app_state.orcamentos.list().await?;
    views::render(
        "orcamentos/lista",
        &pagina(&user, "orcamentos", "Orçamentos", json!({ "orcamentos": orcamentos })),
    )
}

// GET /orcamentos/novo
pub async fn novo(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Html<String>, AppError> {
    formulario(&app_state, &user, None).await
}

// POST /orcamentos
pub async fn criar(
    State(app_state): State<AppState>,
    Form(payload): Form<OrcamentoPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    let orcamento = app_state.orcamentos.create(&payload).await?;
    tracing::info!("Orçamento #{} criado", orcamento.id);
    Ok(Redirect::to(&format!("/orcamentos/{}", orcamento.id)))
}

// GET /orcamentos/{id}
pub async fn detalhe(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let detalhe = app_state
        .orcamentos
        .find_detalhe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Orçamento".into()))?;

    views::render(
        "orcamentos/detalhe",
        &pagina(
            &user,
            "orcamentos",
            &format!("Orçamento #{}", id),
            json!({ "detalhe": detalhe }),
        ),
    )
}

// GET /orcamentos/{id}/editar
pub async fn editar(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let orcamento = buscar(&app_state, id).await?;
    formulario(&app_state, &user, Some(orcamento)).await
}

// POST /orcamentos/{id}
pub async fn atualizar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Form(payload): Form<OrcamentoPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    app_state
        .orcamentos
        .update(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Orçamento".into()))?;
    Ok(Redirect::to(&format!("/orcamentos/{}", id)))
}

// POST /orcamentos/{id}/excluir
pub async fn excluir(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if app_state.orcamentos.delete(id).await? == 0 {
        return Err(AppError::NotFound("Orçamento".into()));
    }
    tracing::info!("Orçamento #{} excluído", id);
    Ok(Redirect::to("/orcamentos"))
}

// POST /orcamentos/{id}/itens
pub async fn adicionar_item(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Form(payload): Form<OrcamentoItemPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    buscar(&app_state, id).await?;
    app_state.orcamentos.add_item(id, &payload).await?;
    Ok(Redirect::to(&format!("/orcamentos/{}", id)))
}

// POST /orcamentos/{id}/itens/{item_id}/excluir
pub async fn excluir_item(
    State(app_state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
) -> Result<Redirect, AppError> {
    if app_state.orcamentos.delete_item(id, item_id).await? == 0 {
        return Err(AppError::NotFound("Item".into()));
    }
    Ok(Redirect::to(&format!("/orcamentos/{}", id)))
}

// GET /orcamentos/{id}/pdf
pub async fn baixar_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let bytes = app_state.document_service.pdf_orcamento(id).await?;
    Ok(pdf(&format!("orcamento_{}.pdf", id), bytes))
}

// src/handlers/clientes.rs

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    common::{error::AppError, form::blank_as_none},
    config::AppState,
    handlers::pagina,
    middleware::auth::AuthenticatedUser,
    models::cliente::{Cliente, ClientePayload},
    views,
};

#[derive(Debug, Deserialize)]
pub struct BuscaQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub busca: Option<String>,
}

async fn buscar(app_state: &AppState, id: i64) -> Result<Cliente, AppError> {
    app_state
        .clientes
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cliente".into()))
}

// GET /clientes
pub async fn lista(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<BuscaQuery>,
) -> Result<Html<String>, AppError> {
    let clientes = match &query.busca {
        Some(termo) => app_state.clientes.search(termo).await?,
        None => app_state.clientes.list().await?,
    };
    views::render(
        "clientes/lista",
        &pagina(&user, "clientes", "Clientes", json!({ "clientes": clientes, "busca": query.busca })),
    )
}

// GET /clientes/novo
pub async fn novo(AuthenticatedUser(user): AuthenticatedUser) -> Result<Html<String>, AppError> {
    views::render(
        "clientes/form",
        &pagina(&user, "clientes", "Novo cliente", json!({ "acao": "/clientes" })),
    )
}

// POST /clientes
pub async fn criar(
    State(app_state): State<AppState>,
    Form(payload): Form<ClientePayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    let cliente = app_state.clientes.create(&payload).await?;
    tracing::info!("Cliente #{} criado", cliente.id);
    Ok(Redirect::to(&format!("/clientes/{}", cliente.id)))
}

// GET /clientes/{id}
pub async fn detalhe(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let cliente = buscar(&app_state, id).await?;
    let projetos = app_state.projetos.list_by_cliente(id).await?;
    let orcamentos = app_state.orcamentos.list_by_cliente(id).await?;

    let titulo = cliente.nome.clone();
    views::render(
        "clientes/detalhe",
        &pagina(
            &user,
            "clientes",
            &titulo,
            json!({ "cliente": cliente, "projetos": projetos, "orcamentos": orcamentos }),
        ),
    )
}

// GET /clientes/{id}/editar
pub async fn editar(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let cliente = buscar(&app_state, id).await?;
    views::render(
        "clientes/form",
        &pagina(
            &user,
            "clientes",
            "Editar cliente",
            json!({ "cliente": cliente, "acao": format!("/clientes/{}", id) }),
        ),
    )
}

// POST /clientes/{id}
pub async fn atualizar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Form(payload): Form<ClientePayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    app_state
        .clientes
        .update(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Cliente".into()))?;
    Ok(Redirect::to(&format!("/clientes/{}", id)))
}

// POST /clientes/{id}/excluir
pub async fn excluir(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if app_state.clientes.delete(id).await? == 0 {
        return Err(AppError::NotFound("Cliente".into()));
    }
    tracing::info!("Cliente #{} excluído", id);
    Ok(Redirect::to("/clientes"))
}

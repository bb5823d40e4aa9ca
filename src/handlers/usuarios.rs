// src/handlers/usuarios.rs

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
    middleware::auth::AdminUser,
    models::auth::NovoUsuarioPayload,
    views,
};

// GET /usuarios
pub async fn lista(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Html<String>, AppError> {
    let usuarios = app_state.usuarios.list().await?;
    views::render(
        "usuarios/lista",
        &pagina(&admin, "usuarios", "Usuários", json!({ "usuarios": usuarios })),
    )
}

// GET /usuarios/novo
pub async fn novo(AdminUser(admin): AdminUser) -> Result<Html<String>, AppError> {
    views::render("usuarios/form", &pagina(&admin, "usuarios", "Novo usuário", json!({})))
}

// POST /usuarios
pub async fn criar(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(payload): Form<NovoUsuarioPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    let novo = app_state
        .auth_service
        .register_user(&payload.nome, &payload.email, &payload.senha, payload.papel.as_str())
        .await?;
    tracing::info!("👤 {} criou o usuário {} ({})", admin.email, novo.email, novo.papel);
    Ok(Redirect::to("/usuarios"))
}

// POST /usuarios/{id}/excluir
pub async fn excluir(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if id == admin.id {
        return Err(AppError::InvalidInput("não é possível excluir o próprio usuário".into()));
    }
    if app_state.usuarios.delete(id).await? == 0 {
        return Err(AppError::NotFound("Usuário".into()));
    }
    tracing::info!("👤 {} excluiu o usuário #{}", admin.email, id);
    Ok(Redirect::to("/usuarios"))
}

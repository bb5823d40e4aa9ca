// src/handlers/auth.rs

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::{cookie::Cookie, CookieJar, SignedCookieJar};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{session_cookie, token_cookie, SESSION_COOKIE, TOKEN_COOKIE},
    models::auth::LoginPayload,
    views,
};

fn login_page(erro: Option<&str>, email: &str) -> Result<Html<String>, AppError> {
    views::render("login", &json!({ "titulo": "Entrar", "erro": erro, "email": email }))
}

// GET /login
pub async fn login_form() -> Result<Html<String>, AppError> {
    login_page(None, "")
}

// POST /login
pub async fn login(
    State(app_state): State<AppState>,
    session: SignedCookieJar,
    cookies: CookieJar,
    Form(payload): Form<LoginPayload>,
) -> Result<Response, AppError> {
    if payload.validate().is_err() {
        return Ok(login_page(Some("Informe e-mail e senha."), &payload.email)?.into_response());
    }

    match app_state.auth_service.login_user(&payload.email, &payload.senha).await {
        Ok((user, token)) => {
            tracing::info!("🔑 Login de {}", user.email);
            let session = session.add(session_cookie(user.id));
            let cookies = cookies.add(token_cookie(token));
            Ok((session, cookies, Redirect::to("/dashboard")).into_response())
        }
        Err(AppError::InvalidCredentials) => {
            tracing::info!("Tentativa de login inválida para {}", payload.email);
            Ok(login_page(Some("E-mail ou senha inválidos."), &payload.email)?.into_response())
        }
        Err(e) => Err(e),
    }
}

// GET|POST /logout
pub async fn logout(session: SignedCookieJar, cookies: CookieJar) -> impl IntoResponse {
    let session = session.remove(Cookie::build(SESSION_COOKIE).path("/"));
    let cookies = cookies.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (session, cookies, Redirect::to("/login"))
}

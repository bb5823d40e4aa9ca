// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar, SignedCookieJar,
};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::Usuario,
    services::auth::TOKEN_HORAS,
};

/// Cookie assinado com `"{usuario_id}:{expira_em}"`
pub const SESSION_COOKIE: &str = "sessao";
/// Cookie com o JWT (verificação secundária)
pub const TOKEN_COOKIE: &str = "token";

pub fn session_cookie(usuario_id: i64) -> Cookie<'static> {
    let expira_em = (Utc::now() + chrono::Duration::hours(TOKEN_HORAS)).timestamp();
    Cookie::build((SESSION_COOKIE, format!("{}:{}", usuario_id, expira_em)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn token_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Usuário da sessão, se o cookie for válido e não tiver expirado.
fn session_user_id(jar: &SignedCookieJar) -> Option<i64> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let (id, expira_em) = cookie.value().split_once(':')?;
    let expira_em: i64 = expira_em.parse().ok()?;
    if expira_em < Utc::now().timestamp() {
        return None;
    }
    id.parse().ok()
}

/// Credencial inválida conta como "sem usuário"; falha de banco sobe como erro.
fn absent_if_unauthenticated(
    result: Result<Usuario, AppError>,
) -> Result<Option<Usuario>, AppError> {
    match result {
        Ok(user) => Ok(Some(user)),
        Err(
            AppError::NotAuthenticated
            | AppError::NotFound(_)
            | AppError::InvalidCredentials
            | AppError::JwtError(_),
        ) => Ok(None),
        Err(e) => Err(e),
    }
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    session: SignedCookieJar,
    cookies: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut user = None;

    if let Some(id) = session_user_id(&session) {
        user = absent_if_unauthenticated(app_state.auth_service.find_user(id).await)?;
    }

    if user.is_none() {
        if let Some(token) = cookies.get(TOKEN_COOKIE) {
            user = absent_if_unauthenticated(
                app_state.auth_service.validate_token(token.value()).await,
            )?;
        }
    }

    let user = user.ok_or(AppError::NotAuthenticated)?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub Usuario);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Usuario>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::NotAuthenticated)
    }
}

/// Igual a `AuthenticatedUser`, mas exige papel de administrador.
pub struct AdminUser(pub Usuario);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!("Usuário {} tentou acessar área de administração", user.email);
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_credential_errors_mean_no_user() {
        assert!(matches!(absent_if_unauthenticated(Err(AppError::NotAuthenticated)), Ok(None)));
        assert!(matches!(
            absent_if_unauthenticated(Err(AppError::NotFound("Usuário".into()))),
            Ok(None)
        ));
        assert!(matches!(
            absent_if_unauthenticated(Err(AppError::DatabaseError(sqlx::Error::PoolClosed))),
            Err(AppError::DatabaseError(_))
        ));
    }
}

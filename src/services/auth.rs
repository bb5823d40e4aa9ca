// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UsuarioRepository,
    models::auth::{Claims, Usuario, PAPEL_ADMIN},
};

/// Validade do token JWT (e da sessão)
pub const TOKEN_HORAS: i64 = 8;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UsuarioRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UsuarioRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    async fn hash_password(password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    pub async fn register_user(
        &self,
        nome: &str,
        email: &str,
        password: &str,
        papel: &str,
    ) -> Result<Usuario, AppError> {
        let hashed_password = Self::hash_password(password).await?;
        self.user_repo.create(nome, email, &hashed_password, papel).await
    }

    /// Confere e-mail e senha; devolve o usuário e um JWT novo.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<(Usuario, String), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.senha_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok((user, token))
    }

    pub async fn validate_token(&self, token: &str) -> Result<Usuario, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::NotAuthenticated)?;

        self.find_user(token_data.claims.sub).await
    }

    pub async fn find_user(&self, id: i64) -> Result<Usuario, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotAuthenticated)
    }

    pub fn create_token(&self, user_id: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(TOKEN_HORAS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Cria o primeiro administrador quando a tabela está vazia.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<bool, AppError> {
        if self.user_repo.count().await? > 0 {
            return Ok(false);
        }
        self.register_user("Administrador", email, password, PAPEL_ADMIN).await?;
        tracing::info!("👤 Usuário administrador {} criado", email);
        Ok(true)
    }
}

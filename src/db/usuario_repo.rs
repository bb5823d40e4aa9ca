// src/db/usuario_repo.rs

use crate::{common::error::AppError, db::Database, models::auth::Usuario};

// Todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UsuarioRepository {
    db: Database,
}

impl UsuarioRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        Ok(self
            .db
            .get("SELECT * FROM usuarios WHERE email = $1", &[email.to_lowercase().into()])
            .await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Usuario>, AppError> {
        Ok(self.db.get("SELECT * FROM usuarios WHERE id = $1", &[id.into()]).await?)
    }

    pub async fn list(&self) -> Result<Vec<Usuario>, AppError> {
        Ok(self.db.all("SELECT * FROM usuarios ORDER BY nome ASC", &[]).await?)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (total,): (i64,) = self
            .db
            .get("SELECT COUNT(*) FROM usuarios", &[])
            .await?
            .unwrap_or((0,));
        Ok(total)
    }

    pub async fn create(
        &self,
        nome: &str,
        email: &str,
        senha_hash: &str,
        papel: &str,
    ) -> Result<Usuario, AppError> {
        self.db
            .get(
                "INSERT INTO usuarios (nome, email, senha_hash, papel) VALUES ($1, $2, $3, $4) RETURNING *",
                &[nome.into(), email.to_lowercase().into(), senha_hash.into(), papel.into()],
            )
            .await
            .map_err(|e| {
                // E-mail duplicado vira uma mensagem amigável
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::UniqueConstraintViolation(format!(
                            "o e-mail '{}' já está em uso",
                            email
                        ));
                    }
                }
                e.into()
            })?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))
    }

    pub async fn delete(&self, id: i64) -> Result<u64, AppError> {
        Ok(self.db.run("DELETE FROM usuarios WHERE id = $1", &[id.into()]).await?)
    }
}

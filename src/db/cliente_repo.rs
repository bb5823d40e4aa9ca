// src/db/cliente_repo.rs

use crate::{
    common::error::AppError,
    db::{Database, Param},
    models::cliente::{Cliente, ClientePayload},
};

#[derive(Clone)]
pub struct ClienteRepository {
    db: Database,
}

fn params(payload: &ClientePayload) -> Vec<Param> {
    vec![
        payload.nome.trim().into(),
        payload.email.clone().into(),
        payload.telefone.clone().into(),
        payload.documento.clone().into(),
        payload.endereco.clone().into(),
        payload.observacoes.clone().into(),
    ]
}

impl ClienteRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Cliente>, AppError> {
        Ok(self.db.all("SELECT * FROM clientes ORDER BY nome ASC", &[]).await?)
    }

    /// Busca por nome, documento ou e-mail
    pub async fn search(&self, termo: &str) -> Result<Vec<Cliente>, AppError> {
        let like = format!("%{}%", termo.to_lowercase());
        Ok(self
            .db
            .all(
                r#"
                SELECT * FROM clientes
                WHERE LOWER(nome) LIKE $1
                   OR LOWER(COALESCE(documento, '')) LIKE $1
                   OR LOWER(COALESCE(email, '')) LIKE $1
                ORDER BY nome ASC
                LIMIT 50
                "#,
                &[like.into()],
            )
            .await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Cliente>, AppError> {
        Ok(self.db.get("SELECT * FROM clientes WHERE id = $1", &[id.into()]).await?)
    }

    pub async fn create(&self, payload: &ClientePayload) -> Result<Cliente, AppError> {
        self.db
            .get(
                r#"
                INSERT INTO clientes (nome, email, telefone, documento, endereco, observacoes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
                &params(payload),
            )
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))
    }

    /// Devolve `None` se o cliente não existe.
    pub async fn update(&self, id: i64, payload: &ClientePayload) -> Result<Option<Cliente>, AppError> {
        let mut values = params(payload);
        values.push(id.into());
        Ok(self
            .db
            .get(
                r#"
                UPDATE clientes
                SET nome = $1, email = $2, telefone = $3, documento = $4, endereco = $5, observacoes = $6
                WHERE id = $7
                RETURNING *
                "#,
                &values,
            )
            .await?)
    }

    pub async fn delete(&self, id: i64) -> Result<u64, AppError> {
        Ok(self.db.run("DELETE FROM clientes WHERE id = $1", &[id.into()]).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(nome: &str, documento: Option<&str>) -> ClientePayload {
        ClientePayload {
            nome: nome.into(),
            email: Some(format!("{}@exemplo.com", nome.to_lowercase().replace(' ', "."))),
            telefone: None,
            documento: documento.map(str::to_owned),
            endereco: Some("Rua das Flores, 123".into()),
            observacoes: None,
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let repo = ClienteRepository::new(Database::in_memory().await);

        let created = repo.create(&payload("Maria Silva", Some("123.456.789-00"))).await.unwrap();
        let found = repo.find_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(found.nome, "Maria Silva");
        assert_eq!(found.documento.as_deref(), Some("123.456.789-00"));
        assert_eq!(found.endereco.as_deref(), Some("Rua das Flores, 123"));
        assert!(!found.criado_em.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repo = ClienteRepository::new(Database::in_memory().await);
        let created = repo.create(&payload("João", None)).await.unwrap();

        let updated = repo
            .update(created.id, &payload("João Souza", Some("99")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.nome, "João Souza");
        assert!(repo.update(created.id + 1, &payload("X", None)).await.unwrap().is_none());

        assert_eq!(repo.delete(created.id).await.unwrap(), 1);
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_matches_name_and_document() {
        let repo = ClienteRepository::new(Database::in_memory().await);
        repo.create(&payload("Construtora Alfa", Some("11.222.333/0001-44"))).await.unwrap();
        repo.create(&payload("Beto Reformas", None)).await.unwrap();

        assert_eq!(repo.search("alfa").await.unwrap().len(), 1);
        assert_eq!(repo.search("0001").await.unwrap()[0].nome, "Construtora Alfa");
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}

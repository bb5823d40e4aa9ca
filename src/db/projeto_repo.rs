// src/db/projeto_repo.rs

use crate::{
    common::error::AppError,
    db::{Database, Param},
    models::projeto::{Gasto, GastoPayload, Projeto, ProjetoPayload},
};

const SELECT_PROJETO: &str = r#"
    SELECT
        p.id, p.nome, p.descricao, p.cliente_id, c.nome AS cliente_nome,
        p.endereco, p.status, p.data_inicio, p.data_fim, p.valor_total, p.criado_em
    FROM projetos p
    LEFT JOIN clientes c ON c.id = p.cliente_id
"#;

#[derive(Clone)]
pub struct ProjetoRepository {
    db: Database,
}

fn params(payload: &ProjetoPayload) -> Vec<Param> {
    vec![
        payload.nome.trim().into(),
        payload.descricao.clone().into(),
        payload.cliente_id.into(),
        payload.endereco.clone().into(),
        payload.status.as_str().into(),
        payload.data_inicio.clone().into(),
        payload.data_fim.clone().into(),
        payload.valor_total.into(),
    ]
}

impl ProjetoRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // =========================================================================
    //  PROJETOS
    // =========================================================================

    /// Lista projetos, opcionalmente filtrando pelo status.
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<Projeto>, AppError> {
        let projetos = match status {
            Some(status) => {
                let sql = format!("{} WHERE p.status = $1 ORDER BY p.criado_em DESC, p.id DESC", SELECT_PROJETO);
                self.db.all(&sql, &[status.into()]).await?
            }
            None => {
                let sql = format!("{} ORDER BY p.criado_em DESC, p.id DESC", SELECT_PROJETO);
                self.db.all(&sql, &[]).await?
            }
        };
        Ok(projetos)
    }

    pub async fn list_by_cliente(&self, cliente_id: i64) -> Result<Vec<Projeto>, AppError> {
        let sql = format!("{} WHERE p.cliente_id = $1 ORDER BY p.id DESC", SELECT_PROJETO);
        Ok(self.db.all(&sql, &[cliente_id.into()]).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Projeto>, AppError> {
        let sql = format!("{} WHERE p.id = $1", SELECT_PROJETO);
        Ok(self.db.get(&sql, &[id.into()]).await?)
    }

    pub async fn create(&self, payload: &ProjetoPayload) -> Result<Projeto, AppError> {
        let (id,): (i64,) = self
            .db
            .get(
                r#"
                INSERT INTO projetos (
                    nome, descricao, cliente_id, endereco, status, data_inicio, data_fim, valor_total
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
                &params(payload),
            )
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Projeto".into()))
    }

    pub async fn update(&self, id: i64, payload: &ProjetoPayload) -> Result<Option<Projeto>, AppError> {
        let mut values = params(payload);
        values.push(id.into());
        let changed = self
            .db
            .run(
                r#"
                UPDATE projetos
                SET nome = $1, descricao = $2, cliente_id = $3, endereco = $4, status = $5,
                    data_inicio = $6, data_fim = $7, valor_total = $8
                WHERE id = $9
                "#,
                &values,
            )
            .await?;

        if changed == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Gastos e trabalhos vão junto (ON DELETE CASCADE).
    pub async fn delete(&self, id: i64) -> Result<u64, AppError> {
        Ok(self.db.run("DELETE FROM projetos WHERE id = $1", &[id.into()]).await?)
    }

    // =========================================================================
    //  GASTOS
    // =========================================================================

    pub async fn list_gastos(&self, projeto_id: i64) -> Result<Vec<Gasto>, AppError> {
        Ok(self
            .db
            .all(
                "SELECT * FROM gastos WHERE projeto_id = $1 ORDER BY data DESC, id DESC",
                &[projeto_id.into()],
            )
            .await?)
    }

    pub async fn create_gasto(&self, projeto_id: i64, payload: &GastoPayload) -> Result<Gasto, AppError> {
        self.db
            .get(
                r#"
                INSERT INTO gastos (projeto_id, categoria, descricao, valor, data)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
                &[
                    projeto_id.into(),
                    payload.categoria.as_str().into(),
                    payload.descricao.trim().into(),
                    payload.valor.into(),
                    payload.data.as_str().into(),
                ],
            )
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))
    }

    /// Só apaga se o gasto for do projeto informado.
    pub async fn delete_gasto(&self, projeto_id: i64, gasto_id: i64) -> Result<u64, AppError> {
        Ok(self
            .db
            .run(
                "DELETE FROM gastos WHERE id = $1 AND projeto_id = $2",
                &[gasto_id.into(), projeto_id.into()],
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{ClienteRepository, FuncionarioRepository},
        models::{
            cliente::ClientePayload,
            funcionario::{FuncionarioPayload, TrabalhoPayload},
            projeto::{GastoCategoria, ProjetoStatus},
        },
    };

    fn payload(nome: &str, cliente_id: Option<i64>, status: ProjetoStatus) -> ProjetoPayload {
        ProjetoPayload {
            nome: nome.into(),
            descricao: Some("Obra residencial".into()),
            cliente_id,
            endereco: None,
            status,
            data_inicio: Some("2024-01-10".into()),
            data_fim: None,
            valor_total: 30000.0,
        }
    }

    async fn cliente(db: &Database) -> i64 {
        ClienteRepository::new(db.clone())
            .create(&ClientePayload {
                nome: "Cliente Teste".into(),
                email: None,
                telefone: None,
                documento: None,
                endereco: None,
                observacoes: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_project_with_client_name() {
        let db = Database::in_memory().await;
        let repo = ProjetoRepository::new(db.clone());
        let cliente_id = cliente(&db).await;

        let projeto = repo
            .create(&payload("Reforma", Some(cliente_id), ProjetoStatus::Pendente))
            .await
            .unwrap();

        assert_eq!(projeto.status, "pendente");
        assert_eq!(projeto.cliente_nome.as_deref(), Some("Cliente Teste"));
        assert_eq!(repo.list_by_cliente(cliente_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let db = Database::in_memory().await;
        let repo = ProjetoRepository::new(db);
        repo.create(&payload("A", None, ProjetoStatus::Pendente)).await.unwrap();
        repo.create(&payload("B", None, ProjetoStatus::EmAndamento)).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        let andamento = repo.list(Some("em_andamento")).await.unwrap();
        assert_eq!(andamento.len(), 1);
        assert_eq!(andamento[0].nome, "B");
    }

    #[tokio::test]
    async fn invalid_status_is_rejected_by_check_constraint() {
        let db = Database::in_memory().await;
        let err = db
            .run(
                "INSERT INTO projetos (nome, status) VALUES ($1, $2)",
                &["X".into(), "arquivado".into()],
            )
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(err), AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn update_moves_status_forward() {
        let db = Database::in_memory().await;
        let repo = ProjetoRepository::new(db);
        let projeto = repo.create(&payload("C", None, ProjetoStatus::Pendente)).await.unwrap();

        let atualizado = repo
            .update(projeto.id, &payload("C", None, ProjetoStatus::Concluido))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(atualizado.status, "concluido");
        assert!(repo.update(999, &payload("C", None, ProjetoStatus::Concluido)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_project_cascades_to_expenses_and_work() {
        let db = Database::in_memory().await;
        let repo = ProjetoRepository::new(db.clone());
        let funcionarios = FuncionarioRepository::new(db.clone());
        let projeto = repo.create(&payload("D", None, ProjetoStatus::EmAndamento)).await.unwrap();

        let gasto = repo
            .create_gasto(
                projeto.id,
                &GastoPayload {
                    categoria: GastoCategoria::Material,
                    descricao: "Cimento".into(),
                    valor: 450.0,
                    data: "2024-02-01".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(gasto.categoria, "material");

        let f = funcionarios
            .create(&FuncionarioPayload {
                nome: "Pedro".into(),
                funcao: None,
                telefone: None,
                valor_diaria: 180.0,
                valor_hora_extra: 25.0,
                valor_empreitada: 0.0,
                ativo: true,
            })
            .await
            .unwrap();
        funcionarios
            .create_trabalho(
                f.id,
                &TrabalhoPayload {
                    projeto_id: projeto.id,
                    data: "2024-02-01".into(),
                    dias_trabalhados: 1.0,
                    horas_extras: 0.0,
                    empreitada: false,
                    valor_empreitada: 0.0,
                    descricao: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(repo.delete(projeto.id).await.unwrap(), 1);
        assert!(repo.list_gastos(projeto.id).await.unwrap().is_empty());
        assert!(funcionarios.list_trabalhos(f.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expense_is_only_deleted_from_its_project() {
        let db = Database::in_memory().await;
        let repo = ProjetoRepository::new(db);
        let a = repo.create(&payload("A", None, ProjetoStatus::Pendente)).await.unwrap();
        let b = repo.create(&payload("B", None, ProjetoStatus::Pendente)).await.unwrap();
        let gasto = repo
            .create_gasto(
                a.id,
                &GastoPayload {
                    categoria: GastoCategoria::Transporte,
                    descricao: "Frete".into(),
                    valor: 80.0,
                    data: "2024-02-02".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(repo.delete_gasto(b.id, gasto.id).await.unwrap(), 0);
        assert_eq!(repo.delete_gasto(a.id, gasto.id).await.unwrap(), 1);
    }
}

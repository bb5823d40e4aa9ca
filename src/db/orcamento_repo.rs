// src/db/orcamento_repo.rs

use crate::{
    common::error::AppError,
    db::{Database, Param},
    models::orcamento::{
        ItemCategoria, Orcamento, OrcamentoDetalhe, OrcamentoItem, OrcamentoItemPayload,
        OrcamentoPayload,
    },
};

const SELECT_ORCAMENTO: &str = r#"
    SELECT
        o.id, o.cliente_id, c.nome AS cliente_nome, o.projeto_id, p.nome AS projeto_nome,
        o.descricao, o.status, o.validade, o.observacoes, o.criado_em,
        COALESCE((SELECT SUM(i.quantidade * i.valor_unitario) FROM orcamento_itens i
                  WHERE i.orcamento_id = o.id AND i.categoria = 'material'), 0.0) AS total_material,
        COALESCE((SELECT SUM(i.quantidade * i.valor_unitario) FROM orcamento_itens i
                  WHERE i.orcamento_id = o.id AND i.categoria = 'mao_de_obra'), 0.0) AS total_mao_de_obra,
        COALESCE((SELECT SUM(i.quantidade * i.valor_unitario) FROM orcamento_itens i
                  WHERE i.orcamento_id = o.id), 0.0) AS total
    FROM orcamentos o
    LEFT JOIN clientes c ON c.id = o.cliente_id
    LEFT JOIN projetos p ON p.id = o.projeto_id
"#;

#[derive(Clone)]
pub struct OrcamentoRepository {
    db: Database,
}

fn params(payload: &OrcamentoPayload) -> Vec<Param> {
    vec![
        payload.cliente_id.into(),
        payload.projeto_id.into(),
        payload.descricao.trim().into(),
        payload.status.as_str().into(),
        payload.validade.clone().into(),
        payload.observacoes.clone().into(),
    ]
}

impl OrcamentoRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // =========================================================================
    //  ORÇAMENTOS
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<Orcamento>, AppError> {
        let sql = format!("{} ORDER BY o.criado_em DESC, o.id DESC", SELECT_ORCAMENTO);
        Ok(self.db.all(&sql, &[]).await?)
    }

    pub async fn list_by_cliente(&self, cliente_id: i64) -> Result<Vec<Orcamento>, AppError> {
        let sql = format!("{} WHERE o.cliente_id = $1 ORDER BY o.id DESC", SELECT_ORCAMENTO);
        Ok(self.db.all(&sql, &[cliente_id.into()]).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Orcamento>, AppError> {
        let sql = format!("{} WHERE o.id = $1", SELECT_ORCAMENTO);
        Ok(self.db.get(&sql, &[id.into()]).await?)
    }

    /// Cabeçalho + itens separados por categoria.
    pub async fn find_detalhe(&self, id: i64) -> Result<Option<OrcamentoDetalhe>, AppError> {
        let Some(orcamento) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let itens = self.list_itens(id).await?;
        Ok(Some(OrcamentoDetalhe::from_items(orcamento, itens)))
    }

    pub async fn create(&self, payload: &OrcamentoPayload) -> Result<Orcamento, AppError> {
        let (id,): (i64,) = self
            .db
            .get(
                r#"
                INSERT INTO orcamentos (cliente_id, projeto_id, descricao, status, validade, observacoes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
                &params(payload),
            )
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Orçamento".into()))
    }

    pub async fn update(&self, id: i64, payload: &OrcamentoPayload) -> Result<Option<Orcamento>, AppError> {
        let mut values = params(payload);
        values.push(id.into());
        let changed = self
            .db
            .run(
                r#"
                UPDATE orcamentos
                SET cliente_id = $1, projeto_id = $2, descricao = $3, status = $4,
                    validade = $5, observacoes = $6
                WHERE id = $7
                "#,
                &values,
            )
            .await?;

        if changed == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<u64, AppError> {
        Ok(self.db.run("DELETE FROM orcamentos WHERE id = $1", &[id.into()]).await?)
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn list_itens(&self, orcamento_id: i64) -> Result<Vec<OrcamentoItem>, AppError> {
        Ok(self
            .db
            .all(
                r#"
                SELECT id, orcamento_id, categoria, descricao, quantidade, valor_unitario,
                       quantidade * valor_unitario AS subtotal
                FROM orcamento_itens
                WHERE orcamento_id = $1
                ORDER BY categoria ASC, id ASC
                "#,
                &[orcamento_id.into()],
            )
            .await?)
    }

    pub async fn add_item(
        &self,
        orcamento_id: i64,
        payload: &OrcamentoItemPayload,
    ) -> Result<OrcamentoItem, AppError> {
        self.db
            .get(
                r#"
                INSERT INTO orcamento_itens (orcamento_id, categoria, descricao, quantidade, valor_unitario)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, orcamento_id, categoria, descricao, quantidade, valor_unitario,
                          quantidade * valor_unitario AS subtotal
                "#,
                &[
                    orcamento_id.into(),
                    payload.categoria.as_str().into(),
                    payload.descricao.trim().into(),
                    payload.quantidade.into(),
                    payload.valor_unitario.into(),
                ],
            )
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))
    }

    pub async fn delete_item(&self, orcamento_id: i64, item_id: i64) -> Result<u64, AppError> {
        Ok(self
            .db
            .run(
                "DELETE FROM orcamento_itens WHERE id = $1 AND orcamento_id = $2",
                &[item_id.into(), orcamento_id.into()],
            )
            .await?)
    }

    /// Totais de uma categoria, usado pelo PDF.
    pub fn subtotal(itens: &[OrcamentoItem], categoria: ItemCategoria) -> f64 {
        itens
            .iter()
            .filter(|i| i.categoria == categoria.as_str())
            .map(|i| i.subtotal)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::ClienteRepository,
        models::{cliente::ClientePayload, orcamento::OrcamentoStatus},
    };

    async fn setup() -> (OrcamentoRepository, i64) {
        let db = Database::in_memory().await;
        let cliente = ClienteRepository::new(db.clone())
            .create(&ClientePayload {
                nome: "Dona Lúcia".into(),
                email: None,
                telefone: None,
                documento: None,
                endereco: None,
                observacoes: None,
            })
            .await
            .unwrap();
        (OrcamentoRepository::new(db), cliente.id)
    }

    fn payload(cliente_id: i64) -> OrcamentoPayload {
        OrcamentoPayload {
            cliente_id,
            projeto_id: None,
            descricao: "Troca de piso".into(),
            status: OrcamentoStatus::Rascunho,
            validade: Some("2024-05-01".into()),
            observacoes: None,
        }
    }

    fn item(categoria: ItemCategoria, quantidade: f64, valor_unitario: f64) -> OrcamentoItemPayload {
        OrcamentoItemPayload {
            categoria,
            descricao: "item".into(),
            quantidade,
            valor_unitario,
        }
    }

    #[tokio::test]
    async fn totals_split_material_and_labor() {
        let (repo, cliente_id) = setup().await;
        let orcamento = repo.create(&payload(cliente_id)).await.unwrap();
        assert_eq!(orcamento.total, 0.0);
        assert_eq!(orcamento.cliente_nome.as_deref(), Some("Dona Lúcia"));

        repo.add_item(orcamento.id, &item(ItemCategoria::Material, 20.0, 45.5)).await.unwrap();
        repo.add_item(orcamento.id, &item(ItemCategoria::Material, 2.0, 100.0)).await.unwrap();
        let mao = repo.add_item(orcamento.id, &item(ItemCategoria::MaoDeObra, 3.0, 250.0)).await.unwrap();
        assert_eq!(mao.subtotal, 750.0);

        let detalhe = repo.find_detalhe(orcamento.id).await.unwrap().unwrap();
        assert_eq!(detalhe.materiais.len(), 2);
        assert_eq!(detalhe.mao_de_obra.len(), 1);
        assert_eq!(detalhe.orcamento.total_material, 1110.0);
        assert_eq!(detalhe.orcamento.total_mao_de_obra, 750.0);
        assert_eq!(detalhe.orcamento.total, 1860.0);
        assert_eq!(OrcamentoRepository::subtotal(&detalhe.materiais, ItemCategoria::Material), 1110.0);

        assert_eq!(repo.delete_item(orcamento.id, mao.id).await.unwrap(), 1);
        let depois = repo.find_by_id(orcamento.id).await.unwrap().unwrap();
        assert_eq!(depois.total, 1110.0);
    }

    #[tokio::test]
    async fn deleting_budget_removes_items() {
        let (repo, cliente_id) = setup().await;
        let orcamento = repo.create(&payload(cliente_id)).await.unwrap();
        repo.add_item(orcamento.id, &item(ItemCategoria::Material, 1.0, 10.0)).await.unwrap();

        assert_eq!(repo.delete(orcamento.id).await.unwrap(), 1);
        assert!(repo.find_detalhe(orcamento.id).await.unwrap().is_none());
        assert!(repo.list_itens(orcamento.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn budget_for_unknown_client_is_rejected() {
        let (repo, cliente_id) = setup().await;
        let err = repo.create(&payload(cliente_id + 50)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}

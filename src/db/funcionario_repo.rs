// src/db/funcionario_repo.rs

use crate::{
    common::error::AppError,
    db::{flag_column, relatorio_repo::CUSTO_TRABALHO, Database, Param},
    models::funcionario::{
        Adiantamento, AdiantamentoPayload, Funcionario, FuncionarioPayload, Trabalho,
        TrabalhoPayload,
    },
};

#[derive(Clone)]
pub struct FuncionarioRepository {
    db: Database,
}

fn params(payload: &FuncionarioPayload) -> Vec<Param> {
    vec![
        payload.nome.trim().into(),
        payload.funcao.clone().into(),
        payload.telefone.clone().into(),
        payload.valor_diaria.into(),
        payload.valor_hora_extra.into(),
        payload.valor_empreitada.into(),
        payload.ativo.into(),
    ]
}

fn colunas_funcionario() -> String {
    format!(
        "id, nome, funcao, telefone, valor_diaria, valor_hora_extra, valor_empreitada, {}, criado_em",
        flag_column("ativo", "ativo")
    )
}

fn select_trabalhos(filtro: &str) -> String {
    format!(
        r#"
        SELECT
            t.id, t.funcionario_id, t.projeto_id, t.data,
            t.dias_trabalhados, t.horas_extras, {empreitada}, t.valor_empreitada,
            t.descricao,
            p.nome AS projeto_nome,
            f.nome AS funcionario_nome,
            {custo} AS valor
        FROM trabalhos t
        JOIN funcionarios f ON f.id = t.funcionario_id
        JOIN projetos p ON p.id = t.projeto_id
        WHERE {filtro}
        ORDER BY t.data DESC, t.id DESC
        "#,
        empreitada = flag_column("t.empreitada", "empreitada"),
        custo = CUSTO_TRABALHO,
        filtro = filtro
    )
}

impl FuncionarioRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // =========================================================================
    //  FUNCIONÁRIOS
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<Funcionario>, AppError> {
        Ok(self
            .db
            .all(
                &format!(
                    "SELECT {} FROM funcionarios ORDER BY ativo DESC, nome ASC",
                    colunas_funcionario()
                ),
                &[],
            )
            .await?)
    }

    pub async fn list_ativos(&self) -> Result<Vec<Funcionario>, AppError> {
        Ok(self
            .db
            .all(
                &format!(
                    "SELECT {} FROM funcionarios WHERE ativo = $1 ORDER BY nome ASC",
                    colunas_funcionario()
                ),
                &[true.into()],
            )
            .await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Funcionario>, AppError> {
        Ok(self
            .db
            .get(
                &format!("SELECT {} FROM funcionarios WHERE id = $1", colunas_funcionario()),
                &[id.into()],
            )
            .await?)
    }

    pub async fn create(&self, payload: &FuncionarioPayload) -> Result<Funcionario, AppError> {
        self.db
            .get(
                &format!(
                    r#"
                    INSERT INTO funcionarios (
                        nome, funcao, telefone, valor_diaria, valor_hora_extra, valor_empreitada, ativo
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING {}
                    "#,
                    colunas_funcionario()
                ),
                &params(payload),
            )
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))
    }

    pub async fn update(
        &self,
        id: i64,
        payload: &FuncionarioPayload,
    ) -> Result<Option<Funcionario>, AppError> {
        let mut values = params(payload);
        values.push(id.into());
        Ok(self
            .db
            .get(
                &format!(
                    r#"
                    UPDATE funcionarios
                    SET nome = $1, funcao = $2, telefone = $3, valor_diaria = $4,
                        valor_hora_extra = $5, valor_empreitada = $6, ativo = $7
                    WHERE id = $8
                    RETURNING {}
                    "#,
                    colunas_funcionario()
                ),
                &values,
            )
            .await?)
    }

    pub async fn delete(&self, id: i64) -> Result<u64, AppError> {
        Ok(self.db.run("DELETE FROM funcionarios WHERE id = $1", &[id.into()]).await?)
    }

    // =========================================================================
    //  TRABALHOS (dias trabalhados / empreitadas)
    // =========================================================================

    pub async fn list_trabalhos(&self, funcionario_id: i64) -> Result<Vec<Trabalho>, AppError> {
        Ok(self
            .db
            .all(&select_trabalhos("t.funcionario_id = $1"), &[funcionario_id.into()])
            .await?)
    }

    pub async fn list_trabalhos_do_projeto(&self, projeto_id: i64) -> Result<Vec<Trabalho>, AppError> {
        Ok(self
            .db
            .all(&select_trabalhos("t.projeto_id = $1"), &[projeto_id.into()])
            .await?)
    }

    pub async fn create_trabalho(
        &self,
        funcionario_id: i64,
        payload: &TrabalhoPayload,
    ) -> Result<i64, AppError> {
        // Empreitada não conta dias nem horas; diária não tem valor fechado
        let (dias, horas, valor) = if payload.empreitada {
            (0.0, 0.0, payload.valor_empreitada)
        } else {
            (payload.dias_trabalhados, payload.horas_extras, 0.0)
        };

        let (id,): (i64,) = self
            .db
            .get(
                r#"
                INSERT INTO trabalhos (
                    funcionario_id, projeto_id, data, dias_trabalhados, horas_extras,
                    empreitada, valor_empreitada, descricao
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
                &[
                    funcionario_id.into(),
                    payload.projeto_id.into(),
                    payload.data.as_str().into(),
                    dias.into(),
                    horas.into(),
                    payload.empreitada.into(),
                    valor.into(),
                    payload.descricao.clone().into(),
                ],
            )
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))?;

        Ok(id)
    }

    /// Remove o trabalho e devolve o funcionário dono, para o redirecionamento.
    pub async fn delete_trabalho(&self, id: i64) -> Result<Option<i64>, AppError> {
        let dono: Option<(i64,)> = self
            .db
            .get("SELECT funcionario_id FROM trabalhos WHERE id = $1", &[id.into()])
            .await?;
        if dono.is_some() {
            self.db.run("DELETE FROM trabalhos WHERE id = $1", &[id.into()]).await?;
        }
        Ok(dono.map(|(f,)| f))
    }

    // =========================================================================
    //  ADIANTAMENTOS
    // =========================================================================

    pub async fn list_adiantamentos(&self, funcionario_id: i64) -> Result<Vec<Adiantamento>, AppError> {
        Ok(self
            .db
            .all(
                "SELECT * FROM adiantamentos WHERE funcionario_id = $1 ORDER BY data DESC, id DESC",
                &[funcionario_id.into()],
            )
            .await?)
    }

    pub async fn create_adiantamento(
        &self,
        funcionario_id: i64,
        payload: &AdiantamentoPayload,
    ) -> Result<Adiantamento, AppError> {
        self.db
            .get(
                r#"
                INSERT INTO adiantamentos (funcionario_id, valor, data, descricao)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
                &[
                    funcionario_id.into(),
                    payload.valor.into(),
                    payload.data.as_str().into(),
                    payload.descricao.clone().into(),
                ],
            )
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("INSERT sem RETURNING")))
    }

    pub async fn delete_adiantamento(&self, id: i64) -> Result<Option<i64>, AppError> {
        let dono: Option<(i64,)> = self
            .db
            .get("SELECT funcionario_id FROM adiantamentos WHERE id = $1", &[id.into()])
            .await?;
        if dono.is_some() {
            self.db.run("DELETE FROM adiantamentos WHERE id = $1", &[id.into()]).await?;
        }
        Ok(dono.map(|(f,)| f))
    }
}

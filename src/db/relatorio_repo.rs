// src/db/relatorio_repo.rs

use crate::{
    common::error::AppError,
    db::{Database, Param},
    models::{
        ia::MediaTaxas,
        relatorio::{
            Contagens, CustoCategoria, FolhaFuncionario, LucratividadeProjeto, Periodo,
            ProjetoRecente, Totais,
        },
    },
};

/// Custo de mão de obra de um trabalho (`t`) com as taxas do funcionário (`f`):
/// valor fechado quando é empreitada, senão diárias + horas extras.
pub const CUSTO_TRABALHO: &str = "(CASE WHEN t.empreitada THEN t.valor_empreitada \
     ELSE t.dias_trabalhados * f.valor_diaria + t.horas_extras * f.valor_hora_extra END)";

// Somente leitura: todas as agregações ficam no SQL
#[derive(Clone)]
pub struct RelatorioRepository {
    db: Database,
}

impl RelatorioRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // 1. Lucratividade (receita − gastos − mão de obra) por projeto
    pub async fn lucratividade(
        &self,
        projeto_id: Option<i64>,
    ) -> Result<Vec<LucratividadeProjeto>, AppError> {
        let (filtro, params): (&str, Vec<Param>) = match projeto_id {
            Some(id) => ("WHERE p.id = $1", vec![id.into()]),
            None => ("", vec![]),
        };

        let sql = format!(
            r#"
            SELECT x.*, x.receita - x.custo_gastos - x.custo_mao_de_obra AS lucro
            FROM (
                SELECT
                    p.id AS projeto_id,
                    p.nome AS projeto_nome,
                    c.nome AS cliente_nome,
                    p.status AS status,
                    p.valor_total AS receita,
                    COALESCE((SELECT SUM(g.valor) FROM gastos g WHERE g.projeto_id = p.id), 0.0)
                        AS custo_gastos,
                    COALESCE((SELECT SUM({custo}) FROM trabalhos t
                              JOIN funcionarios f ON f.id = t.funcionario_id
                              WHERE t.projeto_id = p.id), 0.0)
                        AS custo_mao_de_obra
                FROM projetos p
                LEFT JOIN clientes c ON c.id = p.cliente_id
                {filtro}
            ) x
            ORDER BY x.projeto_nome ASC
            "#,
            custo = CUSTO_TRABALHO,
            filtro = filtro
        );

        Ok(self.db.all(&sql, &params).await?)
    }

    // 2. Custos por categoria (gastos + uma linha de mão de obra)
    pub async fn custos_por_categoria(
        &self,
        projeto_id: Option<i64>,
    ) -> Result<Vec<CustoCategoria>, AppError> {
        let (filtro_gastos, filtro_trabalhos, params): (&str, &str, Vec<Param>) = match projeto_id {
            Some(id) => ("WHERE g.projeto_id = $1", "WHERE t.projeto_id = $1", vec![id.into()]),
            None => ("", "", vec![]),
        };

        let sql = format!(
            r#"
            SELECT g.categoria AS categoria, COALESCE(SUM(g.valor), 0.0) AS total
            FROM gastos g
            {filtro_gastos}
            GROUP BY g.categoria
            UNION ALL
            SELECT 'mao_de_obra' AS categoria, COALESCE(SUM({custo}), 0.0) AS total
            FROM trabalhos t
            JOIN funcionarios f ON f.id = t.funcionario_id
            {filtro_trabalhos}
            ORDER BY total DESC
            "#,
            custo = CUSTO_TRABALHO,
            filtro_gastos = filtro_gastos,
            filtro_trabalhos = filtro_trabalhos
        );

        Ok(self.db.all(&sql, &params).await?)
    }

    // 3. Folha de pagamento: bruto − adiantamentos no período [inicio, fim].
    // Entra quem tem trabalho ou adiantamento no período, mesmo com valor zero.
    pub async fn folha(&self, periodo: &Periodo) -> Result<Vec<FolhaFuncionario>, AppError> {
        let sql = format!(
            r#"
            SELECT x.*, x.bruto - x.adiantamentos AS liquido
            FROM (
                SELECT
                    f.id AS funcionario_id,
                    f.nome AS funcionario_nome,
                    f.funcao AS funcao,
                    COALESCE((SELECT SUM(t.dias_trabalhados) FROM trabalhos t
                              WHERE t.funcionario_id = f.id AND t.data BETWEEN $1 AND $2), 0.0)
                        AS dias,
                    COALESCE((SELECT SUM(t.horas_extras) FROM trabalhos t
                              WHERE t.funcionario_id = f.id AND t.data BETWEEN $1 AND $2), 0.0)
                        AS horas_extras,
                    COALESCE((SELECT SUM({custo}) FROM trabalhos t
                              WHERE t.funcionario_id = f.id AND t.data BETWEEN $1 AND $2), 0.0)
                        AS bruto,
                    COALESCE((SELECT SUM(a.valor) FROM adiantamentos a
                              WHERE a.funcionario_id = f.id AND a.data BETWEEN $1 AND $2), 0.0)
                        AS adiantamentos
                FROM funcionarios f
                WHERE EXISTS (SELECT 1 FROM trabalhos t
                              WHERE t.funcionario_id = f.id AND t.data BETWEEN $1 AND $2)
                   OR EXISTS (SELECT 1 FROM adiantamentos a
                              WHERE a.funcionario_id = f.id AND a.data BETWEEN $1 AND $2)
            ) x
            ORDER BY x.funcionario_nome ASC
            "#,
            custo = CUSTO_TRABALHO
        );

        Ok(self
            .db
            .all(&sql, &[periodo.inicio_iso().into(), periodo.fim_iso().into()])
            .await?)
    }

    // 4. Resumo geral para o dashboard
    pub async fn contagens(&self) -> Result<Contagens, AppError> {
        let contagens = self
            .db
            .get(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM clientes) AS clientes,
                    (SELECT COUNT(*) FROM funcionarios WHERE ativo = $1) AS funcionarios_ativos,
                    (SELECT COUNT(*) FROM projetos WHERE status = 'pendente') AS projetos_pendentes,
                    (SELECT COUNT(*) FROM projetos WHERE status = 'em_andamento') AS projetos_em_andamento,
                    (SELECT COUNT(*) FROM projetos WHERE status = 'concluido') AS projetos_concluidos,
                    (SELECT COUNT(*) FROM orcamentos WHERE status IN ('rascunho', 'enviado'))
                        AS orcamentos_abertos
                "#,
                &[true.into()],
            )
            .await?;
        Ok(contagens.unwrap_or_default())
    }

    /// Receita ignora projetos cancelados.
    pub async fn totais(&self) -> Result<Totais, AppError> {
        let sql = format!(
            r#"
            SELECT
                COALESCE((SELECT SUM(valor_total) FROM projetos WHERE status <> 'cancelado'), 0.0)
                    AS receita,
                COALESCE((SELECT SUM(valor) FROM gastos), 0.0) AS gastos,
                COALESCE((SELECT SUM({custo}) FROM trabalhos t
                          JOIN funcionarios f ON f.id = t.funcionario_id), 0.0) AS mao_de_obra
            "#,
            custo = CUSTO_TRABALHO
        );
        Ok(self.db.get(&sql, &[]).await?.unwrap_or_default())
    }

    pub async fn projetos_recentes(&self, limite: i64) -> Result<Vec<ProjetoRecente>, AppError> {
        Ok(self
            .db
            .all(
                r#"
                SELECT p.id, p.nome, p.status, c.nome AS cliente_nome, p.valor_total
                FROM projetos p
                LEFT JOIN clientes c ON c.id = p.cliente_id
                ORDER BY p.criado_em DESC, p.id DESC
                LIMIT $1
                "#,
                &[limite.into()],
            )
            .await?)
    }

    // 5. Médias das taxas dos funcionários ativos (contexto da IA)
    pub async fn media_taxas(&self) -> Result<MediaTaxas, AppError> {
        Ok(self
            .db
            .get(
                r#"
                SELECT
                    COALESCE(AVG(valor_diaria), 0.0) AS media_diaria,
                    COALESCE(AVG(valor_hora_extra), 0.0) AS media_hora_extra,
                    COUNT(*) AS funcionarios_ativos
                FROM funcionarios
                WHERE ativo = $1
                "#,
                &[true.into()],
            )
            .await?
            .unwrap_or_default())
    }
}

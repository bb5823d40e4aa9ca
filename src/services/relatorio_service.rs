// src/services/relatorio_service.rs

use crate::{
    common::error::AppError,
    db::RelatorioRepository,
    models::{
        ia::MediaTaxas,
        relatorio::{
            CustoCategoria, FolhaPagamento, LucratividadeProjeto, Periodo, ResumoGeral,
        },
    },
};

/// Quantidade de projetos mostrados no dashboard
const PROJETOS_RECENTES: i64 = 5;

/// Percentual de `parte` sobre `total`; zero quando não há total.
pub fn percentual(parte: f64, total: f64) -> f64 {
    if total.abs() < f64::EPSILON { 0.0 } else { parte / total * 100.0 }
}

#[derive(Clone)]
pub struct RelatorioService {
    repo: RelatorioRepository,
}

impl RelatorioService {
    pub fn new(repo: RelatorioRepository) -> Self {
        Self { repo }
    }

    pub async fn lucratividade(
        &self,
        projeto_id: Option<i64>,
    ) -> Result<Vec<LucratividadeProjeto>, AppError> {
        let mut linhas = self.repo.lucratividade(projeto_id).await?;
        for linha in &mut linhas {
            linha.margem = percentual(linha.lucro, linha.receita);
        }
        Ok(linhas)
    }

    /// Categorias sem valor ficam de fora (a linha de mão de obra sempre vem do SQL).
    pub async fn custos(&self, projeto_id: Option<i64>) -> Result<Vec<CustoCategoria>, AppError> {
        let mut linhas: Vec<CustoCategoria> = self
            .repo
            .custos_por_categoria(projeto_id)
            .await?
            .into_iter()
            .filter(|c| c.total > 0.0)
            .collect();

        let total: f64 = linhas.iter().map(|c| c.total).sum();
        for linha in &mut linhas {
            linha.percentual = percentual(linha.total, total);
        }
        Ok(linhas)
    }

    pub async fn folha(&self, periodo: &Periodo) -> Result<FolhaPagamento, AppError> {
        let funcionarios = self.repo.folha(periodo).await?;

        let total_bruto = funcionarios.iter().map(|f| f.bruto).sum();
        let total_adiantamentos = funcionarios.iter().map(|f| f.adiantamentos).sum();
        let total_liquido = funcionarios.iter().map(|f| f.liquido).sum();

        tracing::debug!(
            "Folha {}..{}: {} funcionários",
            periodo.inicio_iso(),
            periodo.fim_iso(),
            funcionarios.len()
        );

        Ok(FolhaPagamento {
            inicio: periodo.inicio_iso(),
            fim: periodo.fim_iso(),
            funcionarios,
            total_bruto,
            total_adiantamentos,
            total_liquido,
        })
    }

    pub async fn media_taxas(&self) -> Result<MediaTaxas, AppError> {
        self.repo.media_taxas().await
    }

    pub async fn resumo(&self) -> Result<ResumoGeral, AppError> {
        let contagens = self.repo.contagens().await?;
        let totais = self.repo.totais().await?;
        let projetos_recentes = self.repo.projetos_recentes(PROJETOS_RECENTES).await?;
        let lucro_estimado = totais.receita - totais.gastos - totais.mao_de_obra;

        Ok(ResumoGeral {
            contagens,
            totais,
            lucro_estimado,
            projetos_recentes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{Database, FuncionarioRepository, ProjetoRepository},
        models::{
            funcionario::{AdiantamentoPayload, FuncionarioPayload, TrabalhoPayload},
            projeto::{GastoCategoria, GastoPayload, ProjetoPayload, ProjetoStatus},
        },
    };
    use chrono::NaiveDate;

    struct Cenario {
        db: Database,
        service: RelatorioService,
        casa: i64,
        muro: i64,
        ze: i64,
    }

    fn projeto(nome: &str, status: ProjetoStatus, valor_total: f64) -> ProjetoPayload {
        ProjetoPayload {
            nome: nome.into(),
            descricao: None,
            cliente_id: None,
            endereco: None,
            status,
            data_inicio: None,
            data_fim: None,
            valor_total,
        }
    }

    fn funcionario(nome: &str, diaria: f64, hora_extra: f64, ativo: bool) -> FuncionarioPayload {
        FuncionarioPayload {
            nome: nome.into(),
            funcao: None,
            telefone: None,
            valor_diaria: diaria,
            valor_hora_extra: hora_extra,
            valor_empreitada: 0.0,
            ativo,
        }
    }

    fn diaria(projeto_id: i64, data: &str, dias: f64, horas: f64) -> TrabalhoPayload {
        TrabalhoPayload {
            projeto_id,
            data: data.into(),
            dias_trabalhados: dias,
            horas_extras: horas,
            empreitada: false,
            valor_empreitada: 0.0,
            descricao: None,
        }
    }

    fn gasto(categoria: GastoCategoria, valor: f64) -> GastoPayload {
        GastoPayload {
            categoria,
            descricao: "compra".into(),
            valor,
            data: "2024-03-10".into(),
        }
    }

    // Casa: receita 10000, gastos 1500 (material) + 500 (transporte),
    //       Zé 2 dias a 200 + 4h a 25 = 500, Rui empreitada 3000.
    // Muro: receita 2000, sem custos.
    async fn cenario() -> Cenario {
        let db = Database::in_memory().await;
        let projetos = ProjetoRepository::new(db.clone());
        let funcionarios = FuncionarioRepository::new(db.clone());

        let casa = projetos
            .create(&projeto("Casa", ProjetoStatus::EmAndamento, 10000.0))
            .await
            .unwrap()
            .id;
        let muro = projetos
            .create(&projeto("Muro", ProjetoStatus::Pendente, 2000.0))
            .await
            .unwrap()
            .id;

        projetos.create_gasto(casa, &gasto(GastoCategoria::Material, 1500.0)).await.unwrap();
        projetos.create_gasto(casa, &gasto(GastoCategoria::Transporte, 500.0)).await.unwrap();

        let ze = funcionarios.create(&funcionario("Zé", 200.0, 25.0, true)).await.unwrap().id;
        let rui = funcionarios.create(&funcionario("Rui", 180.0, 20.0, true)).await.unwrap().id;
        funcionarios.create(&funcionario("Parado", 150.0, 20.0, false)).await.unwrap();

        funcionarios.create_trabalho(ze, &diaria(casa, "2024-03-01", 2.0, 4.0)).await.unwrap();
        funcionarios
            .create_trabalho(
                rui,
                &TrabalhoPayload {
                    projeto_id: casa,
                    data: "2024-03-31".into(),
                    dias_trabalhados: 10.0,
                    horas_extras: 0.0,
                    empreitada: true,
                    valor_empreitada: 3000.0,
                    descricao: Some("Telhado".into()),
                },
            )
            .await
            .unwrap();

        Cenario {
            service: RelatorioService::new(RelatorioRepository::new(db.clone())),
            db,
            casa,
            muro,
            ze,
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn percentual_of_zero_total_is_zero() {
        assert_eq!(percentual(10.0, 0.0), 0.0);
        assert_eq!(percentual(25.0, 200.0), 12.5);
    }

    #[tokio::test]
    async fn lucratividade_matches_hand_computed_values() {
        let c = cenario().await;
        let linhas = c.service.lucratividade(None).await.unwrap();
        assert_eq!(linhas.len(), 2);

        let casa = linhas.iter().find(|l| l.projeto_id == c.casa).unwrap();
        assert_eq!(casa.receita, 10000.0);
        assert_eq!(casa.custo_gastos, 2000.0);
        assert_eq!(casa.custo_mao_de_obra, 500.0 + 3000.0);
        assert_eq!(casa.lucro, 4500.0);
        assert!((casa.margem - 45.0).abs() < 1e-9);

        let muro = linhas.iter().find(|l| l.projeto_id == c.muro).unwrap();
        assert_eq!(muro.lucro, 2000.0);
        assert!((muro.margem - 100.0).abs() < 1e-9);

        let so_muro = c.service.lucratividade(Some(c.muro)).await.unwrap();
        assert_eq!(so_muro.len(), 1);
        assert_eq!(so_muro[0].projeto_nome, "Muro");
    }

    #[tokio::test]
    async fn custos_include_labor_line_with_percentages() {
        let c = cenario().await;
        let custos = c.service.custos(Some(c.casa)).await.unwrap();

        // total = 1500 + 500 + 3500 = 5500, maior primeiro
        let categorias: Vec<&str> = custos.iter().map(|l| l.categoria.as_str()).collect();
        assert_eq!(categorias, vec!["mao_de_obra", "material", "transporte"]);
        assert_eq!(custos[0].total, 3500.0);
        assert!((custos[1].percentual - 1500.0 / 5500.0 * 100.0).abs() < 1e-9);

        let soma: f64 = custos.iter().map(|l| l.percentual).sum();
        assert!((soma - 100.0).abs() < 1e-9);

        // projeto sem custos: nenhuma linha
        assert!(c.service.custos(Some(c.muro)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn folha_respects_inclusive_range_and_advances() {
        let c = cenario().await;
        FuncionarioRepository::new(c.db.clone())
            .create_adiantamento(
                c.ze,
                &AdiantamentoPayload {
                    valor: 120.0,
                    data: "2024-03-15".into(),
                    descricao: None,
                },
            )
            .await
            .unwrap();

        let marco = Periodo { inicio: d("2024-03-01"), fim: d("2024-03-31") };
        let folha = c.service.folha(&marco).await.unwrap();
        assert_eq!(folha.funcionarios.len(), 2);
        assert_eq!(folha.total_bruto, 3500.0);
        assert_eq!(folha.total_adiantamentos, 120.0);
        assert_eq!(folha.total_liquido, 3380.0);

        let ze = folha.funcionarios.iter().find(|f| f.funcionario_id == c.ze).unwrap();
        assert_eq!(ze.dias, 2.0);
        assert_eq!(ze.horas_extras, 4.0);
        assert_eq!(ze.liquido, 380.0);

        // o dia 31 fica de fora: só o Zé aparece
        let ate_30 = Periodo { inicio: d("2024-03-01"), fim: d("2024-03-30") };
        let folha = c.service.folha(&ate_30).await.unwrap();
        assert_eq!(folha.funcionarios.len(), 1);
        assert_eq!(folha.total_bruto, 500.0);

        let abril = Periodo { inicio: d("2024-04-01"), fim: d("2024-04-30") };
        assert!(c.service.folha(&abril).await.unwrap().funcionarios.is_empty());
    }

    #[tokio::test]
    async fn folha_keeps_workers_with_zero_value_days() {
        let c = cenario().await;
        let funcionarios = FuncionarioRepository::new(c.db.clone());
        let aprendiz = funcionarios
            .create(&funcionario("Aprendiz", 0.0, 0.0, true))
            .await
            .unwrap()
            .id;
        funcionarios
            .create_trabalho(aprendiz, &diaria(c.casa, "2024-03-05", 3.0, 0.0))
            .await
            .unwrap();

        let marco = Periodo { inicio: d("2024-03-01"), fim: d("2024-03-31") };
        let folha = c.service.folha(&marco).await.unwrap();
        assert_eq!(folha.funcionarios.len(), 3);

        let linha = folha
            .funcionarios
            .iter()
            .find(|f| f.funcionario_id == aprendiz)
            .unwrap();
        assert_eq!(linha.dias, 3.0);
        assert_eq!(linha.bruto, 0.0);
        assert_eq!(linha.liquido, 0.0);
        // "Parado" não tem atividade e continua fora
        assert!(folha.funcionarios.iter().all(|f| f.funcionario_nome != "Parado"));
    }

    #[tokio::test]
    async fn resumo_counts_and_totals() {
        let c = cenario().await;
        let resumo = c.service.resumo().await.unwrap();

        assert_eq!(resumo.contagens.funcionarios_ativos, 2);
        assert_eq!(resumo.contagens.projetos_em_andamento, 1);
        assert_eq!(resumo.contagens.projetos_pendentes, 1);
        assert_eq!(resumo.totais.receita, 12000.0);
        assert_eq!(resumo.totais.gastos, 2000.0);
        assert_eq!(resumo.totais.mao_de_obra, 3500.0);
        assert_eq!(resumo.lucro_estimado, 6500.0);
        assert_eq!(resumo.projetos_recentes.len(), 2);
    }
}

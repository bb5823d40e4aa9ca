// src/models/relatorio.rs

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::common::form::{blank_as_none, empty_string_as_none};

// 1. Lucratividade por projeto
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LucratividadeProjeto {
    #[schema(example = 1)]
    pub projeto_id: i64,
    #[schema(example = "Reforma Casa Centro")]
    pub projeto_nome: String,
    pub cliente_nome: Option<String>,
    #[schema(example = "em_andamento")]
    pub status: String,
    #[schema(example = 50000.0)]
    pub receita: f64,
    #[schema(example = 12000.0)]
    pub custo_gastos: f64,
    #[schema(example = 18000.0)]
    pub custo_mao_de_obra: f64,
    #[schema(example = 20000.0)]
    pub lucro: f64,
    // Preenchida no serviço (percentual sobre a receita)
    #[sqlx(default)]
    #[schema(example = 40.0)]
    pub margem: f64,
}

// 2. Custos agrupados por categoria
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CustoCategoria {
    #[schema(example = "material")]
    pub categoria: String,
    #[schema(example = 12000.0)]
    pub total: f64,
    #[sqlx(default)]
    #[schema(example = 40.0)]
    pub percentual: f64,
}

// 3. Folha de pagamento por funcionário
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FolhaFuncionario {
    pub funcionario_id: i64,
    #[schema(example = "João Pedreiro")]
    pub funcionario_nome: String,
    pub funcao: Option<String>,
    #[schema(example = 10.0)]
    pub dias: f64,
    #[schema(example = 4.0)]
    pub horas_extras: f64,
    #[schema(example = 2000.0)]
    pub bruto: f64,
    #[schema(example = 300.0)]
    pub adiantamentos: f64,
    #[schema(example = 1700.0)]
    pub liquido: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FolhaPagamento {
    #[schema(example = "2024-03-01")]
    pub inicio: String,
    #[schema(example = "2024-03-31")]
    pub fim: String,
    pub funcionarios: Vec<FolhaFuncionario>,
    pub total_bruto: f64,
    pub total_adiantamentos: f64,
    pub total_liquido: f64,
}

// 4. Resumo geral (dashboard)
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct Contagens {
    pub clientes: i64,
    pub funcionarios_ativos: i64,
    pub projetos_pendentes: i64,
    pub projetos_em_andamento: i64,
    pub projetos_concluidos: i64,
    pub orcamentos_abertos: i64,
}

#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct Totais {
    pub receita: f64,
    pub gastos: f64,
    pub mao_de_obra: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProjetoRecente {
    pub id: i64,
    pub nome: String,
    pub status: String,
    pub cliente_nome: Option<String>,
    pub valor_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumoGeral {
    pub contagens: Contagens,
    pub totais: Totais,
    pub lucro_estimado: f64,
    pub projetos_recentes: Vec<ProjetoRecente>,
}

/// Formato de saída dos relatórios.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Formato {
    #[default]
    Html,
    Csv,
    Pdf,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FiltroProjeto {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub projeto_id: Option<i64>,
    #[serde(default)]
    #[param(inline)]
    pub formato: Formato,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FiltroPeriodo {
    /// Data inicial (AAAA-MM-DD); padrão: primeiro dia do mês
    #[serde(default, deserialize_with = "blank_as_none")]
    pub inicio: Option<String>,
    /// Data final (AAAA-MM-DD); padrão: hoje
    #[serde(default, deserialize_with = "blank_as_none")]
    pub fim: Option<String>,
    #[serde(default)]
    #[param(inline)]
    pub formato: Formato,
}

/// Período fechado [inicio, fim] em datas ISO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Periodo {
    pub inicio: NaiveDate,
    pub fim: NaiveDate,
}

impl Periodo {
    pub fn mes_corrente(hoje: NaiveDate) -> Self {
        Self {
            inicio: hoje.with_day(1).unwrap_or(hoje),
            fim: hoje,
        }
    }

    /// Datas ausentes caem no mês corrente; datas invertidas são rejeitadas.
    pub fn from_filtro(filtro: &FiltroPeriodo, hoje: NaiveDate) -> Result<Self, String> {
        let padrao = Self::mes_corrente(hoje);
        let parse = |v: &Option<String>, default: NaiveDate| -> Result<NaiveDate, String> {
            match v {
                Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| format!("data inválida: {}", s)),
                None => Ok(default),
            }
        };
        let inicio = parse(&filtro.inicio, padrao.inicio)?;
        let fim = parse(&filtro.fim, padrao.fim)?;
        if inicio > fim {
            return Err("a data inicial é posterior à final".into());
        }
        Ok(Self { inicio, fim })
    }

    pub fn hoje() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn inicio_iso(&self) -> String {
        self.inicio.format("%Y-%m-%d").to_string()
    }

    pub fn fim_iso(&self) -> String {
        self.fim.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn default_period_is_current_month() {
        let periodo = Periodo::from_filtro(&FiltroPeriodo::default(), d("2024-03-15")).unwrap();
        assert_eq!(periodo.inicio_iso(), "2024-03-01");
        assert_eq!(periodo.fim_iso(), "2024-03-15");
    }

    #[test]
    fn inverted_period_is_rejected() {
        let filtro = FiltroPeriodo {
            inicio: Some("2024-04-01".into()),
            fim: Some("2024-03-01".into()),
            formato: Formato::Html,
        };
        assert!(Periodo::from_filtro(&filtro, d("2024-03-15")).is_err());
    }
}

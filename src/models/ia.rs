// src/models/ia.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::relatorio::LucratividadeProjeto;

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
pub struct MediaTaxas {
    #[schema(example = 180.0)]
    pub media_diaria: f64,
    #[schema(example = 30.0)]
    pub media_hora_extra: f64,
    #[schema(example = 6)]
    pub funcionarios_ativos: i64,
}

/// Números enviados para a IA e devolvidos junto com a resposta.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResumoFinanceiro {
    pub projetos: Vec<LucratividadeProjeto>,
    pub taxas: MediaTaxas,
    pub receita_total: f64,
    pub custo_total: f64,
    pub lucro_total: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnaliseIa {
    /// Texto livre gerado pelo modelo
    pub resposta: String,
    pub resumo: ResumoFinanceiro,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PerguntaIa {
    /// Pergunta opcional anexada ao prompt
    #[serde(default, deserialize_with = "crate::common::form::blank_as_none")]
    #[schema(example = "Quais projetos estão com margem baixa?")]
    pub pergunta: Option<String>,
}

// src/models/orcamento.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::common::form::{
    blank_as_none, empty_string_as_none, number_or_zero, validate_date, validate_not_negative,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrcamentoStatus {
    Rascunho,
    Enviado,
    Aprovado,
    Rejeitado,
}

impl OrcamentoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrcamentoStatus::Rascunho => "rascunho",
            OrcamentoStatus::Enviado => "enviado",
            OrcamentoStatus::Aprovado => "aprovado",
            OrcamentoStatus::Rejeitado => "rejeitado",
        }
    }
}

/// Itens se dividem em material e mão de obra.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategoria {
    Material,
    MaoDeObra,
}

impl ItemCategoria {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategoria::Material => "material",
            ItemCategoria::MaoDeObra => "mao_de_obra",
        }
    }
}

// Cabeçalho do orçamento, já com os totais somados dos itens
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Orcamento {
    pub id: i64,
    pub cliente_id: i64,
    pub cliente_nome: Option<String>,
    pub projeto_id: Option<i64>,
    pub projeto_nome: Option<String>,
    pub descricao: String,
    pub status: String,
    pub validade: Option<String>,
    pub observacoes: Option<String>,
    pub criado_em: String,
    pub total_material: f64,
    pub total_mao_de_obra: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrcamentoItem {
    pub id: i64,
    pub orcamento_id: i64,
    pub categoria: String,
    pub descricao: String,
    pub quantidade: f64,
    pub valor_unitario: f64,
    pub subtotal: f64,
}

/// Orçamento completo, pronto para a página de detalhe e para o PDF.
#[derive(Debug, Clone, Serialize)]
pub struct OrcamentoDetalhe {
    pub orcamento: Orcamento,
    pub materiais: Vec<OrcamentoItem>,
    pub mao_de_obra: Vec<OrcamentoItem>,
}

impl OrcamentoDetalhe {
    pub fn from_items(orcamento: Orcamento, itens: Vec<OrcamentoItem>) -> Self {
        let (materiais, mao_de_obra) = itens
            .into_iter()
            .partition(|i| i.categoria == ItemCategoria::Material.as_str());
        Self { orcamento, materiais, mao_de_obra }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrcamentoPayload {
    pub cliente_id: i64,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub projeto_id: Option<i64>,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    pub status: OrcamentoStatus,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(custom(function = "validate_date"))]
    pub validade: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrcamentoItemPayload {
    pub categoria: ItemCategoria,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(range(exclusive_min = 0.0, message = "A quantidade deve ser maior que zero."))]
    pub quantidade: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(custom(function = "validate_not_negative"))]
    pub valor_unitario: f64,
}

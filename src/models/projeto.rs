// src/models/projeto.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::common::form::{
    blank_as_none, empty_string_as_none, number_or_zero, validate_date, validate_not_negative,
};

/// Ciclo de vida: pendente → em_andamento → concluido | cancelado.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjetoStatus {
    Pendente,
    EmAndamento,
    Concluido,
    Cancelado,
}

impl ProjetoStatus {
    pub const ALL: [ProjetoStatus; 4] = [
        ProjetoStatus::Pendente,
        ProjetoStatus::EmAndamento,
        ProjetoStatus::Concluido,
        ProjetoStatus::Cancelado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjetoStatus::Pendente => "pendente",
            ProjetoStatus::EmAndamento => "em_andamento",
            ProjetoStatus::Concluido => "concluido",
            ProjetoStatus::Cancelado => "cancelado",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Projeto {
    pub id: i64,
    pub nome: String,
    pub descricao: Option<String>,
    pub cliente_id: Option<i64>,
    pub cliente_nome: Option<String>,
    pub endereco: Option<String>,
    pub status: String,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    // Receita contratada
    pub valor_total: f64,
    pub criado_em: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProjetoPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub descricao: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub cliente_id: Option<i64>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub endereco: Option<String>,

    pub status: ProjetoStatus,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(custom(function = "validate_date"))]
    pub data_inicio: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(custom(function = "validate_date"))]
    pub data_fim: Option<String>,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(custom(function = "validate_not_negative"))]
    pub valor_total: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GastoCategoria {
    Material,
    Ferramenta,
    Transporte,
    Alimentacao,
    Outros,
}

impl GastoCategoria {
    pub fn as_str(&self) -> &'static str {
        match self {
            GastoCategoria::Material => "material",
            GastoCategoria::Ferramenta => "ferramenta",
            GastoCategoria::Transporte => "transporte",
            GastoCategoria::Alimentacao => "alimentacao",
            GastoCategoria::Outros => "outros",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Gasto {
    pub id: i64,
    pub projeto_id: i64,
    pub categoria: String,
    pub descricao: String,
    pub valor: f64,
    pub data: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GastoPayload {
    pub categoria: GastoCategoria,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(range(exclusive_min = 0.0, message = "O valor deve ser maior que zero."))]
    pub valor: f64,

    #[validate(custom(function = "validate_date"))]
    pub data: String,
}

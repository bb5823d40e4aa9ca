// src/models/funcionario.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    common::form::{blank_as_none, checkbox, number_or_zero, validate_date, validate_not_negative},
    db::Flag,
};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Funcionario {
    pub id: i64,
    pub nome: String,
    pub funcao: Option<String>,
    pub telefone: Option<String>,
    pub valor_diaria: f64,
    pub valor_hora_extra: f64,
    // Valor de referência para empreitadas
    pub valor_empreitada: f64,
    #[sqlx(try_from = "i64")]
    pub ativo: Flag,
    pub criado_em: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FuncionarioPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub funcao: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub telefone: Option<String>,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(custom(function = "validate_not_negative"))]
    pub valor_diaria: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(custom(function = "validate_not_negative"))]
    pub valor_hora_extra: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(custom(function = "validate_not_negative"))]
    pub valor_empreitada: f64,

    #[serde(default, deserialize_with = "checkbox")]
    pub ativo: bool,
}

/// Um dia (ou vários) de trabalho num projeto, ou uma empreitada de valor fechado.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Trabalho {
    pub id: i64,
    pub funcionario_id: i64,
    pub projeto_id: i64,
    pub data: String,
    pub dias_trabalhados: f64,
    pub horas_extras: f64,
    #[sqlx(try_from = "i64")]
    pub empreitada: Flag,
    pub valor_empreitada: f64,
    pub descricao: Option<String>,
    pub projeto_nome: Option<String>,
    pub funcionario_nome: Option<String>,
    // Custo calculado com as taxas atuais do funcionário
    pub valor: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TrabalhoPayload {
    pub projeto_id: i64,

    #[validate(custom(function = "validate_date"))]
    pub data: String,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(custom(function = "validate_not_negative"))]
    pub dias_trabalhados: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(custom(function = "validate_not_negative"))]
    pub horas_extras: f64,

    #[serde(default, deserialize_with = "checkbox")]
    pub empreitada: bool,

    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(custom(function = "validate_not_negative"))]
    pub valor_empreitada: f64,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub descricao: Option<String>,
}

impl TrabalhoPayload {
    /// Empreitada exige valor; diária exige dias ou horas.
    pub fn validate_consistency(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = validator::ValidationErrors::new();
        if self.empreitada && self.valor_empreitada <= 0.0 {
            let mut err = validator::ValidationError::new("empreitada");
            err.message = Some("Informe o valor da empreitada.".into());
            errors.add("valor_empreitada", err);
        }
        if !self.empreitada && self.dias_trabalhados <= 0.0 && self.horas_extras <= 0.0 {
            let mut err = validator::ValidationError::new("dias");
            err.message = Some("Informe dias trabalhados ou horas extras.".into());
            errors.add("dias_trabalhados", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Adiantamento {
    pub id: i64,
    pub funcionario_id: i64,
    pub valor: f64,
    pub data: String,
    pub descricao: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdiantamentoPayload {
    #[serde(default, deserialize_with = "number_or_zero")]
    #[validate(range(exclusive_min = 0.0, message = "O valor deve ser maior que zero."))]
    pub valor: f64,

    #[validate(custom(function = "validate_date"))]
    pub data: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub descricao: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trabalho(empreitada: bool, dias: f64, valor: f64) -> TrabalhoPayload {
        TrabalhoPayload {
            projeto_id: 1,
            data: "2024-03-01".into(),
            dias_trabalhados: dias,
            horas_extras: 0.0,
            empreitada,
            valor_empreitada: valor,
            descricao: None,
        }
    }

    #[test]
    fn contract_work_needs_an_amount() {
        assert!(trabalho(true, 0.0, 0.0).validate_consistency().is_err());
        assert!(trabalho(true, 0.0, 1200.0).validate_consistency().is_ok());
    }

    #[test]
    fn day_work_needs_days_or_overtime() {
        assert!(trabalho(false, 0.0, 0.0).validate_consistency().is_err());
        assert!(trabalho(false, 1.0, 0.0).validate_consistency().is_ok());
    }
}

// src/models/cliente.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cliente {
    pub id: i64,
    pub nome: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub documento: Option<String>, // CPF ou CNPJ
    pub endereco: Option<String>,
    pub observacoes: Option<String>,
    pub criado_em: String,
}

// Usado tanto na criação quanto na edição
#[derive(Debug, Deserialize, Validate)]
pub struct ClientePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,

    #[serde(default, deserialize_with = "crate::common::form::blank_as_none")]
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "crate::common::form::blank_as_none")]
    pub telefone: Option<String>,
    #[serde(default, deserialize_with = "crate::common::form::blank_as_none")]
    pub documento: Option<String>,
    #[serde(default, deserialize_with = "crate::common::form::blank_as_none")]
    pub endereco: Option<String>,
    #[serde(default, deserialize_with = "crate::common::form::blank_as_none")]
    pub observacoes: Option<String>,
}

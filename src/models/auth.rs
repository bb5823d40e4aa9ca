// src/models/auth.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const PAPEL_ADMIN: &str = "admin";
pub const PAPEL_USUARIO: &str = "usuario";

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Usuario {
    pub id: i64,
    pub nome: String,
    pub email: String,

    #[serde(skip_serializing)] // nunca vai para o template
    pub senha_hash: String,

    pub papel: String,
    pub criado_em: String,
}

impl Usuario {
    pub fn is_admin(&self) -> bool {
        self.papel == PAPEL_ADMIN
    }
}

// Formulário de login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "Informe a senha."))]
    pub senha: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Papel {
    Admin,
    Usuario,
}

impl Papel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Papel::Admin => PAPEL_ADMIN,
            Papel::Usuario => PAPEL_USUARIO,
        }
    }
}

// Cadastro de usuário (somente administradores)
#[derive(Debug, Deserialize, Validate)]
pub struct NovoUsuarioPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,
    pub papel: Papel,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,   // ID do usuário
    pub exp: usize, // quando o token expira
    pub iat: usize, // quando o token foi criado
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{services::llm::LlmError, views};

// Tipo de erro único da aplicação. Vira página HTML de erro; as rotas JSON
// convertem para `ApiError`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Dados inválidos: {0}")]
    InvalidInput(String),

    #[error("E-mail ou senha inválidos")]
    InvalidCredentials,

    #[error("Sessão ausente ou expirada")]
    NotAuthenticated,

    #[error("Acesso restrito a administradores")]
    Forbidden,

    #[error("{0} não encontrado")]
    NotFound(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de template: {0}")]
    TemplateError(#[from] handlebars::RenderError),

    #[error("Assistente de IA não configurado")]
    LlmNotConfigured,

    #[error("Falha na IA: {0}")]
    LlmError(#[from] LlmError),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro ao gerar PDF: {0}")]
    PdfError(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation("registro já cadastrado".into());
            }
            if db_err.is_foreign_key_violation() {
                return AppError::InvalidInput("registro relacionado inexistente".into());
            }
            if db_err.is_check_violation() {
                return AppError::InvalidInput("valor fora das opções permitidas".into());
            }
        }
        AppError::DatabaseError(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::LlmNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::LlmError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensagem que pode ser mostrada ao usuário. Erros internos ficam genéricos.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::InvalidCredentials
            | AppError::NotAuthenticated
            | AppError::Forbidden
            | AppError::NotFound(_)
            | AppError::UniqueConstraintViolation(_)
            | AppError::LlmNotConfigured
            | AppError::LlmError(_) => self.to_string(),
            _ => "Ocorreu um erro inesperado.".to_string(),
        }
    }

    /// Mensagens por campo, apenas para erros de validação.
    pub fn details(&self) -> Vec<String> {
        match self {
            AppError::ValidationError(errors) => errors
                .field_errors()
                .iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| match &e.message {
                        Some(msg) => format!("{}: {}", field, msg),
                        None => format!("{}: inválido", field),
                    })
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        } else {
            tracing::debug!("Requisição rejeitada: {}", self);
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::NotAuthenticated) {
            return Redirect::to("/login").into_response();
        }

        self.log();
        let status = self.status();
        let body = views::error_page(status, &self.public_message(), &self.details());
        (status, body).into_response()
    }
}

/// Erro das rotas JSON.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Vec<String>>,
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        e.log();
        let details = e.details();
        ApiError {
            status: e.status(),
            error: e.public_message(),
            details: (!details.is_empty()).then_some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "O nome é obrigatório."))]
        nome: String,
    }

    #[test]
    fn validation_error_lists_field_messages() {
        let err: AppError = Payload { nome: String::new() }.validate().unwrap_err().into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details(), vec!["nome: O nome é obrigatório.".to_string()]);
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco vazou"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("senha"));
    }

    #[test]
    fn not_authenticated_redirects_to_login() {
        let response = AppError::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[test]
    fn api_error_keeps_status() {
        let api: ApiError = AppError::NotFound("Projeto".into()).into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Projeto não encontrado");
    }
}

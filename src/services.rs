pub mod auth;
pub mod document_service;
pub mod ia_service;
pub mod llm;
pub mod relatorio_service;

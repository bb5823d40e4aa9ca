pub mod auth;
pub mod cliente;
pub mod funcionario;
pub mod ia;
pub mod orcamento;
pub mod projeto;
pub mod relatorio;

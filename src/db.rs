pub mod adapter;
pub use adapter::{flag_column, Database, Flag, Param};
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
pub mod cliente_repo;
pub use cliente_repo::ClienteRepository;
pub mod funcionario_repo;
pub use funcionario_repo::FuncionarioRepository;
pub mod projeto_repo;
pub use projeto_repo::ProjetoRepository;
pub mod orcamento_repo;
pub use orcamento_repo::OrcamentoRepository;
pub mod relatorio_repo;
pub use relatorio_repo::RelatorioRepository;

// src/config.rs

use std::{env, sync::Arc};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{
    db::{
        ClienteRepository, Database, FuncionarioRepository, OrcamentoRepository,
        ProjetoRepository, RelatorioRepository, UsuarioRepository,
    },
    services::{
        auth::AuthService,
        document_service::DocumentService,
        ia_service::IaService,
        llm::{LlmClient, OpenAiClient},
        relatorio_service::RelatorioService,
    },
};

const DEV_JWT_SECRET: &str = "empreiteiro-dev-jwt-secret";

/// Parte da configuração que decide qual banco usar.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub production: bool,
    pub database_url: Option<String>,
    pub force_sqlite: bool,
    pub sqlite_path: String,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub database: DatabaseSettings,
    pub jwt_secret: String,
    pub session_secret: Option<String>,
    pub llm: LlmSettings,
    pub fonts_dir: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag(name: &str) -> bool {
    var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "sim" | "yes"))
        .unwrap_or(false)
}

impl Settings {
    /// Lê as variáveis de ambiente (o `.env` já deve ter sido carregado).
    pub fn from_env() -> anyhow::Result<Self> {
        let production = var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if production => anyhow::bail!("JWT_SECRET deve ser definido em produção"),
            None => {
                tracing::warn!("JWT_SECRET não definido, usando segredo de desenvolvimento");
                DEV_JWT_SECRET.to_string()
            }
        };

        let port = match var("PORT") {
            Some(p) => p.parse()?,
            None => 3000,
        };

        Ok(Self {
            port,
            database: DatabaseSettings {
                production,
                database_url: var("DATABASE_URL"),
                force_sqlite: flag("USE_SQLITE"),
                sqlite_path: var("SQLITE_PATH").unwrap_or_else(|| "./data/empreiteiro.db".into()),
            },
            jwt_secret,
            session_secret: var("SESSION_SECRET"),
            llm: LlmSettings {
                api_key: var("LLM_API_KEY").or_else(|| var("OPENAI_API_KEY")),
                api_url: var("LLM_API_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".into()),
                model: var("LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
            },
            fonts_dir: var("FONTS_DIR").unwrap_or_else(|| "./fonts".into()),
            admin_email: var("ADMIN_EMAIL"),
            admin_password: var("ADMIN_PASSWORD"),
        })
    }

    fn cookie_key(&self) -> anyhow::Result<Key> {
        match &self.session_secret {
            Some(secret) if secret.len() >= 32 => Ok(Key::derive_from(secret.as_bytes())),
            Some(_) => anyhow::bail!("SESSION_SECRET precisa ter pelo menos 32 caracteres"),
            None => {
                tracing::warn!("SESSION_SECRET não definido, sessões não sobrevivem a reinícios");
                Ok(Key::generate())
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Arc<Settings>,
    pub cookie_key: Key,

    pub auth_service: AuthService,
    pub relatorio_service: RelatorioService,
    pub ia_service: IaService,
    pub document_service: DocumentService,

    pub clientes: ClienteRepository,
    pub funcionarios: FuncionarioRepository,
    pub projetos: ProjetoRepository,
    pub orcamentos: OrcamentoRepository,
    pub usuarios: UsuarioRepository,
}

// Necessário para o SignedCookieJar
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database).await?;

        let llm: Option<Arc<dyn LlmClient>> = settings.llm.api_key.clone().map(|key| {
            Arc::new(OpenAiClient::new(key, &settings.llm.api_url, &settings.llm.model))
                as Arc<dyn LlmClient>
        });

        Self::build(db, settings, llm)
    }

    /// Monta o gráfico de dependências a partir de um banco já conectado.
    pub fn build(
        db: Database,
        settings: Settings,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> anyhow::Result<Self> {
        let cookie_key = settings.cookie_key()?;

        let usuarios = UsuarioRepository::new(db.clone());
        let relatorio_repo = RelatorioRepository::new(db.clone());

        let auth_service = AuthService::new(usuarios.clone(), settings.jwt_secret.clone());
        let relatorio_service = RelatorioService::new(relatorio_repo);
        let ia_service = IaService::new(relatorio_service.clone(), llm);
        let orcamentos = OrcamentoRepository::new(db.clone());
        let document_service = DocumentService::new(orcamentos.clone(), settings.fonts_dir.clone());

        Ok(Self {
            clientes: ClienteRepository::new(db.clone()),
            funcionarios: FuncionarioRepository::new(db.clone()),
            projetos: ProjetoRepository::new(db.clone()),
            orcamentos,
            usuarios,
            auth_service,
            relatorio_service,
            ia_service,
            document_service,
            cookie_key,
            settings: Arc::new(settings),
            db,
        })
    }
}

#[cfg(test)]
impl Settings {
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            database: DatabaseSettings {
                production: false,
                database_url: None,
                force_sqlite: true,
                sqlite_path: ":memory:".into(),
            },
            jwt_secret: "segredo-de-teste".into(),
            session_secret: Some("uma-chave-de-sessao-de-teste-com-mais-de-32-bytes".into()),
            llm: LlmSettings {
                api_key: None,
                api_url: "http://127.0.0.1:1/v1/chat/completions".into(),
                model: "teste".into(),
            },
            fonts_dir: "./fonts".into(),
            admin_email: None,
            admin_password: None,
        }
    }
}

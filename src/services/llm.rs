// src/services/llm.rs
//
// Cliente de modelo de linguagem (API compatível com OpenAI chat completions).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Erros do cliente LLM
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("erro da API ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("limite de requisições excedido")]
    RateLimitError,

    #[error("resposta em formato inesperado: {0}")]
    ParseError(String),

    #[error("erro de rede: {0}")]
    NetworkError(String),
}

/// Interface que qualquer provedor de LLM implementa.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Envia um prompt de sistema e uma mensagem de usuário; devolve o texto gerado.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Cliente para OpenAI API (ou qualquer endpoint compatível)
pub struct OpenAiClient {
    api_key: String,
    api_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, api_url: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            api_key,
            api_url: api_url.into(),
            model: model.into(),
            client,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: 0.3,
            max_tokens: 1200,
        };

        tracing::debug!("🤖 Chamando LLM {} ({})", self.model, self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitError);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status: status.as_u16(), body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::ParseError("nenhuma resposta em `choices`".into()))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Devolve uma resposta fixa e guarda o último prompt recebido.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockLlmClient {
    pub resposta: String,
    pub ultimo_prompt: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MockLlmClient {
    pub fn new(resposta: &str) -> Self {
        Self {
            resposta: resposta.into(),
            ..Default::default()
        }
    }

    pub fn prompt(&self) -> Option<String> {
        self.ultimo_prompt.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, LlmError> {
        *self.ultimo_prompt.lock().unwrap() = Some(user.to_string());
        Ok(self.resposta.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_chat_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage { role: "system", content: "s" },
                ChatMessage { role: "user", content: "u" },
            ],
            temperature: 0.3,
            max_tokens: 10,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn response_body_is_parsed() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#,
        )
        .unwrap();
        assert_eq!(chat.choices[0].message.content.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let client = OpenAiClient::new("chave".into(), "http://127.0.0.1:1/v1/chat/completions", "m");
        let err = client.complete("s", "u").await.unwrap_err();
        assert!(matches!(err, LlmError::NetworkError(_)));
    }
}

pub mod ollama;
pub mod openai;
pub mod openrouter;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use super::{ LlmConfig, LlmError, LlmType };
use self::ollama::OllamaClient;
use self::openai::OpenAIChatClient;
use self::openrouter::OpenRouterChatClient;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// A hosted text-generation API: model + prompt in, generated text out.
///
/// The whole call is awaited as one unit. Implementations do not retry and
/// do not impose a timeout.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, LlmError>;

    fn get_model(&self) -> String;

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::OpenRouter => Arc::new(OpenRouterChatClient::from_config(config)?),
        LlmType::OpenAI => Arc::new(OpenAIChatClient::from_config(config)?),
        LlmType::Ollama => Arc::new(OllamaClient::from_config(config)?),
    };
    Ok(client)
}

/// Reads the body of a non-success response so the provider's own error text
/// reaches the caller.
pub(crate) async fn error_for_status(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Status { status, body })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openrouter_requires_api_key() {
        let config = LlmConfig::default();
        let err = new_client(&config).err().unwrap();
        assert!(matches!(err, LlmError::MissingApiKey { provider: LlmType::OpenRouter }));
    }

    #[test]
    fn openrouter_defaults_to_gpt5() {
        let config = LlmConfig {
            api_key: Some("sk-or-test".into()),
            ..LlmConfig::default()
        };
        let client = new_client(&config).unwrap();
        assert_eq!(client.get_model(), "openai/gpt-5");
        assert_eq!(client.get_base_url().as_deref(), Some("https://openrouter.ai/api/v1"));
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = LlmConfig {
            llm_type: LlmType::Ollama,
            completion_model: Some("mistral".into()),
            ..LlmConfig::default()
        };
        let client = new_client(&config).unwrap();
        assert_eq!(client.get_model(), "mistral");
    }
}

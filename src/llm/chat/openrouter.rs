use async_trait::async_trait;
use reqwest::header::{ HeaderMap, HeaderValue };

use super::openai::OpenAIChatClient;
use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, LlmError, LlmType };

pub const DEFAULT_MODEL: &str = "openai/gpt-5";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const APP_TITLE: &str = "gpt-relay-chat";

/// OpenRouter speaks the OpenAI chat-completions dialect; this wraps the
/// OpenAI client with OpenRouter's defaults and attribution header.
pub struct OpenRouterChatClient {
    inner: OpenAIChatClient,
}

impl OpenRouterChatClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Title", HeaderValue::from_static(APP_TITLE));

        let inner = OpenAIChatClient::with_headers(
            LlmType::OpenRouter,
            api_key,
            model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            headers
        )?;
        Ok(Self { inner })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey { provider: LlmType::OpenRouter })?;

        Self::new(api_key, config.completion_model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for OpenRouterChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, LlmError> {
        self.inner.complete(prompt).await
    }

    fn get_model(&self) -> String {
        self.inner.get_model()
    }

    fn get_base_url(&self) -> Option<String> {
        self.inner.get_base_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::test_support::{ spawn_provider, take };
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn asks_for_gpt5_with_attribution() {
        let reply = json!({ "choices": [{ "message": { "content": "hello" } }] });
        let (url, seen) = spawn_provider("/api/v1/chat/completions", StatusCode::OK, reply).await;
        let client = OpenRouterChatClient::new("sk-or-test".into(), None, Some(format!("{}/api/v1", url))).unwrap();

        assert_eq!(client.complete("Human: hi\n\nAssistant:").await.unwrap().response, "hello");

        let req = take(&seen);
        assert_eq!(req.body["model"], DEFAULT_MODEL);
        assert_eq!(req.title.as_deref(), Some(APP_TITLE));
        assert_eq!(req.authorization.as_deref(), Some("Bearer sk-or-test"));
    }

    #[tokio::test]
    async fn empty_choices_names_openrouter() {
        let (url, _) = spawn_provider("/chat/completions", StatusCode::OK, json!({ "choices": [] })).await;
        let client = OpenRouterChatClient::new("k".into(), None, Some(url)).unwrap();
        let err = client.complete("q").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse(LlmType::OpenRouter)));
    }
}

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use thiserror::Error;

use crate::models::chat::{ ChatRequest, ChatResponse };
use crate::server::api::CHAT_ROUTE;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Where a chat session sends its messages.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;
}

/// Talks to the chat route of a running server.
pub struct HttpChatBackend {
    http: HttpClient,
    endpoint: String,
}

impl HttpChatBackend {
    pub fn new(server_url: &str) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), CHAT_ROUTE),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let resp = self.http.post(&self.endpoint).json(request).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status(resp.status().as_u16()));
        }
        Ok(resp.json::<ChatResponse>().await?)
    }
}

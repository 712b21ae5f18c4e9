use crate::cli::RunMode;
use crate::history::build_prompt;
use crate::llm::chat::ChatClient;
use crate::models::chat::{ ChatResponse, ErrorBody, HistoryEntry };
use crate::server::frontend;
use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{ Html, IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tower_http::cors::{ Any, CorsLayer };
use log::{ debug, error, info, warn };

pub const CHAT_ROUTE: &str = "/api/claude-chat";
pub const CLIENT_LOG_ROUTE: &str = "/api/client-log";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Message is required")]
    MissingMessage,
    #[error("Invalid request body")]
    InvalidBody(String),
    #[error("Invalid conversation history")]
    InvalidHistory(String),
    #[error("Failed to generate response")]
    Generation(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::MissingMessage => None,
            | ApiError::InvalidBody(d)
            | ApiError::InvalidHistory(d)
            | ApiError::Generation(d) => Some(d.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Wire shape before validation; fields stay loose so the message check
/// runs before history entries are typed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingChat {
    #[serde(default)]
    message: Option<JsonValue>,
    #[serde(default)]
    conversation_history: Option<JsonValue>,
}

#[derive(Deserialize)]
struct ClientLogEntry {
    #[serde(default)]
    level: Option<String>,
    message: String,
}

#[derive(Clone)]
pub struct AppState {
    client: Arc<dyn ChatClient>,
    mode: RunMode,
    index_html: Arc<String>,
}

impl AppState {
    pub fn new(client: Arc<dyn ChatClient>, mode: RunMode, assistant_name: String) -> Self {
        let index_html = Arc::new(frontend::render_index(&assistant_name, mode.is_development()));
        Self { client, mode, index_html }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let mut app: Router<AppState> = Router::new().route(CHAT_ROUTE, post(chat_handler));
    if state.mode.is_development() {
        app = app.route(CLIENT_LOG_ROUTE, post(client_log_handler));
    }

    app.fallback(index_handler).layer(cors).with_state(state)
}

fn parse_history(raw: Option<JsonValue>) -> Result<Vec<HistoryEntry>, ApiError> {
    let entries = match raw {
        None | Some(JsonValue::Null) => {
            return Ok(Vec::new());
        }
        Some(JsonValue::Array(entries)) => entries,
        Some(other) => {
            return Err(ApiError::InvalidHistory(format!("expected an array, got {}", json_kind(&other))));
        }
    };
    entries
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json
                ::from_value::<HistoryEntry>(value)
                .map_err(|e| ApiError::InvalidHistory(format!("entry {}: {}", i, e)))
        })
        .collect()
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes
) -> Result<Json<ChatResponse>, ApiError> {
    let incoming: IncomingChat = serde_json
        ::from_slice(&body)
        .map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let message = match incoming.message {
        Some(JsonValue::String(s)) if !s.is_empty() => s,
        _ => {
            return Err(ApiError::MissingMessage);
        }
    };
    let history = parse_history(incoming.conversation_history)?;

    info!("Chat request: {} chars, {} history entries", message.len(), history.len());
    let prompt = build_prompt(&history, &message);
    debug!("Prompt for {}:\n{}", state.client.get_model(), prompt);

    match state.client.complete(&prompt).await {
        Ok(completion) => Ok(Json(ChatResponse::now(completion.response))),
        Err(e) => {
            error!("Completion provider error: {}", e);
            let details = e.to_string();
            let details = if details.is_empty() { "Unknown error".to_string() } else { details };
            Err(ApiError::Generation(details))
        }
    }
}

async fn client_log_handler(Json(entry): Json<ClientLogEntry>) -> StatusCode {
    match entry.level.as_deref().unwrap_or("log") {
        "error" => error!(target: "browser", "{}", entry.message),
        "warn" => warn!(target: "browser", "{}", entry.message),
        _ => info!(target: "browser", "{}", entry.message),
    }
    StatusCode::NO_CONTENT
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.index_html.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::CompletionResponse;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use axum::body::{ self, Body };
    use axum::http::{ header, Method, Request };
    use chrono::DateTime;
    use serde_json::json;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct StubClient {
        reply: Result<String, String>,
        last_prompt: Mutex<Option<String>>,
    }

    impl StubClient {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(text.to_string()), last_prompt: Mutex::new(None) })
        }

        fn failing(msg: &str) -> Arc<Self> {
            Arc::new(Self { reply: Err(msg.to_string()), last_prompt: Mutex::new(None) })
        }

        fn prompt(&self) -> Option<String> {
            self.last_prompt.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for StubClient {
        async fn complete(&self, prompt: &str) -> Result<CompletionResponse, LlmError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(CompletionResponse { response: text.clone() }),
                Err(msg) => Err(LlmError::Other(msg.clone())),
            }
        }

        fn get_model(&self) -> String {
            "stub".to_string()
        }
    }

    fn app(client: Arc<StubClient>, mode: RunMode) -> Router {
        router(AppState::new(client, mode, "GPT-5".to_string()))
    }

    async fn post_json(router: Router, uri: &str, payload: JsonValue) -> (StatusCode, JsonValue) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap()
            ).await
            .unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { JsonValue::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let client = StubClient::ok("unused");
        let (status, body) = post_json(app(client.clone(), RunMode::Production), CHAT_ROUTE, json!({ "message": "" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Message is required" }));
        assert!(client.prompt().is_none());
    }

    #[tokio::test]
    async fn missing_message_is_rejected() {
        let (status, body) = post_json(
            app(StubClient::ok("unused"), RunMode::Production),
            CHAT_ROUTE,
            json!({ "conversationHistory": [] })
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");
    }

    #[tokio::test]
    async fn returns_completion_with_timestamp() {
        let client = StubClient::ok("hello");
        let (status, body) = post_json(
            app(client.clone(), RunMode::Production),
            CHAT_ROUTE,
            json!({ "message": "hi", "conversationHistory": [] })
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "hello");
        let ts = body["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(client.prompt().as_deref(), Some("Human: hi\n\nAssistant:"));
    }

    #[tokio::test]
    async fn missing_history_is_treated_as_empty() {
        let client = StubClient::ok("hello");
        let (status, _) = post_json(app(client.clone(), RunMode::Production), CHAT_ROUTE, json!({ "message": "hi" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(client.prompt().as_deref(), Some("Human: hi\n\nAssistant:"));
    }

    #[tokio::test]
    async fn history_is_truncated_to_last_five() {
        let history: Vec<JsonValue> = (1..=7)
            .map(|i| {
                let role = if i % 2 == 1 { "user" } else { "assistant" };
                json!({ "id": i.to_string(), "role": role, "content": format!("m{}", i) })
            })
            .collect();
        let client = StubClient::ok("ok");
        let (status, _) = post_json(
            app(client.clone(), RunMode::Production),
            CHAT_ROUTE,
            json!({ "message": "next", "conversationHistory": history })
        ).await;
        assert_eq!(status, StatusCode::OK);

        let prompt = client.prompt().unwrap();
        let context = prompt
            .strip_prefix("Previous conversation:\n")
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap();
        let lines: Vec<_> = context.lines().collect();
        assert_eq!(lines, vec!["Human: m3", "Assistant: m4", "Human: m5", "Assistant: m6", "Human: m7"]);
        assert!(!context.contains("m1") && !context.contains("m2"));
        assert!(prompt.ends_with("Human: next\n\nAssistant:"));
    }

    #[tokio::test]
    async fn provider_failure_maps_to_500() {
        let (status, body) = post_json(
            app(StubClient::failing("upstream exploded"), RunMode::Production),
            CHAT_ROUTE,
            json!({ "message": "hi", "conversationHistory": [] })
        ).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to generate response", "details": "upstream exploded" }));
    }

    #[tokio::test]
    async fn empty_provider_error_reports_unknown() {
        let (status, body) = post_json(
            app(StubClient::failing(""), RunMode::Production),
            CHAT_ROUTE,
            json!({ "message": "hi" })
        ).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "Unknown error");
    }

    #[tokio::test]
    async fn malformed_history_entry_is_rejected() {
        let client = StubClient::ok("unused");
        let (status, body) = post_json(
            app(client.clone(), RunMode::Production),
            CHAT_ROUTE,
            json!({ "message": "hi", "conversationHistory": [{ "role": "robot", "content": "x" }] })
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid conversation history");
        assert!(body["details"].as_str().unwrap().starts_with("entry 0:"));
        assert!(client.prompt().is_none());
    }

    #[tokio::test]
    async fn message_check_runs_before_history_shape() {
        for history in [json!("oops"), json!({}), json!(5)] {
            let (status, body) = post_json(
                app(StubClient::ok("unused"), RunMode::Production),
                CHAT_ROUTE,
                json!({ "message": "", "conversationHistory": history })
            ).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Message is required" }));
        }
    }

    #[tokio::test]
    async fn non_array_history_is_rejected() {
        let client = StubClient::ok("unused");
        let (status, body) = post_json(
            app(client.clone(), RunMode::Production),
            CHAT_ROUTE,
            json!({ "message": "hi", "conversationHistory": { "role": "user" } })
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid conversation history");
        assert_eq!(body["details"], "expected an array, got an object");
        assert!(client.prompt().is_none());
    }

    #[tokio::test]
    async fn null_history_is_treated_as_empty() {
        let client = StubClient::ok("hello");
        let (status, _) = post_json(
            app(client.clone(), RunMode::Production),
            CHAT_ROUTE,
            json!({ "message": "hi", "conversationHistory": null })
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(client.prompt().as_deref(), Some("Human: hi\n\nAssistant:"));
    }

    #[tokio::test]
    async fn non_json_body_is_rejected() {
        let response = app(StubClient::ok("unused"), RunMode::Production)
            .oneshot(Request::post(CHAT_ROUTE).body(Body::from("not json")).unwrap()).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn unmatched_paths_serve_the_shell() {
        let response = app(StubClient::ok("unused"), RunMode::Production)
            .oneshot(Request::get("/some/deep/link").body(Body::empty()).unwrap()).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains(CHAT_ROUTE));
    }

    #[tokio::test]
    async fn client_log_only_in_development() {
        let entry = json!({ "level": "error", "message": "boom" });
        let (status, _) = post_json(app(StubClient::ok("x"), RunMode::Development), CLIENT_LOG_ROUTE, entry.clone()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let response = app(StubClient::ok("x"), RunMode::Production)
            .oneshot(
                Request::post(CLIENT_LOG_ROUTE)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(entry.to_string()))
                    .unwrap()
            ).await
            .unwrap();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
    }
}

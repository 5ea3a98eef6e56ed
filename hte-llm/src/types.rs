use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: f32,
    pub json_mode: bool,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages, model: None, temperature: 0.3, json_mode: false, max_tokens: None }
    }

    #[must_use]
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of a `chat` call. Per the LLM client's error-surface contract: a
/// retryable error that exhausts all retries is reported via `error`
/// (`content` empty, `finish_reason == "error"`) rather than propagated;
/// only unrecoverable errors (config, non-retryable HTTP status) return
/// `Err` from `LlmClient::chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: Usage,
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self { content: String::new(), finish_reason: "error".into(), usage: Usage::default(), error: Some(message.into()) }
    }

    /// Parse `content` as JSON (the caller must have requested JSON mode
    /// for this to be meaningful). On parse failure, returns the sentinel
    /// `{"raw": content}` rather than propagating an error — callers must
    /// tolerate both shapes.
    #[must_use]
    pub fn parsed_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.content).unwrap_or_else(|_| serde_json::json!({ "raw": self.content }))
    }
}

use crate::config::LlmConfig;
use crate::retry::{self, RetryConfig};
use crate::types::{ChatMessage, ChatRequest, ChatResponse, Usage};
use async_trait::async_trait;
use hte_core::HteError;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Narrow LLM interface: bounded-concurrency chat calls plus a thin
/// translation wrapper and an embedding call. Implemented by the real
/// OpenAI-compatible HTTP client and by `StubLlmClient` for deterministic
/// tests, so every layer agent depends only on this trait.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, HteError>;

    async fn translate(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
        style_note: Option<&str>,
    ) -> Result<ChatResponse, HteError> {
        let mut system = format!("Translate from {source_lang} to {target_lang}.");
        if let Some(note) = style_note {
            system.push(' ');
            system.push_str(note);
        }
        let request =
            ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(source_text.to_string())]);
        self.chat(request).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, HteError>;
}

pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
    semaphore: Arc<Semaphore>,
    retry_config: RetryConfig,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(config: LlmConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        let retry_config = RetryConfig::default().with_max_retries(config.max_retries);
        let http = reqwest::Client::builder().build().expect("reqwest client should build");
        Self { http, config, semaphore, retry_config }
    }

    async fn do_chat(&self, request: &ChatRequest) -> Result<ChatResponse, HteError> {
        let model = request.model.clone().unwrap_or_else(|| self.config.model.clone());
        let mut body = serde_json::json!({
            "model": model,
            "messages": request.messages,
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if request.json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HteError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HteError::Llm(format!("HTTP {} {}", status.as_u16(), text)));
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|e| HteError::Llm(format!("invalid response body: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| HteError::Llm("provider returned no choices".to_string()))?;

        let usage = parsed
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(ChatResponse {
            content: choice.message.content,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            usage,
            error: None,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, HteError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| HteError::Logic("LLM concurrency semaphore closed".to_string()))?;

        let call = || async { self.do_chat(&request).await };
        let outcome = tokio::time::timeout(
            self.config.timeout,
            retry::execute_with_retry(&self.retry_config, retry::is_retryable_llm_error, |_attempt| call()),
        )
        .await;

        match outcome {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(error)) if retry::is_retryable_llm_error(&error) => {
                hte_telemetry::warn!(error = %error, "LLM call exhausted retries; returning degraded response");
                Ok(ChatResponse::error(error.to_string()))
            }
            Ok(Err(error)) => Err(error),
            Err(_elapsed) => {
                hte_telemetry::warn!(timeout_secs = self.config.timeout.as_secs(), "LLM call timed out");
                Ok(ChatResponse::error("LLM call timed out"))
            }
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, HteError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| HteError::Logic("LLM concurrency semaphore closed".to_string()))?;

        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let body = serde_json::json!({ "model": self.config.embed_model, "input": text });
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HteError::Llm(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(HteError::Llm(format!("HTTP {} {}", status.as_u16(), text)));
        }

        let parsed: EmbeddingResponse =
            response.json().await.map_err(|e| HteError::Llm(format!("invalid embedding response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| HteError::Llm("embedding provider returned no data".to_string()))
    }
}

use crate::client::LlmClient;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use hte_core::HteError;
use std::sync::Mutex;

/// Deterministic LLM client for tests: returns responses from a queue
/// (consumed in order) or, once the queue is empty, falls back to a
/// default responder closure. Used to seed the end-to-end scenarios in
/// the testable-properties suite with stub behavior instead of a live
/// provider.
pub struct StubLlmClient {
    queue: Mutex<Vec<ChatResponse>>,
    default_response: ChatResponse,
}

impl StubLlmClient {
    #[must_use]
    pub fn new() -> Self {
        Self { queue: Mutex::new(Vec::new()), default_response: ChatResponse::default() }
    }

    #[must_use]
    pub fn with_default(default_response: ChatResponse) -> Self {
        Self { queue: Mutex::new(Vec::new()), default_response }
    }

    #[must_use]
    pub fn enqueue(self, response: ChatResponse) -> Self {
        self.queue.lock().unwrap().push(response);
        self
    }

    #[must_use]
    pub fn enqueue_json(self, value: serde_json::Value) -> Self {
        let response = ChatResponse { content: value.to_string(), finish_reason: "stop".into(), ..Default::default() };
        self.enqueue(response)
    }
}

impl Default for StubLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for StubLlmClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, HteError> {
        let mut queue = self.queue.lock().unwrap();
        if queue.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(queue.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, HteError> {
        let dim = 8usize;
        let mut vector = vec![0.0f32; dim];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % dim] += byte as f32;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt().max(1.0);
        Ok(vector.into_iter().map(|v| v / norm).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queue_is_served_in_order_then_falls_back_to_default() {
        let client = StubLlmClient::new()
            .enqueue(ChatResponse { content: "first".into(), ..Default::default() })
            .enqueue(ChatResponse { content: "second".into(), ..Default::default() });

        let r1 = client.chat(ChatRequest::new(vec![])).await.unwrap();
        let r2 = client.chat(ChatRequest::new(vec![])).await.unwrap();
        let r3 = client.chat(ChatRequest::new(vec![])).await.unwrap();

        assert_eq!(r1.content, "first");
        assert_eq!(r2.content, "second");
        assert_eq!(r3.content, "");
    }

    #[tokio::test]
    async fn embed_is_deterministic_for_same_input() {
        let client = StubLlmClient::new();
        let a = client.embed("合同").await.unwrap();
        let b = client.embed("合同").await.unwrap();
        assert_eq!(a, b);
    }
}

use crate::Triple;
use async_trait::async_trait;
use hte_telemetry::warn;

/// Out-of-process metric collaborator (BERTScore, COMET, GEMBA). An HTTP
/// implementation posts `{source, prediction, reference}` to a scoring
/// service and expects `{"score": f64}` back; a subprocess implementation
/// would shell out instead. Returns `None` when the service can't be
/// reached so callers can degrade rather than propagate an error.
#[async_trait]
pub trait ExternalMetricClient: Send + Sync {
    async fn score(&self, metric_name: &str, triple: &Triple) -> Option<f64>;
}

/// HTTP-backed client posting to a scoring microservice, one endpoint per
/// metric name (e.g. `{base_url}/bertscore`, `{base_url}/comet`,
/// `{base_url}/gemba`).
pub struct HttpMetricClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMetricClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[async_trait]
impl ExternalMetricClient for HttpMetricClient {
    async fn score(&self, metric_name: &str, triple: &Triple) -> Option<f64> {
        let url = format!("{}/{metric_name}", self.base_url);
        let response = match self.client.post(&url).json(triple).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(metric = metric_name, error = %e, "external metric service unreachable");
                return None;
            }
        };

        match response.json::<serde_json::Value>().await {
            Ok(body) => body["score"].as_f64(),
            Err(e) => {
                warn!(metric = metric_name, error = %e, "external metric response was not valid JSON");
                None
            }
        }
    }
}

/// Wraps an `ExternalMetricClient` as a `MetricBackend`, degrading to
/// `0.0` with a logged warning whenever the backing service errors or is
/// unreachable, mirroring a per-metric try/except-default-to-zero policy.
pub struct ExternalMetricBackend {
    metric_name: &'static str,
    client: std::sync::Arc<dyn ExternalMetricClient>,
}

impl ExternalMetricBackend {
    #[must_use]
    pub fn new(metric_name: &'static str, client: std::sync::Arc<dyn ExternalMetricClient>) -> Self {
        Self { metric_name, client }
    }
}

#[async_trait]
impl crate::backend::MetricBackend for ExternalMetricBackend {
    fn name(&self) -> &'static str {
        self.metric_name
    }

    async fn score(&self, triple: &Triple) -> f64 {
        match self.client.score(self.metric_name, triple).await {
            Some(score) => score,
            None => {
                warn!(metric = self.metric_name, "external metric unavailable, defaulting to 0.0");
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MetricBackend;
    use std::sync::Arc;

    struct AlwaysUnreachable;

    #[async_trait]
    impl ExternalMetricClient for AlwaysUnreachable {
        async fn score(&self, _metric_name: &str, _triple: &Triple) -> Option<f64> {
            None
        }
    }

    struct FixedScore(f64);

    #[async_trait]
    impl ExternalMetricClient for FixedScore {
        async fn score(&self, _metric_name: &str, _triple: &Triple) -> Option<f64> {
            Some(self.0)
        }
    }

    #[tokio::test]
    async fn degrades_to_zero_when_client_returns_none() {
        let backend = ExternalMetricBackend::new("comet", Arc::new(AlwaysUnreachable));
        let score = backend.score(&Triple::new("s", "p", "r")).await;
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn passes_through_client_score() {
        let backend = ExternalMetricBackend::new("comet", Arc::new(FixedScore(0.73)));
        let score = backend.score(&Triple::new("s", "p", "r")).await;
        assert!((score - 0.73).abs() < 1e-9);
    }
}

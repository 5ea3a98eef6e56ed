use crate::Triple;
use async_trait::async_trait;

/// A named scorer taking `{source, prediction, reference}` triples to a
/// `[0, 1]`-ish score. `score_batch` has a default sequential
/// implementation; backends that can batch cheaply (an HTTP call that
/// accepts arrays) should override it. Async so both purely local metrics
/// (BLEU, chrF++) and out-of-process ones (BERTScore, COMET, GEMBA) share
/// one interface.
#[async_trait]
pub trait MetricBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, triple: &Triple) -> f64;

    async fn score_batch(&self, triples: &[Triple]) -> Vec<f64> {
        let mut out = Vec::with_capacity(triples.len());
        for triple in triples {
            out.push(self.score(triple).await);
        }
        out
    }
}

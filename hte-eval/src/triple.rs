use serde::{Deserialize, Serialize};

/// A single scored unit: what was translated, what came out, and what it
/// should have looked like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triple {
    pub source: String,
    pub prediction: String,
    pub reference: String,
}

impl Triple {
    #[must_use]
    pub fn new(source: impl Into<String>, prediction: impl Into<String>, reference: impl Into<String>) -> Self {
        Self { source: source.into(), prediction: prediction.into(), reference: reference.into() }
    }
}

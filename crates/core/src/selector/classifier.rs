//! Optional classifier capability for corpus selection.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::CorpusConfig;
use crate::keywords::KeywordBundle;

/// Errors a classifier backend can produce.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier returned invalid output: {0}")]
    InvalidOutput(String),
}

/// Trait for model-backed corpus classification.
///
/// Output is a confidence per corpus id; the selector blends it with
/// the rule scores. Failure is tolerated and falls back to rules.
#[async_trait]
pub trait CorpusClassifier: Send + Sync {
    /// Classifier name for logging.
    fn name(&self) -> &str;

    /// Score each corpus for the bundle, higher means more relevant.
    async fn classify(
        &self,
        bundle: &KeywordBundle,
        corpora: &[CorpusConfig],
    ) -> Result<HashMap<String, f32>, ClassifierError>;
}

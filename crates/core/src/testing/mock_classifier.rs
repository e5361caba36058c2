//! Mock corpus classifier for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::CorpusConfig;
use crate::keywords::KeywordBundle;
use crate::selector::{ClassifierError, CorpusClassifier};

/// Mock implementation of the CorpusClassifier trait.
pub struct MockClassifier {
    scores: HashMap<String, f32>,
    fail: bool,
    /// Recorded bundles passed to classify.
    calls: Arc<RwLock<Vec<KeywordBundle>>>,
}

impl MockClassifier {
    /// A classifier that always returns the given scores.
    pub fn with_scores(scores: HashMap<String, f32>) -> Self {
        Self {
            scores,
            fail: false,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A classifier that always fails.
    pub fn failing() -> Self {
        Self {
            scores: HashMap::new(),
            fail: true,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of classify calls made.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl CorpusClassifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(
        &self,
        bundle: &KeywordBundle,
        _corpora: &[CorpusConfig],
    ) -> Result<HashMap<String, f32>, ClassifierError> {
        self.calls.write().await.push(bundle.clone());
        if self.fail {
            return Err(ClassifierError::Unavailable("mock failure".to_string()));
        }
        Ok(self.scores.clone())
    }
}

//! Mock keyword extractor for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::keywords::{ExtractionError, KeywordBundle, KeywordExtractor};

/// Mock implementation of the KeywordExtractor trait.
pub struct MockKeywordExtractor {
    bundle: Option<KeywordBundle>,
    /// Recorded raw queries.
    queries: Arc<RwLock<Vec<String>>>,
}

impl MockKeywordExtractor {
    /// An extractor that always returns the given bundle.
    pub fn with_bundle(bundle: KeywordBundle) -> Self {
        Self {
            bundle: Some(bundle),
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// An extractor that always fails.
    pub fn failing() -> Self {
        Self {
            bundle: None,
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Recorded queries, in call order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl KeywordExtractor for MockKeywordExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, query: &str) -> Result<KeywordBundle, ExtractionError> {
        self.queries.write().await.push(query.to_string());
        match &self.bundle {
            Some(bundle) => Ok(bundle.clone()),
            None => Err(ExtractionError::Unavailable("mock failure".to_string())),
        }
    }
}

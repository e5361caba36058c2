//! Keyword extraction: turning a free-form request into a keyword bundle.

mod fallback;
mod types;

pub use fallback::*;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during keyword extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Extraction backend unavailable: {0}")]
    Unavailable(String),

    #[error("No keywords extracted")]
    NoKeywords,
}

/// Trait for extracting search keywords from a user query.
///
/// Implementations can use heuristics or an external model.
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// Name of this extractor for logging.
    fn name(&self) -> &str;

    /// Extract an ordered keyword bundle from the query.
    ///
    /// Keywords are unique and ordered by importance.
    async fn extract(&self, query: &str) -> Result<KeywordBundle, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractionError::Unavailable("model offline".to_string());
        assert_eq!(
            err.to_string(),
            "Extraction backend unavailable: model offline"
        );

        let err = ExtractionError::NoKeywords;
        assert_eq!(err.to_string(), "No keywords extracted");
    }
}

//! Heuristic keyword extractor.
//!
//! Tokenizes the raw query, drops stop words, and infers intent from
//! term lookup tables. No model required - works entirely offline.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::keywords::{ExtractionError, KeywordBundle, KeywordExtractor, SearchIntent};

/// Configuration for the fallback extractor.
#[derive(Debug, Clone)]
pub struct FallbackExtractorConfig {
    /// Maximum number of keywords to keep.
    pub max_keywords: usize,
    /// Common stop words to filter out.
    pub stop_words: Vec<String>,
}

impl Default for FallbackExtractorConfig {
    fn default() -> Self {
        Self {
            max_keywords: 8,
            stop_words: vec![
                "the", "a", "an", "of", "for", "in", "on", "at", "to", "and", "or", "is", "are",
                "was", "were", "about", "with", "how", "what", "when", "where", "why", "does",
                "please", "me", "tell", "show", "find", "know", "want",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Heuristic keyword extractor used when no external extractor is wired
/// in, and as the recovery path when an injected one fails.
pub struct FallbackExtractor {
    config: FallbackExtractorConfig,
}

impl FallbackExtractor {
    pub fn new() -> Self {
        Self {
            config: FallbackExtractorConfig::default(),
        }
    }

    pub fn with_config(config: FallbackExtractorConfig) -> Self {
        Self { config }
    }

    /// Tokenize and filter: lowercase terms, stop words out, order kept.
    fn extract_keywords(&self, query: &str) -> Vec<String> {
        let stop_words: HashSet<_> = self
            .config
            .stop_words
            .iter()
            .map(|s| s.to_lowercase())
            .collect();

        let mut seen = HashSet::new();
        query
            .split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| s.len() > 1)
            .filter(|s| !stop_words.contains(s))
            .filter(|s| seen.insert(s.clone()))
            .take(self.config.max_keywords)
            .collect()
    }

    /// Infer intent from the raw query, first matching table wins.
    fn infer_intent(&self, query: &str) -> SearchIntent {
        let lower = query.to_lowercase();
        let tables: &[(SearchIntent, &[&str])] = &[
            (
                SearchIntent::BugInvestigation,
                &["bug", "error", "crash", "failure", "broken", "fix", "defect"],
            ),
            (
                SearchIntent::SpecConfirmation,
                &["spec", "specification", "requirement", "confirm", "defined"],
            ),
            (
                SearchIntent::ProgressCheck,
                &["progress", "status", "remaining", "schedule", "milestone"],
            ),
            (
                SearchIntent::DesignReview,
                &["design", "review", "architecture", "diagram"],
            ),
            (
                SearchIntent::FeatureUnderstanding,
                &["feature", "behavior", "usage", "works", "understand"],
            ),
        ];

        for (intent, terms) in tables {
            if terms.iter().any(|t| lower.contains(t)) {
                return *intent;
            }
        }
        SearchIntent::General
    }

    /// Estimate confidence based on input quality.
    fn estimate_confidence(&self, keywords: &[String], intent: SearchIntent) -> f32 {
        let mut confidence: f32 = 0.4; // Base confidence

        if keywords.len() >= 4 {
            confidence += 0.2;
        } else if keywords.len() >= 2 {
            confidence += 0.1;
        }

        if intent != SearchIntent::General {
            confidence += 0.1;
        }

        confidence.min(0.7) // Cap, heuristics are always uncertain
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeywordExtractor for FallbackExtractor {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn extract(&self, query: &str) -> Result<KeywordBundle, ExtractionError> {
        let keywords = self.extract_keywords(query);
        if keywords.is_empty() {
            return Err(ExtractionError::NoKeywords);
        }

        let intent = self.infer_intent(query);
        let confidence = self.estimate_confidence(&keywords, intent);

        Ok(KeywordBundle::new(keywords, intent, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_drops_stop_words() {
        let extractor = FallbackExtractor::new();
        let keywords = extractor.extract_keywords("how does the login error happen");
        assert_eq!(keywords, vec!["login", "error", "happen"]);
    }

    #[test]
    fn test_extract_keywords_unique_ordered() {
        let extractor = FallbackExtractor::new();
        let keywords = extractor.extract_keywords("login login auth login");
        assert_eq!(keywords, vec!["login", "auth"]);
    }

    #[test]
    fn test_extract_keywords_respects_limit() {
        let config = FallbackExtractorConfig {
            max_keywords: 2,
            ..Default::default()
        };
        let extractor = FallbackExtractor::with_config(config);
        let keywords = extractor.extract_keywords("payment gateway timeout retry queue");
        assert_eq!(keywords.len(), 2);
    }

    #[test]
    fn test_infer_intent_bug() {
        let extractor = FallbackExtractor::new();
        assert_eq!(
            extractor.infer_intent("login error on mobile"),
            SearchIntent::BugInvestigation
        );
    }

    #[test]
    fn test_infer_intent_design() {
        let extractor = FallbackExtractor::new();
        assert_eq!(
            extractor.infer_intent("payment service architecture"),
            SearchIntent::DesignReview
        );
    }

    #[test]
    fn test_infer_intent_general() {
        let extractor = FallbackExtractor::new();
        assert_eq!(extractor.infer_intent("quarterly report"), SearchIntent::General);
    }

    #[tokio::test]
    async fn test_extract_success() {
        let extractor = FallbackExtractor::new();
        let bundle = extractor.extract("login auth bug").await.unwrap();
        assert_eq!(bundle.keywords, vec!["login", "auth", "bug"]);
        assert_eq!(bundle.intent, SearchIntent::BugInvestigation);
        assert!(bundle.confidence > 0.0 && bundle.confidence <= 0.7);
    }

    #[tokio::test]
    async fn test_extract_empty_query_fails() {
        let extractor = FallbackExtractor::new();
        let result = extractor.extract("the of a").await;
        assert!(matches!(result, Err(ExtractionError::NoKeywords)));
    }

    #[test]
    fn test_confidence_ordering() {
        let extractor = FallbackExtractor::new();
        let low = extractor.estimate_confidence(&["x".to_string()], SearchIntent::General);
        let high = extractor.estimate_confidence(
            &["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()],
            SearchIntent::BugInvestigation,
        );
        assert!(high > low);
    }
}

use serde::{Deserialize, Serialize};

/// What the user is trying to accomplish with the search.
///
/// Drives intent-specific relevance boosts during scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchIntent {
    BugInvestigation,
    SpecConfirmation,
    ProgressCheck,
    FeatureUnderstanding,
    DesignReview,
    #[default]
    General,
}

impl SearchIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIntent::BugInvestigation => "bug_investigation",
            SearchIntent::SpecConfirmation => "spec_confirmation",
            SearchIntent::ProgressCheck => "progress_check",
            SearchIntent::FeatureUnderstanding => "feature_understanding",
            SearchIntent::DesignReview => "design_review",
            SearchIntent::General => "general",
        }
    }
}

/// Output of keyword extraction. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordBundle {
    /// Unique keywords, ordered by importance.
    pub keywords: Vec<String>,
    /// Inferred intent of the query.
    pub intent: SearchIntent,
    /// Extractor's confidence in the bundle, 0.0-1.0.
    pub confidence: f32,
}

impl KeywordBundle {
    pub fn new(keywords: Vec<String>, intent: SearchIntent, confidence: f32) -> Self {
        Self {
            keywords,
            intent,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_default_is_general() {
        assert_eq!(SearchIntent::default(), SearchIntent::General);
    }

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_string(&SearchIntent::BugInvestigation).unwrap();
        assert_eq!(json, "\"bug_investigation\"");
        let parsed: SearchIntent = serde_json::from_str("\"design_review\"").unwrap();
        assert_eq!(parsed, SearchIntent::DesignReview);
    }

    #[test]
    fn test_bundle_serialization() {
        let bundle = KeywordBundle::new(
            vec!["login".to_string(), "auth".to_string()],
            SearchIntent::BugInvestigation,
            0.8,
        );
        let json = serde_json::to_string(&bundle).unwrap();
        let parsed: KeywordBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.keywords, vec!["login", "auth"]);
        assert_eq!(parsed.intent, SearchIntent::BugInvestigation);
    }
}

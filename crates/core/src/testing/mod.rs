//! Testing utilities and mock implementations for E2E tests.
//!
//! Mock implementations of the injected capability traits, allowing
//! full pipeline testing without real backends.

mod mock_classifier;
mod mock_corpus;
mod mock_extractor;

pub use mock_classifier::MockClassifier;
pub use mock_corpus::MockCorpusClient;
pub use mock_extractor::MockKeywordExtractor;

pub use fixtures::*;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{Duration, Utc};

    use crate::corpus::RawCandidate;

    /// Create a raw candidate with reasonable defaults.
    pub fn make_raw_candidate(id: &str, title: &str) -> RawCandidate {
        RawCandidate {
            id: id.to_string(),
            title: title.to_string(),
            snippet: format!("Excerpt for {title}"),
            kind: "page".to_string(),
            status: Some("current".to_string()),
            created_at: Some(Utc::now() - Duration::days(60)),
            updated_at: Some(Utc::now() - Duration::days(7)),
            url: Some(format!("https://wiki.example.com/pages/{id}")),
            weight: 1.0,
        }
    }

    /// Create a wiki page candidate.
    pub fn page_candidate(id: &str, title: &str) -> RawCandidate {
        make_raw_candidate(id, title)
    }

    /// Create a tracker issue candidate.
    pub fn issue_candidate(id: &str, title: &str, issue_type: &str, status: &str) -> RawCandidate {
        let mut candidate = make_raw_candidate(id, title);
        candidate.kind = issue_type.to_string();
        candidate.status = Some(status.to_string());
        candidate.url = Some(format!("https://tracker.example.com/browse/{id}"));
        candidate
    }
}

//! Types for corpus search backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strategy::{QueryStage, StageKind};

pub use crate::config::CorpusKind;

/// A raw search hit from a corpus backend, before stage attribution.
#[derive(Debug, Clone)]
pub struct RawCandidate {
    /// Backend identifier (page id, issue key). Unique within a corpus.
    pub id: String,
    /// Document or issue title.
    pub title: String,
    /// Short text excerpt, may be empty.
    pub snippet: String,
    /// Content type as reported by the backend ("page", "Bug", "Task").
    pub kind: String,
    /// Workflow status ("current", "Done", "In Progress").
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Direct link to the item.
    pub url: Option<String>,
    /// Weight declared by the backend, 1.0 when it has no opinion.
    pub weight: f32,
}

/// A search hit attributed to the corpus and stage that produced it.
///
/// Immutable once constructed; scoring reads it, never rewrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    /// Id of the corpus this came from.
    pub corpus: String,
    /// Corpus family, drives scoring and summaries.
    pub corpus_kind: CorpusKind,
    pub title: String,
    pub snippet: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Which query stage produced this candidate.
    pub stage: StageKind,
    /// Precision weight of the producing stage, after any override.
    pub stage_weight: f32,
    /// Weight declared by the backend at creation, default 1.0.
    pub declared_weight: f32,
}

impl Candidate {
    /// Attribute a raw backend hit to its corpus and producing stage.
    pub fn from_raw(
        raw: RawCandidate,
        corpus: &str,
        corpus_kind: CorpusKind,
        stage: &QueryStage,
    ) -> Self {
        Self {
            id: raw.id,
            corpus: corpus.to_string(),
            corpus_kind,
            title: raw.title,
            snippet: raw.snippet,
            kind: raw.kind,
            status: raw.status,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            url: raw.url,
            stage: stage.kind,
            stage_weight: stage.weight,
            declared_weight: raw.weight,
        }
    }
}

/// Errors that can occur when querying a corpus backend.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Corpus connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Corpus API error: {0}")]
    ApiError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for corpus search backends.
#[async_trait]
pub trait CorpusClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Run one query against the backend, returning at most `max_results`
    /// raw hits in backend relevance order.
    async fn search(&self, query: &str, max_results: u32)
        -> Result<Vec<RawCandidate>, CorpusError>;
}

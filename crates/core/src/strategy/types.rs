//! Types for query strategies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::CorpusKind;

/// The three progressive query stages, highest precision first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Title-targeted OR query over the top keywords.
    TitleExact,
    /// Full-text AND query over all keywords.
    Strict,
    /// Full-text OR query with stop words removed and synonyms added.
    Relaxed,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::TitleExact => "title_exact",
            StageKind::Strict => "strict",
            StageKind::Relaxed => "relaxed",
        }
    }
}

/// How a stage combines its terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    And,
    Or,
}

/// A single executable query stage. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStage {
    /// Position in the stage sequence, 0-based.
    pub index: usize,
    pub kind: StageKind,
    pub operator: Operator,
    /// Rendered query string in the corpus dialect.
    pub query: String,
    /// Result cap passed to the backend.
    pub max_results: u32,
    /// Precision weight applied to candidates this stage produces.
    pub weight: f32,
}

/// The full stage sequence for one corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusQueryPlan {
    pub corpus: String,
    pub corpus_kind: CorpusKind,
    /// Declared corpus weight, after any per-request override.
    pub declared_weight: f32,
    /// Stages in execution order, highest precision first.
    pub stages: Vec<QueryStage>,
}

/// Per-request options narrowing or adjusting a search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Only match items updated at or after this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,
    /// Only match items updated at or before this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,
    /// Category scope per corpus id (wiki space key, tracker project key).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub categories: HashMap<String, String>,
    /// Include soft-deleted items, excluded by default.
    #[serde(default)]
    pub include_soft_deleted: bool,
    /// Per-request corpus weight overrides.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub corpus_weights: HashMap<String, f32>,
    /// Per-request stage weight overrides, keyed by stage kind name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub stage_weights: HashMap<String, f32>,
    /// Override the configured maximum result count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

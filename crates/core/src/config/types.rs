use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub stages: StageConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub corpora: Vec<CorpusConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            pipeline: PipelineConfig::default(),
            stages: StageConfig::default(),
            scoring: ScoringConfig::default(),
            ranking: RankingConfig::default(),
            query: QueryConfig::default(),
            rules: RulesConfig::default(),
            corpora: Vec::new(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Pipeline-level knobs: early exit, deadline, selector blending.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Stop querying further stages of a corpus once this many unique
    /// candidates have been collected from it.
    #[serde(default = "default_sufficiency")]
    pub sufficiency_threshold: usize,
    /// Wall-clock budget for a whole search execution, in seconds.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Rule confidence at or above which the classifier is skipped.
    #[serde(default = "default_certainty")]
    pub certainty_threshold: f32,
    /// Rule share when blending with classifier output.
    #[serde(default = "default_rule_mix")]
    pub rule_mix: f32,
    /// Classifier share when blending with classifier output.
    #[serde(default = "default_classifier_mix")]
    pub classifier_mix: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sufficiency_threshold: default_sufficiency(),
            deadline_secs: default_deadline_secs(),
            certainty_threshold: default_certainty(),
            rule_mix: default_rule_mix(),
            classifier_mix: default_classifier_mix(),
        }
    }
}

fn default_sufficiency() -> usize {
    3
}

fn default_deadline_secs() -> u64 {
    30
}

fn default_certainty() -> f32 {
    0.8
}

fn default_rule_mix() -> f32 {
    0.3
}

fn default_classifier_mix() -> f32 {
    0.7
}

/// Per-stage precision weights and result caps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StageConfig {
    #[serde(default = "default_title_exact_weight")]
    pub title_exact_weight: f32,
    #[serde(default = "default_strict_weight")]
    pub strict_weight: f32,
    #[serde(default = "default_relaxed_weight")]
    pub relaxed_weight: f32,
    #[serde(default = "default_title_exact_max")]
    pub title_exact_max_results: u32,
    #[serde(default = "default_strict_max")]
    pub strict_max_results: u32,
    #[serde(default = "default_relaxed_max")]
    pub relaxed_max_results: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            title_exact_weight: default_title_exact_weight(),
            strict_weight: default_strict_weight(),
            relaxed_weight: default_relaxed_weight(),
            title_exact_max_results: default_title_exact_max(),
            strict_max_results: default_strict_max(),
            relaxed_max_results: default_relaxed_max(),
        }
    }
}

fn default_title_exact_weight() -> f32 {
    1.0
}

fn default_strict_weight() -> f32 {
    0.8
}

fn default_relaxed_weight() -> f32 {
    0.6
}

fn default_title_exact_max() -> u32 {
    50
}

fn default_strict_max() -> u32 {
    100
}

fn default_relaxed_max() -> u32 {
    150
}

/// Quality scoring axis weights and thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    #[serde(default = "default_reliability_weight")]
    pub reliability_weight: f32,
    #[serde(default = "default_relevance_weight")]
    pub relevance_weight: f32,
    #[serde(default = "default_effectiveness_weight")]
    pub effectiveness_weight: f32,
    /// Scores at or above this are considered high quality.
    #[serde(default = "default_high_threshold")]
    pub high_quality_threshold: f32,
    /// Scores at or above this (but below high) are medium quality.
    #[serde(default = "default_medium_threshold")]
    pub medium_quality_threshold: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reliability_weight: default_reliability_weight(),
            relevance_weight: default_relevance_weight(),
            effectiveness_weight: default_effectiveness_weight(),
            high_quality_threshold: default_high_threshold(),
            medium_quality_threshold: default_medium_threshold(),
        }
    }
}

fn default_reliability_weight() -> f32 {
    0.40
}

fn default_relevance_weight() -> f32 {
    0.50
}

fn default_effectiveness_weight() -> f32 {
    0.10
}

fn default_high_threshold() -> f32 {
    0.7
}

fn default_medium_threshold() -> f32 {
    0.5
}

/// Result set bounds and diversity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankingConfig {
    #[serde(default = "default_min_results")]
    pub min_results: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Diversity pass only runs when more than this many results survive.
    #[serde(default = "default_diversity_threshold")]
    pub diversity_threshold: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_results: default_min_results(),
            max_results: default_max_results(),
            diversity_threshold: default_diversity_threshold(),
        }
    }
}

fn default_min_results() -> usize {
    3
}

fn default_max_results() -> usize {
    15
}

fn default_diversity_threshold() -> usize {
    5
}

/// Query construction: stop words, synonyms, term caps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
    #[serde(default = "default_synonyms")]
    pub synonyms: HashMap<String, Vec<String>>,
    /// Number of keywords used in the title stage.
    #[serde(default = "default_title_keyword_limit")]
    pub title_keyword_limit: usize,
    /// Total term cap for the relaxed stage after synonym expansion.
    #[serde(default = "default_relaxed_term_limit")]
    pub relaxed_term_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stop_words: default_stop_words(),
            synonyms: default_synonyms(),
            title_keyword_limit: default_title_keyword_limit(),
            relaxed_term_limit: default_relaxed_term_limit(),
        }
    }
}

fn default_stop_words() -> Vec<String> {
    [
        "the", "a", "an", "of", "for", "in", "on", "at", "to", "and", "or",
        "is", "are", "about", "with", "how", "what", "please",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_synonyms() -> HashMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("login", &["signin", "authentication"]),
        ("auth", &["authentication", "login"]),
        ("bug", &["defect", "issue"]),
        ("error", &["failure", "exception"]),
        ("spec", &["specification", "design"]),
        ("api", &["endpoint", "interface"]),
        ("config", &["configuration", "settings"]),
        ("deploy", &["release", "deployment"]),
        ("test", &["testing", "verification"]),
        ("user", &["account", "member"]),
    ];
    table
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

fn default_title_keyword_limit() -> usize {
    3
}

fn default_relaxed_term_limit() -> usize {
    7
}

/// Corpus selection rules: pattern and term weight tables plus the
/// thresholds keyed to match strength.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    #[serde(default = "default_compound_patterns")]
    pub compound_patterns: Vec<PatternRule>,
    #[serde(default = "default_term_weights")]
    pub term_weights: Vec<TermRule>,
    /// Selection threshold when a compound pattern matched.
    #[serde(default = "default_compound_threshold")]
    pub compound_threshold: f32,
    /// Selection threshold when exactly one weighted term matched.
    #[serde(default = "default_single_term_threshold")]
    pub single_term_threshold: f32,
    /// Selection threshold for everything else.
    #[serde(default = "default_general_threshold")]
    pub general_threshold: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            compound_patterns: default_compound_patterns(),
            term_weights: default_term_weights(),
            compound_threshold: default_compound_threshold(),
            single_term_threshold: default_single_term_threshold(),
            general_threshold: default_general_threshold(),
        }
    }
}

/// A multi-word regex signal for one corpus family.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatternRule {
    pub pattern: String,
    pub kind: CorpusKind,
    pub weight: f32,
    /// Short name used in selection reasoning.
    pub label: String,
}

/// A single weighted term for one corpus family.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TermRule {
    pub term: String,
    pub kind: CorpusKind,
    pub weight: f32,
}

fn default_compound_patterns() -> Vec<PatternRule> {
    let raw: &[(&str, CorpusKind, f32, &str)] = &[
        (
            r"(?i)bug\s+(report|status|fix)",
            CorpusKind::Tickets,
            4.0,
            "bug report/status",
        ),
        (
            r"(?i)(progress|status)\s+(check|update|report)",
            CorpusKind::Tickets,
            4.0,
            "progress check",
        ),
        (
            r"(?i)sprint\s+(backlog|planning|review)",
            CorpusKind::Tickets,
            3.5,
            "sprint planning",
        ),
        (
            r"(?i)design\s+(doc|document|review|spec)",
            CorpusKind::Documents,
            4.0,
            "design document",
        ),
        (
            r"(?i)(api|interface)\s+(spec|specification|reference)",
            CorpusKind::Documents,
            4.0,
            "api specification",
        ),
        (
            r"(?i)(architecture|system)\s+(overview|diagram)",
            CorpusKind::Documents,
            3.5,
            "architecture overview",
        ),
    ];
    raw.iter()
        .map(|(pattern, kind, weight, label)| PatternRule {
            pattern: pattern.to_string(),
            kind: *kind,
            weight: *weight,
            label: label.to_string(),
        })
        .collect()
}

fn default_term_weights() -> Vec<TermRule> {
    let documents: &[(&str, f32)] = &[
        ("spec", 3.0),
        ("specification", 3.0),
        ("design", 2.5),
        ("document", 2.5),
        ("wiki", 2.5),
        ("page", 2.0),
        ("architecture", 2.0),
        ("diagram", 2.0),
        ("guide", 1.5),
        ("api", 1.5),
        ("feature", 1.5),
        ("requirement", 1.5),
    ];
    let tickets: &[(&str, f32)] = &[
        ("bug", 3.0),
        ("ticket", 3.0),
        ("issue", 2.5),
        ("progress", 2.5),
        ("sprint", 2.5),
        ("status", 2.0),
        ("task", 2.0),
        ("assignee", 2.0),
        ("backlog", 2.0),
        ("error", 1.5),
        ("fix", 1.5),
        ("crash", 1.5),
    ];
    let mut rules = Vec::new();
    for (term, weight) in documents {
        rules.push(TermRule {
            term: term.to_string(),
            kind: CorpusKind::Documents,
            weight: *weight,
        });
    }
    for (term, weight) in tickets {
        rules.push(TermRule {
            term: term.to_string(),
            kind: CorpusKind::Tickets,
            weight: *weight,
        });
    }
    rules
}

fn default_compound_threshold() -> f32 {
    0.7
}

fn default_single_term_threshold() -> f32 {
    0.5
}

fn default_general_threshold() -> f32 {
    0.4
}

/// A searchable corpus.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Stable identifier, e.g. "confluence" or "jira".
    pub id: String,
    /// What the corpus holds; drives query dialect and scoring.
    pub kind: CorpusKind,
    /// Declared weight applied to every candidate from this corpus.
    #[serde(default = "default_corpus_weight")]
    pub weight: f32,
    /// Field name for category scoping ("space", "project").
    #[serde(default)]
    pub category_field: Option<String>,
    /// HTTP backend, absent when the client is injected some other way.
    #[serde(default)]
    pub http: Option<CorpusHttpConfig>,
}

fn default_corpus_weight() -> f32 {
    1.0
}

/// The two corpus families with distinct query dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusKind {
    /// Wiki-style pages, queried with a CQL dialect.
    Documents,
    /// Issue tracker items, queried with a JQL dialect.
    Tickets,
}

/// HTTP backend for a corpus.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusHttpConfig {
    /// Base URL, e.g. "https://wiki.example.com".
    pub url: String,
    /// Basic auth username (usually an email).
    pub username: String,
    /// API token paired with the username.
    pub api_token: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub stages: StageConfig,
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
    pub corpora: Vec<SanitizedCorpusConfig>,
}

/// Sanitized corpus config (API token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCorpusConfig {
    pub id: String,
    pub kind: CorpusKind,
    pub weight: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub api_token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            pipeline: config.pipeline.clone(),
            stages: config.stages.clone(),
            scoring: config.scoring.clone(),
            ranking: config.ranking.clone(),
            corpora: config
                .corpora
                .iter()
                .map(|c| SanitizedCorpusConfig {
                    id: c.id.clone(),
                    kind: c.kind,
                    weight: c.weight,
                    url: c.http.as_ref().map(|h| h.url.clone()),
                    api_token_configured: c
                        .http
                        .as_ref()
                        .map(|h| !h.api_token.is_empty())
                        .unwrap_or(false),
                })
                .collect(),
        }
    }
}

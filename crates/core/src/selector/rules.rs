//! Rule-based corpus confidence.
//!
//! Weighted term tables and compound patterns per corpus family, taken
//! from configuration. The strength of the match also determines the
//! selection threshold: compound matches justify a high bar, a lone
//! generic term a low one.

use regex_lite::Regex;
use std::collections::HashMap;
use tracing::warn;

use crate::config::{CorpusConfig, CorpusKind, RulesConfig};
use crate::keywords::KeywordBundle;

/// Documents-leaning priors used when nothing matches.
const STRONG_DOCUMENTS_PRIOR: (f32, f32) = (0.85, 0.15);
const MILD_DOCUMENTS_PRIOR: (f32, f32) = (0.6, 0.4);

/// Terms that justify the strong documents prior in the fallback.
const DOCUMENT_LEANING_HINTS: &[&str] = &["how", "what", "why", "overview", "explain"];

struct CompoundPattern {
    regex: Regex,
    kind: CorpusKind,
    weight: f32,
    label: String,
}

/// Result of rule evaluation for one keyword bundle.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    /// Normalized confidence per corpus id, sums to 1.
    pub confidences: HashMap<String, f32>,
    /// Dynamic selection threshold derived from match strength.
    pub threshold: f32,
    /// Reasoning fragments, later joined for the final reasoning string.
    pub reasoning: Vec<String>,
}

/// Rule engine over configured pattern and term weight tables.
pub struct RuleEngine {
    patterns: Vec<CompoundPattern>,
    term_weights: HashMap<String, (CorpusKind, f32)>,
    config: RulesConfig,
}

impl RuleEngine {
    /// Compile the configured tables. Patterns that do not compile are
    /// dropped with a warning; `validate_config` rejects them upfront.
    pub fn new(config: RulesConfig) -> Self {
        let patterns = config
            .compound_patterns
            .iter()
            .filter_map(|rule| match Regex::new(&rule.pattern) {
                Ok(regex) => Some(CompoundPattern {
                    regex,
                    kind: rule.kind,
                    weight: rule.weight,
                    label: rule.label.clone(),
                }),
                Err(e) => {
                    warn!(pattern = %rule.pattern, error = %e, "Invalid compound pattern, skipping");
                    None
                }
            })
            .collect();
        let term_weights = config
            .term_weights
            .iter()
            .map(|rule| (rule.term.to_lowercase(), (rule.kind, rule.weight)))
            .collect();
        Self {
            patterns,
            term_weights,
            config,
        }
    }

    pub fn evaluate(&self, bundle: &KeywordBundle, corpora: &[CorpusConfig]) -> RuleOutcome {
        let text = bundle.keywords.join(" ").to_lowercase();
        let mut kind_scores: HashMap<CorpusKind, f32> = HashMap::new();
        let mut reasoning = Vec::new();
        let mut compound_matched = false;
        let mut matched_terms: Vec<String> = Vec::new();

        for pattern in &self.patterns {
            if pattern.regex.is_match(&text) {
                *kind_scores.entry(pattern.kind).or_insert(0.0) += pattern.weight;
                compound_matched = true;
                reasoning.push(format!("compound match: {}", pattern.label));
            }
        }

        for keyword in &bundle.keywords {
            let lower = keyword.to_lowercase();
            if let Some((kind, weight)) = self.term_weights.get(lower.as_str()) {
                *kind_scores.entry(*kind).or_insert(0.0) += weight;
                matched_terms.push(lower);
            }
        }
        if !matched_terms.is_empty() {
            reasoning.push(format!("matched terms: {}", matched_terms.join(", ")));
        }

        let threshold = if compound_matched {
            self.config.compound_threshold
        } else if matched_terms.len() == 1 {
            self.config.single_term_threshold
        } else {
            self.config.general_threshold
        };

        if kind_scores.is_empty() {
            let leaning = bundle
                .keywords
                .iter()
                .any(|kw| DOCUMENT_LEANING_HINTS.contains(&kw.to_lowercase().as_str()));
            let (documents, tickets) = if leaning {
                STRONG_DOCUMENTS_PRIOR
            } else {
                MILD_DOCUMENTS_PRIOR
            };
            kind_scores.insert(CorpusKind::Documents, documents);
            kind_scores.insert(CorpusKind::Tickets, tickets);
            reasoning.push("no rule match, default priors".to_string());
        }

        let confidences = spread_over_corpora(&kind_scores, corpora);
        reasoning.push(format!("threshold {threshold:.2}"));

        RuleOutcome {
            confidences,
            threshold,
            reasoning,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RulesConfig::default())
    }
}

/// Distribute per-family scores over the configured corpora and
/// normalize to sum 1.
fn spread_over_corpora(
    kind_scores: &HashMap<CorpusKind, f32>,
    corpora: &[CorpusConfig],
) -> HashMap<String, f32> {
    let mut kind_counts: HashMap<CorpusKind, usize> = HashMap::new();
    for corpus in corpora {
        *kind_counts.entry(corpus.kind).or_insert(0) += 1;
    }

    let mut confidences: HashMap<String, f32> = corpora
        .iter()
        .map(|corpus| {
            let score = kind_scores.get(&corpus.kind).copied().unwrap_or(0.0);
            let share = kind_counts.get(&corpus.kind).copied().unwrap_or(1).max(1);
            (corpus.id.clone(), score / share as f32)
        })
        .collect();

    let total: f32 = confidences.values().sum();
    if total > 0.0 {
        for value in confidences.values_mut() {
            *value /= total;
        }
    }
    confidences
}

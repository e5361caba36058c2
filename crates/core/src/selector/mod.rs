//! Corpus selection: decide which corpora are worth querying.

mod classifier;
mod rules;

pub use classifier::*;
pub use rules::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::{CorpusConfig, PipelineConfig, RulesConfig};
use crate::keywords::KeywordBundle;

/// Outcome of corpus selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSelection {
    /// Selected corpus ids, highest confidence first.
    pub selected: Vec<String>,
    /// Normalized confidence per corpus id, sums to 1.
    pub confidences: HashMap<String, f32>,
    /// Threshold that was applied.
    pub threshold: f32,
    /// Human-readable account of how the decision was made.
    pub reasoning: String,
}

/// Blends rule-based confidence with an optional classifier and picks
/// the corpora above the dynamic threshold.
pub struct CorpusSelector {
    rules: RuleEngine,
    config: PipelineConfig,
}

impl CorpusSelector {
    pub fn new(config: PipelineConfig, rules: RulesConfig) -> Self {
        Self {
            rules: RuleEngine::new(rules),
            config,
        }
    }

    /// Select corpora for a keyword bundle. Never fails: classifier
    /// errors degrade to rule-only selection.
    pub async fn select(
        &self,
        bundle: &KeywordBundle,
        corpora: &[CorpusConfig],
        classifier: Option<&dyn CorpusClassifier>,
    ) -> CorpusSelection {
        let outcome = self.rules.evaluate(bundle, corpora);
        let mut reasoning = outcome.reasoning.clone();
        let mut confidences = outcome.confidences.clone();

        let top_rule_confidence = confidences
            .values()
            .fold(0.0_f32, |acc, v| acc.max(*v));

        if top_rule_confidence < self.config.certainty_threshold {
            if let Some(classifier) = classifier {
                match classifier.classify(bundle, corpora).await {
                    Ok(classified) => {
                        confidences = blend(
                            &confidences,
                            &classified,
                            self.config.rule_mix,
                            self.config.classifier_mix,
                        );
                        reasoning.push(format!(
                            "blended rules with {} ({:.0}/{:.0})",
                            classifier.name(),
                            self.config.rule_mix * 100.0,
                            self.config.classifier_mix * 100.0
                        ));
                    }
                    Err(e) => {
                        warn!(classifier = classifier.name(), error = %e, "Classifier failed, using rules only");
                        reasoning.push("classifier unavailable, rules only".to_string());
                    }
                }
            }
        } else {
            reasoning.push(format!(
                "rule confidence {top_rule_confidence:.2} above certainty, classifier skipped"
            ));
        }

        let mut selected: Vec<(String, f32)> = confidences
            .iter()
            .filter(|(_, conf)| **conf >= outcome.threshold)
            .map(|(id, conf)| (id.clone(), *conf))
            .collect();
        selected.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        if selected.is_empty() {
            // No corpus cleared the bar, force the best one.
            if let Some((id, conf)) = confidences.iter().max_by(|a, b| {
                a.1.partial_cmp(b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.0.cmp(a.0))
            }) {
                selected.push((id.clone(), *conf));
                reasoning.push(format!("no corpus above threshold, forced {id}"));
            }
        }

        let selection = CorpusSelection {
            selected: selected.into_iter().map(|(id, _)| id).collect(),
            confidences,
            threshold: outcome.threshold,
            reasoning: reasoning.join(" | "),
        };
        debug!(
            selected = ?selection.selected,
            threshold = selection.threshold,
            "Corpus selection complete"
        );
        selection
    }
}

/// Weighted blend of two confidence maps, renormalized to sum 1.
fn blend(
    rules: &HashMap<String, f32>,
    classified: &HashMap<String, f32>,
    rule_mix: f32,
    classifier_mix: f32,
) -> HashMap<String, f32> {
    let mut blended: HashMap<String, f32> = rules
        .iter()
        .map(|(id, rule_conf)| {
            let class_conf = classified.get(id).copied().unwrap_or(0.0);
            (id.clone(), rule_conf * rule_mix + class_conf * classifier_mix)
        })
        .collect();

    let total: f32 = blended.values().sum();
    if total > 0.0 {
        for value in blended.values_mut() {
            *value /= total;
        }
    }
    blended
}

use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Corpus ids are non-empty and unique
/// - Selector mix and scoring axis weights each sum to 1
/// - Rule patterns compile
/// - Ranking bounds are ordered and non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for corpus in &config.corpora {
        if corpus.id.is_empty() {
            return Err(ConfigError::ValidationError(
                "corpora.id cannot be empty".to_string(),
            ));
        }
        if !seen.insert(corpus.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate corpus id: {}",
                corpus.id
            )));
        }
        if corpus.weight < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "corpora.weight cannot be negative for {}",
                corpus.id
            )));
        }
    }

    let mix = config.pipeline.rule_mix + config.pipeline.classifier_mix;
    if (mix - 1.0).abs() > 1e-4 {
        return Err(ConfigError::ValidationError(format!(
            "pipeline.rule_mix + pipeline.classifier_mix must sum to 1, got {mix}"
        )));
    }

    let axes = config.scoring.reliability_weight
        + config.scoring.relevance_weight
        + config.scoring.effectiveness_weight;
    if (axes - 1.0).abs() > 1e-4 {
        return Err(ConfigError::ValidationError(format!(
            "scoring axis weights must sum to 1, got {axes}"
        )));
    }

    for rule in &config.rules.compound_patterns {
        if let Err(e) = regex_lite::Regex::new(&rule.pattern) {
            return Err(ConfigError::ValidationError(format!(
                "rules.compound_patterns entry \"{}\" does not compile: {e}",
                rule.pattern
            )));
        }
    }

    if config.ranking.min_results == 0 {
        return Err(ConfigError::ValidationError(
            "ranking.min_results cannot be 0".to_string(),
        ));
    }
    if config.ranking.min_results > config.ranking.max_results {
        return Err(ConfigError::ValidationError(format!(
            "ranking.min_results ({}) cannot exceed ranking.max_results ({})",
            config.ranking.min_results, config.ranking.max_results
        )));
    }

    if config.pipeline.sufficiency_threshold == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.sufficiency_threshold cannot be 0".to_string(),
        ));
    }

    Ok(())
}

//! Quality scoring along three axes.
//!
//! Reliability looks at freshness and provenance, relevance at how well
//! the text matches the keyword bundle, effectiveness at how actionable
//! the item is. Axis scores combine into a base score which is then
//! multiplied by stage, corpus and declared weights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{CorpusKind, ScoringConfig};
use crate::corpus::Candidate;
use crate::keywords::{KeywordBundle, SearchIntent};
use crate::strategy::StageKind;

const TITLE_BOUNDARY_MATCH: f32 = 0.3;
const TITLE_PARTIAL_MATCH: f32 = 0.15;
const TITLE_MATCH_CAP: f32 = 0.4;
const DENSITY_WEIGHT: f32 = 0.25;
const DENSITY_SATURATION: usize = 10;
const STRICT_STAGE_BONUS: f32 = 0.2;
const RELAXED_STAGE_BONUS: f32 = 0.1;

const FRESH_DAYS: i64 = 30;
const STALE_DAYS: i64 = 365;

const COMPLETED_STATUSES: &[&str] = &["done", "resolved", "closed", "published", "current", "completed"];
const ACTIONABLE_KINDS: &[&str] = &["page", "task", "story"];

/// A candidate with its quality assessment attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub reliability: f32,
    pub relevance: f32,
    pub effectiveness: f32,
    /// Final score in [0, 1], never NaN.
    pub combined_score: f32,
    /// Short account of the dominant scoring factors.
    pub reasoning: String,
}

/// Scores candidates against a keyword bundle.
pub struct QualityScorer {
    config: ScoringConfig,
}

impl QualityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score every candidate. Pure given a fixed `now`.
    pub fn score_all(
        &self,
        candidates: Vec<Candidate>,
        bundle: &KeywordBundle,
        corpus_weights: &HashMap<String, f32>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        candidates
            .into_iter()
            .map(|candidate| self.score(candidate, bundle, corpus_weights, now))
            .collect()
    }

    fn score(
        &self,
        candidate: Candidate,
        bundle: &KeywordBundle,
        corpus_weights: &HashMap<String, f32>,
        now: DateTime<Utc>,
    ) -> ScoredCandidate {
        let reliability = clip(reliability_score(&candidate, now));
        let relevance = clip(relevance_score(&candidate, bundle));
        let effectiveness = clip(effectiveness_score(&candidate));

        let base = clip(
            reliability * self.config.reliability_weight
                + relevance * self.config.relevance_weight
                + effectiveness * self.config.effectiveness_weight,
        );

        let stage_weight = candidate.stage_weight;
        let corpus_weight = corpus_weights.get(&candidate.corpus).copied().unwrap_or(1.0);
        let combined_score = clip(base * stage_weight * corpus_weight * candidate.declared_weight);

        let reasoning = format!(
            "reliability {reliability:.2}, relevance {relevance:.2}, effectiveness {effectiveness:.2}, {} stage x{stage_weight:.1}, corpus {} x{corpus_weight:.2}",
            candidate.stage.as_str(),
            candidate.corpus,
        );

        ScoredCandidate {
            candidate,
            reliability,
            relevance,
            effectiveness,
            combined_score,
            reasoning,
        }
    }
}

/// Clamp to [0, 1], mapping NaN and negatives to 0.
fn clip(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn reliability_score(candidate: &Candidate, now: DateTime<Utc>) -> f32 {
    let mut score = 0.5;

    let reference = candidate.updated_at.or(candidate.created_at);
    if let Some(timestamp) = reference {
        let age_days = (now - timestamp).num_days();
        if age_days <= FRESH_DAYS {
            score += 0.2;
        } else if age_days > STALE_DAYS {
            score -= 0.1;
        }
    }

    if candidate.corpus_kind == CorpusKind::Documents {
        score += 0.1;
    }

    if let Some(status) = &candidate.status {
        if COMPLETED_STATUSES.contains(&status.to_lowercase().as_str()) {
            score += 0.1;
        }
    }

    score
}

fn relevance_score(candidate: &Candidate, bundle: &KeywordBundle) -> f32 {
    let title_lower = candidate.title.to_lowercase();
    let title_words: Vec<&str> = title_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut title_score = 0.0;
    for keyword in &bundle.keywords {
        let kw = keyword.to_lowercase();
        if title_words.iter().any(|w| *w == kw) {
            title_score += TITLE_BOUNDARY_MATCH;
        } else if title_lower.contains(&kw) {
            title_score += TITLE_PARTIAL_MATCH;
        }
    }
    let mut score = title_score.min(TITLE_MATCH_CAP);

    // Richer bundles carry more context; saturates at ten keywords.
    score += (bundle.keywords.len().min(DENSITY_SATURATION) as f32
        / DENSITY_SATURATION as f32)
        * DENSITY_WEIGHT;

    score += match candidate.stage {
        StageKind::Strict => STRICT_STAGE_BONUS,
        StageKind::Relaxed => RELAXED_STAGE_BONUS,
        StageKind::TitleExact => 0.0,
    };

    score += intent_affinity(candidate, bundle.intent);

    score
}

/// Intent-specific boost, first matching entry wins.
fn intent_affinity(candidate: &Candidate, intent: SearchIntent) -> f32 {
    let table: &[(&str, f32)] = match intent {
        SearchIntent::BugInvestigation => &[("bug", 0.3), ("task", 0.2), ("issue", 0.2)],
        SearchIntent::SpecConfirmation => {
            &[("page", 0.3), ("specification", 0.3), ("design", 0.2)]
        }
        SearchIntent::ProgressCheck => &[("task", 0.3), ("story", 0.3), ("status", 0.2)],
        SearchIntent::FeatureUnderstanding => {
            &[("page", 0.3), ("interface", 0.2), ("api", 0.2)]
        }
        SearchIntent::DesignReview => &[("page", 0.3), ("design", 0.3), ("architecture", 0.2)],
        SearchIntent::General => &[],
    };

    let kind = candidate.kind.to_lowercase();
    let title = candidate.title.to_lowercase();
    for (term, bonus) in table {
        if kind == *term || title.contains(term) {
            return *bonus;
        }
    }
    0.0
}

fn effectiveness_score(candidate: &Candidate) -> f32 {
    let mut score = 0.7;

    let kind = candidate.kind.to_lowercase();
    if ACTIONABLE_KINDS.contains(&kind.as_str()) {
        score += 0.15;
    } else if kind == "bug" {
        score += 0.1;
    }

    let title_len = candidate.title.chars().count();
    if (10..=100).contains(&title_len) {
        score += 0.1;
    } else if title_len < 5 {
        score -= 0.2;
    }

    if !candidate.id.is_empty() {
        score += 0.05;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_candidate(id: &str, title: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            corpus: "confluence".to_string(),
            corpus_kind: CorpusKind::Documents,
            title: title.to_string(),
            snippet: String::new(),
            kind: "page".to_string(),
            status: None,
            created_at: None,
            updated_at: None,
            url: None,
            stage: StageKind::TitleExact,
            stage_weight: 1.0,
            declared_weight: 1.0,
        }
    }

    fn make_bundle(keywords: &[&str]) -> KeywordBundle {
        KeywordBundle::new(
            keywords.iter().map(|s| s.to_string()).collect(),
            SearchIntent::General,
            0.8,
        )
    }

    fn score_one(candidate: Candidate, bundle: &KeywordBundle) -> ScoredCandidate {
        let scorer = QualityScorer::new(ScoringConfig::default());
        let mut scored = scorer.score_all(vec![candidate], bundle, &HashMap::new(), Utc::now());
        scored.remove(0)
    }

    #[test]
    fn test_scores_always_in_unit_range() {
        let mut candidate = make_candidate("a", "Login authentication login auth login design");
        candidate.status = Some("Done".to_string());
        candidate.updated_at = Some(Utc::now());
        let scored = score_one(candidate, &make_bundle(&["login", "auth", "design"]));

        for value in [
            scored.reliability,
            scored.relevance,
            scored.effectiveness,
            scored.combined_score,
        ] {
            assert!((0.0..=1.0).contains(&value), "out of range: {value}");
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_clip_guards_nan_and_negatives() {
        assert_eq!(clip(f32::NAN), 0.0);
        assert_eq!(clip(-0.5), 0.0);
        assert_eq!(clip(1.5), 1.0);
        assert_eq!(clip(0.42), 0.42);
    }

    #[test]
    fn test_fresh_update_beats_stale() {
        let now = Utc::now();
        let mut fresh = make_candidate("a", "Login design");
        fresh.updated_at = Some(now - Duration::days(5));
        let mut stale = make_candidate("b", "Login design");
        stale.updated_at = Some(now - Duration::days(400));

        assert!(reliability_score(&fresh, now) > reliability_score(&stale, now));
    }

    #[test]
    fn test_reliability_falls_back_to_created_at() {
        let now = Utc::now();
        let mut candidate = make_candidate("a", "Login design");
        candidate.created_at = Some(now - Duration::days(2));
        let with_created = reliability_score(&candidate, now);
        candidate.created_at = None;
        let without = reliability_score(&candidate, now);
        assert!(with_created > without);
    }

    #[test]
    fn test_documents_corpus_reliability_bonus() {
        let now = Utc::now();
        let documents = make_candidate("a", "Login");
        let mut tickets = make_candidate("b", "Login");
        tickets.corpus_kind = CorpusKind::Tickets;
        assert!(reliability_score(&documents, now) > reliability_score(&tickets, now));
    }

    #[test]
    fn test_title_boundary_match_beats_partial() {
        let bundle = make_bundle(&["login"]);
        let exact = make_candidate("a", "Login flow overview");
        let partial = make_candidate("b", "Loginpage notes here");
        assert!(relevance_score(&exact, &bundle) > relevance_score(&partial, &bundle));
    }

    #[test]
    fn test_density_counts_bundle_keywords_not_repetitions() {
        // A keyword repeated throughout the title earns no extra density;
        // only the bundle size feeds the term.
        let bundle = make_bundle(&["login", "auth"]);
        let repetitive = make_candidate(
            "a",
            "Login login login login login login login login login login",
        );
        let plain = make_candidate("b", "Login notes");
        let expected = TITLE_BOUNDARY_MATCH + (2.0 / DENSITY_SATURATION as f32) * DENSITY_WEIGHT;
        assert!((relevance_score(&repetitive, &bundle) - expected).abs() < 1e-6);
        assert!(
            (relevance_score(&repetitive, &bundle) - relevance_score(&plain, &bundle)).abs()
                < 1e-6
        );
    }

    #[test]
    fn test_density_saturates_at_ten_keywords() {
        let many: Vec<String> = (0..12).map(|i| format!("kw{i}")).collect();
        let keywords: Vec<&str> = many.iter().map(|s| s.as_str()).collect();
        let bundle = make_bundle(&keywords);
        let candidate = make_candidate("a", "Unrelated title");
        assert!((relevance_score(&candidate, &bundle) - DENSITY_WEIGHT).abs() < 1e-6);
    }

    #[test]
    fn test_strict_stage_bonus_applied() {
        let bundle = make_bundle(&["login"]);
        let mut title_stage = make_candidate("a", "Login");
        title_stage.stage = StageKind::TitleExact;
        let mut strict_stage = make_candidate("b", "Login");
        strict_stage.stage = StageKind::Strict;
        let diff = relevance_score(&strict_stage, &bundle) - relevance_score(&title_stage, &bundle);
        assert!((diff - STRICT_STAGE_BONUS).abs() < 1e-6);
    }

    #[test]
    fn test_intent_affinity_bug() {
        let mut candidate = make_candidate("a", "Crash on startup");
        candidate.kind = "Bug".to_string();
        assert_eq!(
            intent_affinity(&candidate, SearchIntent::BugInvestigation),
            0.3
        );
        assert_eq!(intent_affinity(&candidate, SearchIntent::General), 0.0);
    }

    #[test]
    fn test_effectiveness_short_title_penalty() {
        let long = make_candidate("a", "Authentication service rollout plan");
        let short = make_candidate("b", "x");
        assert!(effectiveness_score(&long) > effectiveness_score(&short));
    }

    #[test]
    fn test_combined_uses_stage_and_corpus_weights() {
        let bundle = make_bundle(&["login"]);
        let scorer = QualityScorer::new(ScoringConfig::default());
        let mut weights = HashMap::new();
        weights.insert("confluence".to_string(), 0.5);

        let candidate = make_candidate("a", "Login flow overview");
        let full = score_one(candidate.clone(), &bundle);
        let halved = scorer
            .score_all(vec![candidate], &bundle, &weights, Utc::now())
            .remove(0);

        assert!((halved.combined_score - full.combined_score * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stage_weight_on_candidate_scales_combined() {
        let bundle = make_bundle(&["login"]);
        let full = score_one(make_candidate("a", "Login flow overview"), &bundle);
        let mut demoted = make_candidate("a", "Login flow overview");
        demoted.stage_weight = 0.6;
        let scaled = score_one(demoted, &bundle);
        assert!((scaled.combined_score - full.combined_score * 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_declared_weight_scales_combined() {
        let bundle = make_bundle(&["login"]);
        let full = score_one(make_candidate("a", "Login flow overview"), &bundle);
        let mut weighted = make_candidate("a", "Login flow overview");
        weighted.declared_weight = 0.5;
        let half = score_one(weighted, &bundle);
        assert!((half.combined_score - full.combined_score * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let bundle = make_bundle(&["login", "auth"]);
        let now = Utc::now();
        let scorer = QualityScorer::new(ScoringConfig::default());
        let a = scorer.score_all(
            vec![make_candidate("a", "Login auth notes")],
            &bundle,
            &HashMap::new(),
            now,
        );
        let b = scorer.score_all(
            vec![make_candidate("a", "Login auth notes")],
            &bundle,
            &HashMap::new(),
            now,
        );
        assert_eq!(a[0].combined_score, b[0].combined_score);
    }
}

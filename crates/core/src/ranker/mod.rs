//! Ranking, bounds and diversity selection over scored candidates.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::{RankingConfig, ScoringConfig};
use crate::scorer::ScoredCandidate;

/// Minimum picks before the diversity pass starts rejecting repeats.
const DIVERSITY_FREE_PICKS: usize = 3;

/// Quality bucket counts over the returned results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

/// The final ranked output of a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResultSet {
    /// Results best first; the diversity pass may promote a distinct
    /// (corpus, kind) pair ahead of higher-scored repeats.
    pub results: Vec<ScoredCandidate>,
    pub distribution: QualityDistribution,
    /// One-line account of the ranking outcome.
    pub summary: String,
}

/// Sorts, bounds and diversifies scored candidates.
pub struct Ranker {
    scoring: ScoringConfig,
    ranking: RankingConfig,
}

impl Ranker {
    pub fn new(scoring: ScoringConfig, ranking: RankingConfig) -> Self {
        Self { scoring, ranking }
    }

    /// Produce the final bounded result set.
    pub fn rank(
        &self,
        mut scored: Vec<ScoredCandidate>,
        max_override: Option<usize>,
    ) -> RankedResultSet {
        let total_candidates = scored.len();
        scored.sort_by(compare_scored);

        let max_results = max_override
            .unwrap_or(self.ranking.max_results)
            .max(self.ranking.min_results);

        let mut selection: Vec<ScoredCandidate> = scored
            .iter()
            .filter(|s| s.combined_score >= self.scoring.high_quality_threshold)
            .cloned()
            .collect();

        // Too few high-quality hits, pad with the best of the rest.
        if selection.len() < self.ranking.min_results {
            let chosen: HashSet<(String, String)> = selection
                .iter()
                .map(|s| (s.candidate.corpus.clone(), s.candidate.id.clone()))
                .collect();
            for candidate in &scored {
                if selection.len() >= self.ranking.min_results {
                    break;
                }
                let key = (
                    candidate.candidate.corpus.clone(),
                    candidate.candidate.id.clone(),
                );
                if !chosen.contains(&key) {
                    selection.push(candidate.clone());
                }
            }
        }

        selection.truncate(max_results);

        if selection.len() > self.ranking.diversity_threshold {
            selection = diversify(selection);
        }

        let distribution = self.distribution(&selection);
        let summary = self.summarize(&selection, total_candidates, &distribution);

        RankedResultSet {
            results: selection,
            distribution,
            summary,
        }
    }

    fn distribution(&self, results: &[ScoredCandidate]) -> QualityDistribution {
        let mut distribution = QualityDistribution {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            if result.combined_score >= self.scoring.high_quality_threshold {
                distribution.high += 1;
            } else if result.combined_score >= self.scoring.medium_quality_threshold {
                distribution.medium += 1;
            } else {
                distribution.low += 1;
            }
        }
        distribution
    }

    fn summarize(
        &self,
        results: &[ScoredCandidate],
        total_candidates: usize,
        distribution: &QualityDistribution,
    ) -> String {
        if results.is_empty() {
            return format!("selected 0 of {total_candidates} candidates");
        }
        let avg: f32 =
            results.iter().map(|r| r.combined_score).sum::<f32>() / results.len() as f32;
        let top = results
            .first()
            .map(|r| r.combined_score)
            .unwrap_or_default();
        format!(
            "selected {} of {} candidates | avg score {:.2} | high quality {} | top score {:.2}",
            results.len(),
            total_candidates,
            avg,
            distribution.high,
            top
        )
    }
}

/// Descending score with a stable corpus+id tie-break.
fn compare_scored(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.combined_score
        .partial_cmp(&a.combined_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.candidate.corpus.cmp(&b.candidate.corpus))
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

/// One diversity pass over a score-ordered selection.
///
/// Takes a candidate when its (corpus, kind) pair is unseen or while the
/// picked set is still small, so an unseen pair jumps ahead of repeats of
/// an already-seen one. Skipped repeats backfill at the end, still in
/// score order.
fn diversify(selection: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    let mut picked: Vec<ScoredCandidate> = Vec::new();
    let mut skipped: Vec<ScoredCandidate> = Vec::new();

    for candidate in selection {
        let pair = (
            candidate.candidate.corpus.clone(),
            candidate.candidate.kind.to_lowercase(),
        );
        if seen_pairs.insert(pair) || picked.len() < DIVERSITY_FREE_PICKS {
            picked.push(candidate);
        } else {
            skipped.push(candidate);
        }
    }

    picked.extend(skipped);
    picked
}

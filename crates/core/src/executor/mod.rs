//! Search execution: runs each corpus plan stage by stage.
//!
//! Corpora run concurrently; within a corpus, stages run in order and
//! stop early once enough unique candidates have been collected. The
//! whole execution is bounded by a wall-clock deadline; whatever has
//! been collected when it expires is still returned.

mod merge;
mod state;

pub use merge::*;
pub use state::*;

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::corpus::{Candidate, CorpusClient};
use crate::metrics;
use crate::strategy::CorpusQueryPlan;

/// Errors that can end an execution with nothing to show.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("All corpora failed")]
    AllCorporaFailed(HashMap<String, String>),

    #[error("No client configured for corpus: {0}")]
    MissingClient(String),
}

/// One corpus's share of an execution.
#[derive(Debug)]
pub struct CorpusRun {
    pub corpus: String,
    pub state: CorpusState,
    /// Deduplicated candidates in collection order.
    pub candidates: Vec<Candidate>,
    /// Stage name to error message, for stages that errored.
    pub stage_errors: HashMap<String, String>,
}

/// Outcome of a full execution across corpora.
#[derive(Debug)]
pub struct ExecutionReport {
    /// All collected candidates, grouped by corpus in plan order.
    pub candidates: Vec<Candidate>,
    pub runs: Vec<CorpusRun>,
    pub duration_ms: u64,
}

/// Runs corpus query plans against their clients.
pub struct SearchExecutor {
    sufficiency_threshold: usize,
    deadline: Duration,
}

impl SearchExecutor {
    pub fn new(sufficiency_threshold: usize, deadline: Duration) -> Self {
        Self {
            sufficiency_threshold,
            deadline,
        }
    }

    /// Execute all plans concurrently.
    ///
    /// Fails only when every corpus ends in the failed state; partial
    /// failures surface through the per-run stage errors.
    pub async fn execute(
        &self,
        plans: &[CorpusQueryPlan],
        clients: &HashMap<String, Arc<dyn CorpusClient>>,
    ) -> Result<ExecutionReport, ExecutorError> {
        let started = Instant::now();
        let deadline = started + self.deadline;

        for plan in plans {
            if !clients.contains_key(&plan.corpus) {
                return Err(ExecutorError::MissingClient(plan.corpus.clone()));
            }
        }

        let run_futures: Vec<_> = plans
            .iter()
            .map(|plan| {
                let client = Arc::clone(&clients[&plan.corpus]);
                self.run_corpus(plan, client, deadline)
            })
            .collect();
        let runs = join_all(run_futures).await;

        let all_failed = !runs.is_empty() && runs.iter().all(|r| r.state == CorpusState::Failed);
        if all_failed {
            let errors = runs
                .into_iter()
                .map(|r| {
                    let detail = r
                        .stage_errors
                        .values()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join("; ");
                    (r.corpus, detail)
                })
                .collect();
            return Err(ExecutorError::AllCorporaFailed(errors));
        }

        let mut candidates = Vec::new();
        for run in &runs {
            metrics::CANDIDATES_COLLECTED
                .with_label_values(&[&run.corpus])
                .observe(run.candidates.len() as f64);
            candidates.extend(run.candidates.iter().cloned());
        }

        Ok(ExecutionReport {
            candidates,
            runs,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Run one corpus plan: sequential stages, early exit, deadline.
    async fn run_corpus(
        &self,
        plan: &CorpusQueryPlan,
        client: Arc<dyn CorpusClient>,
        deadline: Instant,
    ) -> CorpusRun {
        let total_stages = plan.stages.len();
        let mut state = advance(
            CorpusState::Pending,
            CorpusEvent::Start,
            total_stages,
            self.sufficiency_threshold,
        );
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stage_errors = HashMap::new();

        while let CorpusState::Running { stage, .. } = state {
            let stage_def = &plan.stages[stage];
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(corpus = %plan.corpus, stage = stage_def.kind.as_str(), "Deadline expired, skipping remaining stages");
                state = advance(
                    state,
                    CorpusEvent::DeadlineExpired,
                    total_stages,
                    self.sufficiency_threshold,
                );
                break;
            }

            debug!(
                corpus = %plan.corpus,
                stage = stage_def.kind.as_str(),
                query = %stage_def.query,
                "Running stage"
            );

            let outcome = tokio::time::timeout(
                remaining,
                client.search(&stage_def.query, stage_def.max_results),
            )
            .await;

            let errored = match outcome {
                Ok(Ok(raws)) => {
                    metrics::STAGE_CALLS
                        .with_label_values(&[&plan.corpus, stage_def.kind.as_str(), "success"])
                        .inc();
                    let stage_candidates = raws.into_iter().map(|raw| {
                        Candidate::from_raw(raw, &plan.corpus, plan.corpus_kind, stage_def)
                    });
                    merge_candidates(&mut candidates, &mut seen, stage_candidates);
                    false
                }
                Ok(Err(e)) => {
                    metrics::STAGE_CALLS
                        .with_label_values(&[&plan.corpus, stage_def.kind.as_str(), "error"])
                        .inc();
                    warn!(corpus = %plan.corpus, stage = stage_def.kind.as_str(), error = %e, "Stage failed");
                    stage_errors.insert(stage_def.kind.as_str().to_string(), e.to_string());
                    true
                }
                Err(_) => {
                    metrics::STAGE_CALLS
                        .with_label_values(&[&plan.corpus, stage_def.kind.as_str(), "timeout"])
                        .inc();
                    warn!(corpus = %plan.corpus, stage = stage_def.kind.as_str(), "Stage timed out at deadline");
                    stage_errors
                        .insert(stage_def.kind.as_str().to_string(), "deadline expired".into());
                    state = advance(
                        state,
                        CorpusEvent::DeadlineExpired,
                        total_stages,
                        self.sufficiency_threshold,
                    );
                    break;
                }
            };

            state = advance(
                state,
                CorpusEvent::StageCompleted {
                    collected: candidates.len(),
                    errored,
                },
                total_stages,
                self.sufficiency_threshold,
            );
        }

        debug!(
            corpus = %plan.corpus,
            state = ?state,
            collected = candidates.len(),
            "Corpus run finished"
        );

        CorpusRun {
            corpus: plan.corpus.clone(),
            state,
            candidates,
            stage_errors,
        }
    }
}

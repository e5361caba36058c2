//! Per-corpus execution state machine.
//!
//! Pure transition function, no I/O. The runner feeds it events and
//! reads back where to go next.

use serde::Serialize;

/// Why a corpus finished cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Enough unique candidates were collected, later stages skipped.
    Sufficient,
    /// All stages ran without reaching sufficiency.
    Exhausted,
    /// The global deadline cut the run short.
    DeadlineExpired,
}

/// Execution state of one corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusState {
    Pending,
    Running {
        /// Index of the stage about to run.
        stage: usize,
        /// Stages so far that errored.
        errors: usize,
    },
    Done {
        reason: CompletionReason,
    },
    /// Every executed stage errored.
    Failed,
}

/// Events driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusEvent {
    Start,
    StageCompleted {
        /// Unique candidates collected so far across stages.
        collected: usize,
        /// Whether this stage errored (treated as zero results).
        errored: bool,
    },
    DeadlineExpired,
}

/// Advance the state machine by one event.
pub fn advance(
    state: CorpusState,
    event: CorpusEvent,
    total_stages: usize,
    sufficiency: usize,
) -> CorpusState {
    match (state, event) {
        (CorpusState::Pending, CorpusEvent::Start) => {
            if total_stages == 0 {
                CorpusState::Done {
                    reason: CompletionReason::Exhausted,
                }
            } else {
                CorpusState::Running { stage: 0, errors: 0 }
            }
        }
        (CorpusState::Running { stage, errors }, CorpusEvent::StageCompleted { collected, errored }) => {
            let errors = errors + usize::from(errored);
            let next_stage = stage + 1;
            if collected >= sufficiency {
                CorpusState::Done {
                    reason: CompletionReason::Sufficient,
                }
            } else if next_stage >= total_stages {
                if errors == total_stages {
                    CorpusState::Failed
                } else {
                    CorpusState::Done {
                        reason: CompletionReason::Exhausted,
                    }
                }
            } else {
                CorpusState::Running {
                    stage: next_stage,
                    errors,
                }
            }
        }
        (CorpusState::Running { .. }, CorpusEvent::DeadlineExpired) => CorpusState::Done {
            reason: CompletionReason::DeadlineExpired,
        },
        // Terminal states and out-of-order events keep the state as-is.
        (state, _) => state,
    }
}

//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Pipeline (searches, durations, result counts)
//! - Executor (per-corpus stage calls and errors)
//! - Selector (confidence distribution)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Searches total by result.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("scout_searches_total", "Total searches executed"),
        &["result"], // "success", "empty", "failed"
    )
    .unwrap()
});

/// Search duration in seconds.
pub static SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("scout_search_duration_seconds", "Duration of full searches")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

/// Ranked results returned per search.
pub static RESULTS_RETURNED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "scout_results_returned",
            "Number of ranked results returned per search",
        )
        .buckets(vec![0.0, 1.0, 3.0, 5.0, 10.0, 15.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Executor Metrics
// =============================================================================

/// Stage calls total by corpus, stage and status.
pub static STAGE_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("scout_stage_calls_total", "Total query stage executions"),
        &["corpus", "stage", "status"], // status: "success", "error", "timeout"
    )
    .unwrap()
});

/// Candidates collected per corpus after deduplication.
pub static CANDIDATES_COLLECTED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "scout_candidates_collected",
            "Unique candidates collected per corpus",
        )
        .buckets(vec![0.0, 1.0, 3.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["corpus"],
    )
    .unwrap()
});

// =============================================================================
// Selector Metrics
// =============================================================================

/// Top selection confidence per search.
pub static SELECTION_CONFIDENCE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "scout_selection_confidence",
            "Distribution of top corpus selection confidence",
        )
        .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(RESULTS_RETURNED.clone()),
        Box::new(STAGE_CALLS.clone()),
        Box::new(CANDIDATES_COLLECTED.clone()),
        Box::new(SELECTION_CONFIDENCE.clone()),
    ]
}

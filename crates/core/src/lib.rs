//! Core library for the scout search service.
//!
//! Plans queries against document and ticket corpora, executes them
//! with progressive widening, and ranks the merged results by quality.

pub mod config;
pub mod corpus;
pub mod executor;
pub mod keywords;
pub mod metrics;
pub mod pipeline;
pub mod ranker;
pub mod scorer;
pub mod selector;
pub mod strategy;
pub mod testing;

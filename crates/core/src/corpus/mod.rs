//! Corpus clients: the backends that actually run queries.

mod confluence;
mod jira;
mod types;

pub use confluence::*;
pub use jira::*;
pub use types::*;

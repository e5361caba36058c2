//! Query strategy construction: progressive per-corpus query stages.

mod builder;
mod types;

pub use builder::*;
pub use types::*;

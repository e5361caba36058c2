use std::sync::Arc;

use scout_core::config::{Config, SanitizedConfig};
use scout_core::pipeline::SearchPipeline;

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<SearchPipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: Arc<SearchPipeline>) -> Self {
        Self { config, pipeline }
    }

    pub fn pipeline(&self) -> &SearchPipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }
}

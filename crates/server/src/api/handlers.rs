use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use scout_core::config::{SanitizedConfig, SanitizedCorpusConfig};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

#[derive(Serialize)]
pub struct CorporaResponse {
    pub corpora: Vec<SanitizedCorpusConfig>,
}

pub async fn list_corpora(State(state): State<Arc<AppState>>) -> Json<CorporaResponse> {
    Json(CorporaResponse {
        corpora: state.sanitized_config().corpora,
    })
}

pub async fn get_metrics() -> String {
    encode_metrics()
}

//! Search API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use scout_core::pipeline::PipelineError;
use scout_core::ranker::QualityDistribution;
use scout_core::scorer::ScoredCandidate;
use scout_core::strategy::SearchOptions;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub options: SearchOptions,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ScoredCandidate>,
    pub distribution: QualityDistribution,
    pub summary: String,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// POST /api/v1/search
///
/// Run the full search pipeline for a query.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    let started = Instant::now();

    match state.pipeline().search(&body.query, &body.options).await {
        Ok(set) => Ok(Json(SearchResponse {
            query: body.query,
            results: set.results,
            distribution: set.distribution,
            summary: set.summary,
            duration_ms: started.elapsed().as_millis() as u64,
        })),
        Err(e) => {
            let status = match &e {
                PipelineError::EmptyQuery => StatusCode::BAD_REQUEST,
                PipelineError::NoCorporaConfigured => StatusCode::SERVICE_UNAVAILABLE,
                PipelineError::AllCorporaFailed(_) => StatusCode::BAD_GATEWAY,
                PipelineError::MissingClient(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

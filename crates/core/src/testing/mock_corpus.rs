//! Mock corpus client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::corpus::{CorpusClient, CorpusError, RawCandidate};

/// One scripted response in the queue.
struct ScriptedResponse {
    result: Result<Vec<RawCandidate>, String>,
    delay: Option<Duration>,
}

/// Mock implementation of the CorpusClient trait.
///
/// Provides controllable behavior for testing:
/// - Scripted per-call responses, consumed in order
/// - Default results once the script runs out
/// - Recorded queries and call counts for assertions
/// - Simulated failures and delays
pub struct MockCorpusClient {
    /// Scripted responses, popped front on each call.
    script: Arc<RwLock<Vec<ScriptedResponse>>>,
    /// Returned when the script is empty.
    default_results: Arc<RwLock<Vec<RawCandidate>>>,
    /// Recorded query strings.
    queries: Arc<RwLock<Vec<String>>>,
}

impl std::fmt::Debug for MockCorpusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCorpusClient").finish()
    }
}

impl Default for MockCorpusClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCorpusClient {
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(Vec::new())),
            default_results: Arc::new(RwLock::new(Vec::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a successful response.
    pub async fn push_results(&self, results: Vec<RawCandidate>) {
        self.script.write().await.push(ScriptedResponse {
            result: Ok(results),
            delay: None,
        });
    }

    /// Queue a successful response that takes `delay` to arrive.
    pub async fn push_delayed_results(&self, results: Vec<RawCandidate>, delay: Duration) {
        self.script.write().await.push(ScriptedResponse {
            result: Ok(results),
            delay: Some(delay),
        });
    }

    /// Queue a failing response.
    pub async fn push_error(&self, message: &str) {
        self.script.write().await.push(ScriptedResponse {
            result: Err(message.to_string()),
            delay: None,
        });
    }

    /// Set the results returned once the script is exhausted.
    pub async fn set_default_results(&self, results: Vec<RawCandidate>) {
        *self.default_results.write().await = results;
    }

    /// Recorded query strings, in call order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Number of search calls made.
    pub async fn call_count(&self) -> usize {
        self.queries.read().await.len()
    }
}

#[async_trait]
impl CorpusClient for MockCorpusClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<RawCandidate>, CorpusError> {
        self.queries.write().await.push(query.to_string());

        let scripted = {
            let mut script = self.script.write().await;
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        };

        match scripted {
            Some(response) => {
                if let Some(delay) = response.delay {
                    tokio::time::sleep(delay).await;
                }
                match response.result {
                    Ok(results) => {
                        Ok(results.into_iter().take(max_results as usize).collect())
                    }
                    Err(message) => Err(CorpusError::ApiError(message)),
                }
            }
            None => Ok(self
                .default_results
                .read()
                .await
                .iter()
                .take(max_results as usize)
                .cloned()
                .collect()),
        }
    }
}

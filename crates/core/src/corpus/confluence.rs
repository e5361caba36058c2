//! Confluence-style CQL backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::CorpusHttpConfig;

use super::{CorpusClient, CorpusError, RawCandidate};

/// CQL search client for a Confluence-style wiki.
pub struct CqlClient {
    client: Client,
    config: CorpusHttpConfig,
}

impl CqlClient {
    pub fn new(config: CorpusHttpConfig) -> Result<Self, CorpusError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| CorpusError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn build_search_url(&self, cql: &str, limit: u32) -> String {
        format!(
            "{}/rest/api/content/search?cql={}&limit={}&expand=version,history,space",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(cql),
            limit
        )
    }
}

#[async_trait]
impl CorpusClient for CqlClient {
    fn name(&self) -> &str {
        "cql"
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<RawCandidate>, CorpusError> {
        let url = self.build_search_url(query, max_results);
        debug!(cql = %query, limit = max_results, "Searching wiki");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CorpusError::Timeout
                } else if e.is_connect() {
                    CorpusError::ConnectionFailed(e.to_string())
                } else {
                    CorpusError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(CorpusError::InvalidQuery(
                body.chars().take(200).collect::<String>(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CorpusError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let search_response: CqlSearchResponse = response
            .json()
            .await
            .map_err(|e| CorpusError::ApiError(format!("Failed to parse response: {e}")))?;

        debug!(
            results = search_response.results.len(),
            "Wiki search complete"
        );

        let base_url = self.config.url.trim_end_matches('/').to_string();
        Ok(search_response
            .results
            .into_iter()
            .map(|r| {
                let url = r
                    .links
                    .as_ref()
                    .and_then(|l| l.webui.as_ref())
                    .map(|path| format!("{base_url}{path}"));
                RawCandidate {
                    id: r.id,
                    title: r.title,
                    snippet: r.excerpt.unwrap_or_default(),
                    kind: r.content_type,
                    status: r.status,
                    created_at: r
                        .history
                        .as_ref()
                        .and_then(|h| h.created_date.as_deref())
                        .and_then(parse_timestamp),
                    updated_at: r
                        .version
                        .as_ref()
                        .and_then(|v| v.when.as_deref())
                        .and_then(parse_timestamp),
                    url,
                    weight: 1.0,
                }
            })
            .collect())
    }
}

/// Parse backend timestamps, RFC 3339 first then the legacy offset form.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

#[derive(Debug, Deserialize)]
struct CqlSearchResponse {
    #[serde(default)]
    results: Vec<CqlResult>,
}

#[derive(Debug, Deserialize)]
struct CqlResult {
    id: String,
    title: String,
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    version: Option<CqlVersion>,
    #[serde(default)]
    history: Option<CqlHistory>,
    #[serde(default, rename = "_links")]
    links: Option<CqlLinks>,
}

#[derive(Debug, Deserialize)]
struct CqlVersion {
    #[serde(default)]
    when: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CqlHistory {
    #[serde(default, rename = "createdDate")]
    created_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CqlLinks {
    #[serde(default)]
    webui: Option<String>,
}

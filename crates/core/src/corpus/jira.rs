//! Jira-style JQL backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::CorpusHttpConfig;

use super::{CorpusClient, CorpusError, RawCandidate};

const SNIPPET_MAX_CHARS: usize = 300;

/// JQL search client for a Jira-style issue tracker.
pub struct JqlClient {
    client: Client,
    config: CorpusHttpConfig,
}

impl JqlClient {
    pub fn new(config: CorpusHttpConfig) -> Result<Self, CorpusError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| CorpusError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/rest/api/2/search",
            self.config.url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CorpusClient for JqlClient {
    fn name(&self) -> &str {
        "jql"
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<RawCandidate>, CorpusError> {
        debug!(jql = %query, limit = max_results, "Searching tracker");

        let request = JqlSearchRequest {
            jql: query.to_string(),
            max_results,
            fields: vec![
                "summary".to_string(),
                "description".to_string(),
                "status".to_string(),
                "issuetype".to_string(),
                "created".to_string(),
                "updated".to_string(),
            ],
        };

        let response = self
            .client
            .post(self.search_url())
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .json(&request)
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

        let search_response: JqlSearchResponse = response
            .json()
            .await
            .map_err(|e| CorpusError::ApiError(format!("Failed to parse response: {e}")))?;

        debug!(
            results = search_response.issues.len(),
            "Tracker search complete"
        );

        let base_url = self.config.url.trim_end_matches('/').to_string();
        Ok(search_response
            .issues
            .into_iter()
            .map(|issue| {
                let url = format!("{}/browse/{}", base_url, issue.key);
                RawCandidate {
                    title: issue.fields.summary.unwrap_or_default(),
                    snippet: issue
                        .fields
                        .description
                        .map(|d| d.chars().take(SNIPPET_MAX_CHARS).collect())
                        .unwrap_or_default(),
                    kind: issue
                        .fields
                        .issuetype
                        .map(|t| t.name)
                        .unwrap_or_else(|| "issue".to_string()),
                    status: issue.fields.status.map(|s| s.name),
                    created_at: issue.fields.created.as_deref().and_then(parse_timestamp),
                    updated_at: issue.fields.updated.as_deref().and_then(parse_timestamp),
                    url: Some(url),
                    weight: 1.0,
                    id: issue.key,
                }
            })
            .collect())
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

#[derive(Debug, Serialize)]
struct JqlSearchRequest {
    jql: String,
    #[serde(rename = "maxResults")]
    max_results: u32,
    fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JqlSearchResponse {
    #[serde(default)]
    issues: Vec<JqlIssue>,
}

#[derive(Debug, Deserialize)]
struct JqlIssue {
    key: String,
    fields: JqlFields,
}

#[derive(Debug, Deserialize)]
struct JqlFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<JqlNamed>,
    #[serde(default)]
    issuetype: Option<JqlNamed>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JqlNamed {
    name: String,
}

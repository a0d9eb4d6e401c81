//! Evidence retrieval collaborator
//!
//! Given claim text, returns a small ordered list of web search snippets.
//! An empty result set means "no external evidence" - it is data, not an
//! error. Retry policy lives here, in the collaborator, never in the
//! verification manager.

use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use truststack_core::SearchHit;

/// Evidence retrieval errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API key not configured")]
    MissingApiKey,

    #[error("Search request failed: {0}")]
    Request(String),

    #[error("Search API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Retrieves external evidence snippets for a claim
#[async_trait]
pub trait EvidenceRetriever: Send + Sync {
    async fn retrieve(&self, claim: &str) -> Result<Vec<SearchHit>, SearchError>;
}

/// Serper (Google Search API) client configuration
#[derive(Debug, Clone)]
pub struct SerperConfig {
    /// API key from https://serper.dev/
    pub api_key: String,
    /// Search endpoint
    pub endpoint: String,
    /// Evidence snippets to retrieve per claim
    pub results_per_claim: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SerperConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: "https://google.serper.dev/search".to_string(),
            results_per_claim: 3,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Serper-backed evidence retriever with an in-memory query cache.
///
/// Claims repeat across scoring passes of the same site; caching keeps the
/// per-run search bill flat.
pub struct SerperClient {
    config: SerperConfig,
    http: reqwest::Client,
    cache: DashMap<String, Vec<SearchHit>>,
}

impl SerperClient {
    pub fn new(config: SerperConfig) -> Result<Self, SearchError> {
        if config.api_key.is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Request(e.to_string()))?;

        Ok(Self {
            config,
            http,
            cache: DashMap::new(),
        })
    }

    async fn search_once(&self, claim: &str) -> Result<Vec<SearchHit>, SearchError> {
        let payload = serde_json::json!({
            "q": claim,
            "num": self.config.results_per_claim,
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("X-API-KEY", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api { status, body });
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        Ok(parsed
            .organic
            .into_iter()
            .take(self.config.results_per_claim)
            .map(|r| SearchHit {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
            })
            .collect())
    }
}

#[async_trait]
impl EvidenceRetriever for SerperClient {
    async fn retrieve(&self, claim: &str) -> Result<Vec<SearchHit>, SearchError> {
        if let Some(cached) = self.cache.get(claim) {
            debug!(claim, "evidence cache hit");
            return Ok(cached.clone());
        }

        let hits = match self.search_once(claim).await {
            Ok(hits) => hits,
            Err(first) => {
                // One jittered retry; transient 5xx/timeouts are common here
                warn!(claim, error = %first, "search failed, retrying once");
                let jitter = rand::thread_rng().gen_range(100..400);
                tokio::time::sleep(Duration::from_millis(jitter)).await;
                self.search_once(claim).await?
            }
        };

        debug!(claim, hits = hits.len(), "retrieved evidence");
        self.cache.insert(claim.to_string(), hits.clone());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_rejected() {
        let result = SerperClient::new(SerperConfig::new(""));
        assert!(matches!(result, Err(SearchError::MissingApiKey)));
    }

    #[test]
    fn test_response_parsing_tolerates_missing_fields() {
        let raw = r#"{"organic": [{"title": "Acme", "link": "https://acme.example"}]}"#;
        let parsed: SerperResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.organic.len(), 1);
        assert_eq!(parsed.organic[0].snippet, "");
    }

    #[test]
    fn test_empty_response_is_not_an_error() {
        let parsed: SerperResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.organic.is_empty());
    }
}

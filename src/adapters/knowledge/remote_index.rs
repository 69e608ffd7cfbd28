//! Remote Index - KnowledgeIndex backed by a retrieval service over HTTP.
//!
//! The service holds the embedded mandatory-list corpus and answers semantic
//! search requests. One client instance serves one index; the English and
//! Arabic corpora are exposed as separate collections, so production wires
//! two clients into the catalog.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::analysis::{EvidencePassage, PassageMetadata};
use crate::ports::{IndexError, KnowledgeIndex};

/// Configuration for a remote index client.
#[derive(Debug, Clone)]
pub struct RemoteIndexConfig {
    /// Base URL of the retrieval service.
    pub base_url: String,
    /// Collection to query (e.g., "mandatory_list_en").
    pub collection: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl RemoteIndexConfig {
    /// Creates a configuration for the given service and collection.
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for one collection of the retrieval service.
pub struct RemoteIndex {
    config: RemoteIndexConfig,
    client: Client,
}

impl RemoteIndex {
    /// Creates a client for the configured collection.
    pub fn new(config: RemoteIndexConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn query_url(&self) -> String {
        format!(
            "{}/collections/{}/query",
            self.config.base_url, self.config.collection
        )
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, IndexError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            500..=599 => Err(IndexError::unavailable(format!(
                "Server error {}: {}",
                status, body
            ))),
            _ => Err(IndexError::network(format!(
                "Unexpected status {}: {}",
                status, body
            ))),
        }
    }
}

#[async_trait]
impl KnowledgeIndex for RemoteIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<EvidencePassage>, IndexError> {
        let request = QueryRequest {
            query: query.to_string(),
            top_k,
        };

        let response = self
            .client
            .post(self.query_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IndexError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else {
                    IndexError::network(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| IndexError::parse(format!("Failed to parse response: {}", e)))?;

        Ok(body.passages.into_iter().map(WirePassage::into_domain).collect())
    }
}

// ----- Retrieval service wire types -----

#[derive(Debug, Serialize)]
struct QueryRequest {
    query: String,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    passages: Vec<WirePassage>,
}

#[derive(Debug, Deserialize)]
struct WirePassage {
    body: String,
    #[serde(default)]
    metadata: WireMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct WireMetadata {
    #[serde(default)]
    commodity_title_en: String,
    #[serde(default)]
    commodity_title_ar: String,
    #[serde(default)]
    local_content_baseline: String,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl WirePassage {
    fn into_domain(self) -> EvidencePassage {
        let mut metadata = PassageMetadata::new(
            self.metadata.commodity_title_en,
            self.metadata.commodity_title_ar,
            self.metadata.local_content_baseline,
        );
        // Extra corpus fields pass through as text.
        metadata.extra = self
            .metadata
            .extra
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();
        EvidencePassage::new(self.body, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_targets_collection() {
        let index = RemoteIndex::new(RemoteIndexConfig::new(
            "http://retrieval:8100",
            "mandatory_list_ar",
        ));
        assert_eq!(
            index.query_url(),
            "http://retrieval:8100/collections/mandatory_list_ar/query"
        );
    }

    #[test]
    fn response_parses_passages_with_extra_metadata() {
        let body = r#"{
            "passages": [{
                "body": "Copper wire, insulated",
                "metadata": {
                    "commodity_title_en": "Copper Wire",
                    "commodity_title_ar": "أسلاك نحاسية",
                    "local_content_baseline": "30%",
                    "hs_code": "8544.11"
                }
            }]
        }"#;

        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        let passage = parsed.passages.into_iter().next().unwrap().into_domain();

        assert_eq!(passage.body, "Copper wire, insulated");
        assert_eq!(passage.metadata.commodity_title_en, "Copper Wire");
        assert_eq!(passage.metadata.local_content_baseline, "30%");
        assert_eq!(passage.metadata.extra["hs_code"], "8544.11");
    }

    #[test]
    fn missing_passages_field_is_empty() {
        let parsed: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.passages.is_empty());
    }
}

//! Knowledge index configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Retrieval service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    /// Base URL of the retrieval service
    #[serde(default = "default_retrieval_url")]
    pub retrieval_url: String,

    /// English corpus collection name
    #[serde(default = "default_en_collection")]
    pub en_collection: String,

    /// Arabic corpus collection name; unset disables Arabic lookups
    pub ar_collection: Option<String>,

    /// Passages fetched per item lookup
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Lookup timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl KnowledgeConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate knowledge configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.retrieval_url.starts_with("http://") && !self.retrieval_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidRetrievalUrl);
        }
        if self.en_collection.trim().is_empty() {
            return Err(ValidationError::MissingRequired("KNOWLEDGE__EN_COLLECTION"));
        }
        Ok(())
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            retrieval_url: default_retrieval_url(),
            en_collection: default_en_collection(),
            ar_collection: Some("mandatory_list_ar".to_string()),
            top_k: default_top_k(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_retrieval_url() -> String {
    "http://localhost:8100".to_string()
}

fn default_en_collection() -> String {
    "mandatory_list_en".to_string()
}

fn default_top_k() -> usize {
    3
}

fn default_timeout() -> u64 {
    15
}

//! Conversation storage configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Conversation store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Database URL in sqlx form, e.g. `sqlite://conversations.db`
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://conversations.db?mode=rwc".to_string()
}

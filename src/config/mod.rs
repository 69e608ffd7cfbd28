//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is loaded
//! with the `LISTING_ADVISOR` prefix and nested values use double underscores
//! as separators.
//!
//! # Example
//!
//! ```no_run
//! use listing_advisor::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod knowledge;
mod server;
mod storage;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use knowledge::KnowledgeConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections. Load using [`AppConfig::load()`],
/// which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI provider configuration (Gemini)
    #[serde(default)]
    pub ai: AiConfig,

    /// Knowledge index configuration (retrieval service)
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Conversation storage configuration (SQLite)
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `LISTING_ADVISOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LISTING_ADVISOR__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `LISTING_ADVISOR__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key = ...`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LISTING_ADVISOR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.knowledge.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("LISTING_ADVISOR__AI__GEMINI_API_KEY", "test-key");
    }

    fn clear_env() {
        env::remove_var("LISTING_ADVISOR__AI__GEMINI_API_KEY");
        env::remove_var("LISTING_ADVISOR__SERVER__PORT");
        env::remove_var("LISTING_ADVISOR__SERVER__ENVIRONMENT");
        env::remove_var("LISTING_ADVISOR__SERVER__CONVERSATION_ID");
    }

    #[test]
    fn loads_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.gemini_api_key.as_deref(), Some("test-key"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn server_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.conversation_id, "1");
    }

    #[test]
    fn custom_port_overrides_default() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("LISTING_ADVISOR__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().server.port, 3000);
    }

    #[test]
    fn missing_api_key_fails_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }
}

//! Knowledge Index Port - Interface to the reference-corpus search indexes.
//!
//! The regulated-commodities corpus is partitioned by language: one semantic
//! index for English entries, one for Arabic. The pipeline consumes the
//! indexes through this port and never implements search itself. Absence of
//! an index for a language is a valid configuration state, not a fault.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::analysis::{EvidencePassage, Language};

/// Number of passages requested per item lookup.
pub const DEFAULT_TOP_K: usize = 3;

/// Port for semantic lookup against one language's corpus index.
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    /// Returns the `top_k` nearest passages for the query, best first.
    ///
    /// Results are passed through unfiltered: no re-ranking, no similarity
    /// threshold. An empty result is valid.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<EvidencePassage>, IndexError>;
}

/// Per-language index registry handed to the retriever at startup.
///
/// Either slot may be empty; items in a language without an index simply get
/// no evidence.
#[derive(Clone, Default)]
pub struct IndexCatalog {
    en: Option<Arc<dyn KnowledgeIndex>>,
    ar: Option<Arc<dyn KnowledgeIndex>>,
}

impl IndexCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the English index.
    pub fn with_english(mut self, index: Arc<dyn KnowledgeIndex>) -> Self {
        self.en = Some(index);
        self
    }

    /// Registers the Arabic index.
    pub fn with_arabic(mut self, index: Arc<dyn KnowledgeIndex>) -> Self {
        self.ar = Some(index);
        self
    }

    /// Returns the index for a language, if configured.
    pub fn for_language(&self, language: Language) -> Option<&Arc<dyn KnowledgeIndex>> {
        match language {
            Language::En => self.en.as_ref(),
            Language::Ar => self.ar.as_ref(),
        }
    }
}

/// Knowledge index errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Index backend is unavailable.
    #[error("index unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Network error during lookup.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse index response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Lookup timed out.
    #[error("lookup timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl IndexError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::PassageMetadata;

    struct StaticIndex;

    #[async_trait]
    impl KnowledgeIndex for StaticIndex {
        async fn search(
            &self,
            _query: &str,
            top_k: usize,
        ) -> Result<Vec<EvidencePassage>, IndexError> {
            Ok(vec![
                EvidencePassage::new(
                    "Copper wire, insulated",
                    PassageMetadata::new("Copper Wire", "أسلاك نحاسية", "30%"),
                );
                top_k.min(1)
            ])
        }
    }

    #[test]
    fn empty_catalog_has_no_indexes() {
        let catalog = IndexCatalog::new();
        assert!(catalog.for_language(Language::En).is_none());
        assert!(catalog.for_language(Language::Ar).is_none());
    }

    #[test]
    fn catalog_routes_by_language() {
        let catalog = IndexCatalog::new().with_english(Arc::new(StaticIndex));
        assert!(catalog.for_language(Language::En).is_some());
        assert!(catalog.for_language(Language::Ar).is_none());
    }

    #[tokio::test]
    async fn registered_index_answers_searches() {
        let catalog = IndexCatalog::new().with_english(Arc::new(StaticIndex));
        let index = catalog.for_language(Language::En).unwrap();
        let passages = index.search("copper wire", DEFAULT_TOP_K).await.unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].metadata.commodity_title_en, "Copper Wire");
    }
}

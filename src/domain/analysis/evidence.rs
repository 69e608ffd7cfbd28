//! Evidence passages returned by the knowledge indexes.
//!
//! Passages are read-only retrieval output. They live for the duration of one
//! turn and are never persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured metadata attached to a corpus passage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMetadata {
    /// Commodity title in English.
    pub commodity_title_en: String,
    /// Commodity title in Arabic.
    pub commodity_title_ar: String,
    /// Manufacturer local-content minimum baseline field. Textual values such
    /// as "Required", "Yes", "يشترط" or an explicit percentage indicate a
    /// certificate requirement; negatives or empty values indicate none.
    pub local_content_baseline: String,
    /// Any further corpus fields, passed through verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl PassageMetadata {
    /// Creates metadata with the three mandatory fields.
    pub fn new(
        commodity_title_en: impl Into<String>,
        commodity_title_ar: impl Into<String>,
        local_content_baseline: impl Into<String>,
    ) -> Self {
        Self {
            commodity_title_en: commodity_title_en.into(),
            commodity_title_ar: commodity_title_ar.into(),
            local_content_baseline: local_content_baseline.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Adds an extra metadata field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// One retrieved passage with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidencePassage {
    /// Passage body text as indexed.
    pub body: String,
    /// Structured corpus metadata.
    pub metadata: PassageMetadata,
}

impl EvidencePassage {
    /// Creates a passage.
    pub fn new(body: impl Into<String>, metadata: PassageMetadata) -> Self {
        Self {
            body: body.into(),
            metadata,
        }
    }
}

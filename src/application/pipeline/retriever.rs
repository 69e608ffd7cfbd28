//! Stage 2: Evidence Retriever.
//!
//! For each extracted item, queries the knowledge index matching its language
//! tag. Items whose language has no configured index get an empty evidence
//! sequence, as do items whose lookup fails; neither aborts the turn or
//! affects sibling items. Lookups fan out concurrently and the result map is
//! assembled deterministically regardless of completion order.

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::analysis::{EvidencePassage, Language};
use crate::ports::{IndexCatalog, DEFAULT_TOP_K};

/// Retrieves per-item evidence from the language-partitioned indexes.
pub struct EvidenceRetriever {
    catalog: Arc<IndexCatalog>,
    top_k: usize,
}

impl EvidenceRetriever {
    /// Creates a retriever over the given index catalog with the default k.
    pub fn new(catalog: Arc<IndexCatalog>) -> Self {
        Self {
            catalog,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Overrides the number of passages fetched per item.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Looks up evidence for every item. The returned map always contains an
    /// entry for every input item, possibly with an empty sequence.
    pub async fn retrieve(
        &self,
        items: &BTreeMap<String, Language>,
    ) -> BTreeMap<String, Vec<EvidencePassage>> {
        if items.is_empty() {
            return BTreeMap::new();
        }

        let lookups = items.iter().map(|(item, language)| {
            let item = item.clone();
            let language = *language;
            async move {
                let passages = self.lookup_one(&item, language).await;
                (item, passages)
            }
        });

        join_all(lookups).await.into_iter().collect()
    }

    async fn lookup_one(&self, item: &str, language: Language) -> Vec<EvidencePassage> {
        let Some(index) = self.catalog.for_language(language) else {
            debug!(item, language = %language, "no index configured for language, skipping");
            return Vec::new();
        };

        match index.search(item, self.top_k).await {
            Ok(passages) => {
                debug!(item, count = passages.len(), "retrieved evidence");
                passages
            }
            Err(e) => {
                warn!(item, error = %e, "evidence lookup failed, item gets no evidence");
                Vec::new()
            }
        }
    }
}

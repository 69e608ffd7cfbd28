//! In-Memory Index - corpus index backed by a plain passage list.
//!
//! Scores passages by case-insensitive token overlap between the query and
//! the passage body plus commodity titles, returning the top-k best matches.
//! Used by tests and by offline deployments that load the corpus from disk;
//! the production retrieval service implements the same port remotely.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::analysis::EvidencePassage;
use crate::ports::{IndexError, KnowledgeIndex};

/// Knowledge index over an in-process passage list.
pub struct InMemoryIndex {
    passages: Vec<EvidencePassage>,
    queries: Mutex<Vec<String>>,
}

impl InMemoryIndex {
    /// Creates an index over the given passages.
    pub fn new(passages: Vec<EvidencePassage>) -> Self {
        Self {
            passages,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn score(query: &str, passage: &EvidencePassage) -> usize {
        let haystack = format!(
            "{} {} {}",
            passage.body, passage.metadata.commodity_title_en, passage.metadata.commodity_title_ar
        )
        .to_lowercase();
        let haystack_tokens: Vec<&str> = haystack.split_whitespace().collect();

        query
            .to_lowercase()
            .split_whitespace()
            .filter(|token| haystack_tokens.contains(token))
            .count()
    }
}

#[async_trait]
impl KnowledgeIndex for InMemoryIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<EvidencePassage>, IndexError> {
        self.queries.lock().unwrap().push(query.to_string());

        let mut scored: Vec<(usize, &EvidencePassage)> = self
            .passages
            .iter()
            .map(|p| (Self::score(query, p), p))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Highest overlap first; ties keep corpus order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, p)| p.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::PassageMetadata;

    fn corpus() -> Vec<EvidencePassage> {
        vec![
            EvidencePassage::new(
                "Copper wire, insulated, for electrical installations",
                PassageMetadata::new("Copper Wire", "أسلاك نحاسية", "30%"),
            ),
            EvidencePassage::new(
                "Steel pipes and fittings for construction",
                PassageMetadata::new("Steel Pipes", "أنابيب فولاذية", "Not Required"),
            ),
            EvidencePassage::new(
                "Aluminum sheets, rolled",
                PassageMetadata::new("Aluminum Sheets", "ألواح ألمنيوم", "15%"),
            ),
        ]
    }

    #[tokio::test]
    async fn best_match_ranks_first() {
        let index = InMemoryIndex::new(corpus());
        let results = index.search("copper wire", 3).await.unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].metadata.commodity_title_en, "Copper Wire");
    }

    #[tokio::test]
    async fn top_k_caps_result_count() {
        let index = InMemoryIndex::new(corpus());
        let results = index.search("steel pipes copper wire aluminum sheets", 2).await.unwrap();
        assert!(results.len() <= 2);
    }

    #[tokio::test]
    async fn unrelated_query_returns_empty() {
        let index = InMemoryIndex::new(corpus());
        let results = index.search("quantum flux capacitor", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn arabic_title_is_searchable() {
        let index = InMemoryIndex::new(corpus());
        let results = index.search("أسلاك نحاسية", 3).await.unwrap();
        assert_eq!(results[0].metadata.commodity_title_ar, "أسلاك نحاسية");
    }

    #[tokio::test]
    async fn queries_are_recorded() {
        let index = InMemoryIndex::new(corpus());
        index.search("copper wire", 3).await.unwrap();
        index.search("steel pipes", 3).await.unwrap();
        assert_eq!(index.queries(), vec!["copper wire", "steel pipes"]);
    }
}

//! Per-turn pipeline state.
//!
//! One [`TurnState`] is owned by exactly one turn. The stages fill it in
//! strictly sequential order: extraction populates `product_items`, retrieval
//! fills `evidence_by_item`, synthesis fills `decisions_by_item`. By the time
//! the turn completes, the three maps share the same key set; items without
//! evidence still receive a (not-listed) decision.
//!
//! Maps are `BTreeMap` so assembly is deterministic regardless of the order
//! in which concurrent per-item work completes. Iteration order matters only
//! for report formatting, never for correctness.

use std::collections::BTreeMap;

use crate::domain::analysis::{Decision, EvidencePassage, Language};

/// Mutable state threaded through the four pipeline stages for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnState {
    /// Combined user text for this turn (typed text plus any attachment text).
    pub query_text: String,
    /// Extracted product names mapped to their detected language.
    pub product_items: BTreeMap<String, Language>,
    /// Retrieved evidence per item. Items whose language has no configured
    /// index, or whose lookup failed, map to an empty sequence.
    pub evidence_by_item: BTreeMap<String, Vec<EvidencePassage>>,
    /// Final decision per item.
    pub decisions_by_item: BTreeMap<String, Decision>,
}

impl TurnState {
    /// Creates turn state for the given combined query text.
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            ..Default::default()
        }
    }

    /// True when every extracted item has a decision.
    pub fn is_complete(&self) -> bool {
        self.product_items
            .keys()
            .all(|item| self.decisions_by_item.contains_key(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_with_no_items_is_complete() {
        let state = TurnState::new("hello");
        assert!(state.is_complete());
    }

    #[test]
    fn state_with_undecided_item_is_incomplete() {
        let mut state = TurnState::new("check copper wire");
        state
            .product_items
            .insert("copper wire".to_string(), Language::En);
        assert!(!state.is_complete());

        state.decisions_by_item.insert(
            "copper wire".to_string(),
            Decision::not_listed("copper wire", "no match"),
        );
        assert!(state.is_complete());
    }
}

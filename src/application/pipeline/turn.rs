//! Turn orchestration.
//!
//! One turn runs the four stages strictly in sequence over a single
//! [`TurnState`], loading the conversation record before the stages and
//! saving it after. Stage-local failures were already swallowed inside the
//! stages; the only error this layer surfaces is persistence failure, since
//! conversation continuity cannot be guaranteed without the store.
//!
//! Turns against the same conversation id are serialized with a
//! per-conversation async lock: a second turn waits for the in-flight one.
//! There is no mid-turn cancellation; a turn runs to completion or fails at
//! the save point without rolling back computed decisions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, instrument};

use crate::domain::analysis::{Decision, Language};
use crate::domain::conversation::{Message, TurnState};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationRecord, ConversationStore, IndexCatalog, LanguageModel, StoreError};

use super::aggregator::ReportAggregator;
use super::extractor::ItemExtractor;
use super::retriever::EvidenceRetriever;
use super::synthesizer::DecisionSynthesizer;

/// Errors a turn can surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// Conversation persistence failed before or after the stages.
    #[error("persistence failure: {0}")]
    Store(#[from] StoreError),
}

/// Result of one completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The agent's reply text (Report Aggregator output).
    pub reply: String,
    /// Items extracted this turn with their language tags.
    pub product_items: BTreeMap<String, Language>,
    /// Structured decision per item.
    pub decisions: BTreeMap<String, Decision>,
}

/// The four-stage pipeline plus conversation persistence.
pub struct TurnPipeline {
    extractor: ItemExtractor,
    retriever: EvidenceRetriever,
    synthesizer: DecisionSynthesizer,
    aggregator: ReportAggregator,
    store: Arc<dyn ConversationStore>,
    turn_locks: AsyncMutex<HashMap<ConversationId, Arc<AsyncMutex<()>>>>,
}

impl TurnPipeline {
    /// Wires the pipeline from its injected collaborators.
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        catalog: Arc<IndexCatalog>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            extractor: ItemExtractor::new(llm.clone()),
            retriever: EvidenceRetriever::new(catalog),
            synthesizer: DecisionSynthesizer::new(llm.clone()),
            aggregator: ReportAggregator::new(llm),
            store,
            turn_locks: AsyncMutex::new(HashMap::new()),
        }
    }

    /// Overrides the number of passages fetched per item.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.retriever = self.retriever.with_top_k(top_k);
        self
    }

    /// Runs one full turn for the given user message.
    ///
    /// The message is appended to the conversation log, the stages run in
    /// order, and the agent reply plus the turn's structured outputs are
    /// persisted before returning.
    #[instrument(skip(self, user_message), fields(conversation = %conversation_id))]
    pub async fn run_turn(
        &self,
        conversation_id: &ConversationId,
        user_message: Message,
    ) -> Result<TurnOutcome, TurnError> {
        let lock = self.lock_for(conversation_id).await;
        let _guard = lock.lock().await;

        let mut record = self
            .store
            .load(conversation_id)
            .await?
            .unwrap_or_else(|| ConversationRecord::new(conversation_id.clone()));

        let mut state = TurnState::new(user_message.combined_query_text());
        record.append_message(user_message);

        state.product_items = self.extractor.extract(&state.query_text).await;
        state.evidence_by_item = self.retriever.retrieve(&state.product_items).await;
        state.decisions_by_item = self
            .synthesizer
            .synthesize(&state.product_items, &state.evidence_by_item)
            .await;
        let reply = self.aggregator.aggregate(&state.decisions_by_item).await;

        debug_assert!(state.is_complete());

        record.append_message(Message::agent(reply.clone()));
        record.last_products = state.product_items.clone();
        record.last_decisions = state.decisions_by_item.clone();
        self.store.save(&record).await?;

        info!(
            items = state.product_items.len(),
            "turn completed and persisted"
        );

        Ok(TurnOutcome {
            reply,
            product_items: state.product_items,
            decisions: state.decisions_by_item,
        })
    }

    /// Returns the ordered message log, empty for a fresh conversation.
    pub async fn history(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, TurnError> {
        Ok(self
            .store
            .load(conversation_id)
            .await?
            .map(|record| record.messages)
            .unwrap_or_default())
    }

    /// Deletes all persisted state for the conversation, including its turn
    /// lock, so cleared ids do not accumulate in the lock map.
    ///
    /// Returns true when a record existed and was removed.
    pub async fn clear(&self, conversation_id: &ConversationId) -> Result<bool, TurnError> {
        let lock = self.lock_for(conversation_id).await;
        let guard = lock.lock().await;
        let deleted = self.store.delete(conversation_id).await?;
        drop(guard);

        // Clones are only handed out under the map lock, so the count cannot
        // rise while we check it. Two references mean the map entry and ours.
        let mut locks = self.turn_locks.lock().await;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(conversation_id);
        }

        Ok(deleted)
    }

    async fn lock_for(&self, conversation_id: &ConversationId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        locks
            .entry(conversation_id.clone())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockLanguageModel;
    use crate::adapters::knowledge::InMemoryIndex;
    use crate::adapters::storage::InMemoryStore;
    use crate::domain::analysis::{EvidencePassage, PassageMetadata};
    use crate::domain::conversation::MessageRole;
    use crate::ports::ConversationStore as _;

    fn copper_corpus() -> Arc<InMemoryIndex> {
        Arc::new(InMemoryIndex::new(vec![EvidencePassage::new(
            "Copper wire, insulated, for electrical installations",
            PassageMetadata::new("Copper Wire", "أسلاك نحاسية", "30%"),
        )]))
    }

    fn scripted_llm() -> Arc<MockLanguageModel> {
        Arc::new(MockLanguageModel::with_keyed_responses(vec![
            (
                "User query:",
                r#"{"products": [{"name": "copper wire"}]}"#,
            ),
            (
                "Product Item: copper wire",
                r#"{"item": "copper wire", "listed": true, "certificate_required": true, "reasoning": "Matches 'Copper Wire'; baseline is 30%."}"#,
            ),
            (
                "analysis results",
                "Copper wire is listed in the mandatory list and requires a Local Content Certificate (baseline 30%).",
            ),
        ]))
    }

    fn pipeline_with(llm: Arc<MockLanguageModel>) -> (TurnPipeline, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(IndexCatalog::new().with_english(copper_corpus()));
        let pipeline = TurnPipeline::new(llm, catalog, store.clone());
        (pipeline, store)
    }

    fn id(s: &str) -> ConversationId {
        ConversationId::new(s).unwrap()
    }

    #[tokio::test]
    async fn full_turn_produces_decision_and_persists_log() {
        let (pipeline, store) = pipeline_with(scripted_llm());
        let conversation = id("t1");

        let outcome = pipeline
            .run_turn(&conversation, Message::user("Do I need a certificate for copper wire?"))
            .await
            .unwrap();

        assert!(outcome.decisions["copper wire"].listed);
        assert!(outcome.decisions["copper wire"].certificate_required);
        assert!(outcome.reply.contains("Local Content Certificate"));

        let record = store.load(&conversation).await.unwrap().unwrap();
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.messages[0].role, MessageRole::User);
        assert_eq!(record.messages[1].role, MessageRole::Agent);
        assert!(record.last_decisions.contains_key("copper wire"));
    }

    #[tokio::test]
    async fn every_extracted_item_gets_a_decision() {
        let llm = Arc::new(MockLanguageModel::with_keyed_responses(vec![
            (
                "User query:",
                r#"{"products": [{"name": "copper wire"}, {"name": "mystery gadget"}]}"#,
            ),
            (
                "Product Item: copper wire",
                r#"{"item": "copper wire", "listed": true, "certificate_required": true, "reasoning": "baseline 30%"}"#,
            ),
            // "mystery gadget" has no scripted verdict: synthesis fails for it.
            ("analysis results", "Summary."),
        ]));
        let (pipeline, _) = pipeline_with(llm);

        let outcome = pipeline
            .run_turn(&id("t2"), Message::user("copper wire and mystery gadget"))
            .await
            .unwrap();

        assert_eq!(outcome.product_items.len(), 2);
        assert_eq!(outcome.decisions.len(), 2);
        assert!(outcome.decisions["mystery gadget"].reasoning.contains("Analysis failed"));
        assert!(outcome.decisions.values().all(|d| d.is_consistent()));
    }

    #[tokio::test]
    async fn extraction_failure_yields_empty_report_turn() {
        let llm = Arc::new(MockLanguageModel::with_keyed_responses(vec![
            // Extraction gets no scripted response and fails; aggregation works.
            ("analysis results", "Nothing was analyzed."),
        ]));
        let (pipeline, store) = pipeline_with(llm);
        let conversation = id("t3");

        let outcome = pipeline
            .run_turn(&conversation, Message::user("Do I need anything?"))
            .await
            .unwrap();

        assert!(outcome.product_items.is_empty());
        assert!(outcome.decisions.is_empty());
        assert_eq!(outcome.reply, "Nothing was analyzed.");

        // The turn still persisted both messages.
        let record = store.load(&conversation).await.unwrap().unwrap();
        assert_eq!(record.messages.len(), 2);
    }

    #[tokio::test]
    async fn history_is_empty_for_fresh_conversation() {
        let (pipeline, _) = pipeline_with(scripted_llm());
        let messages = pipeline.history(&id("fresh")).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn clear_reports_deletion_and_empties_history() {
        let (pipeline, _) = pipeline_with(scripted_llm());
        let conversation = id("t4");

        assert!(!pipeline.clear(&conversation).await.unwrap());

        pipeline
            .run_turn(&conversation, Message::user("check copper wire"))
            .await
            .unwrap();

        assert!(pipeline.clear(&conversation).await.unwrap());
        assert!(pipeline.history(&conversation).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_releases_the_conversation_lock_entry() {
        let (pipeline, _) = pipeline_with(scripted_llm());
        let conversation = id("t6");

        pipeline
            .run_turn(&conversation, Message::user("check copper wire"))
            .await
            .unwrap();
        assert!(pipeline.turn_locks.lock().await.contains_key(&conversation));

        pipeline.clear(&conversation).await.unwrap();
        assert!(!pipeline.turn_locks.lock().await.contains_key(&conversation));
    }

    #[tokio::test]
    async fn concurrent_turns_on_same_conversation_are_serialized() {
        let (pipeline, store) = pipeline_with(scripted_llm());
        let pipeline = Arc::new(pipeline);
        let conversation = id("t5");

        let a = {
            let pipeline = pipeline.clone();
            let conversation = conversation.clone();
            tokio::spawn(async move {
                pipeline
                    .run_turn(&conversation, Message::user("check copper wire"))
                    .await
            })
        };
        let b = {
            let pipeline = pipeline.clone();
            let conversation = conversation.clone();
            tokio::spawn(async move {
                pipeline
                    .run_turn(&conversation, Message::user("check copper wire again"))
                    .await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Two full turns: four messages, no interleaving lost updates.
        let record = store.load(&conversation).await.unwrap().unwrap();
        assert_eq!(record.messages.len(), 4);
    }
}

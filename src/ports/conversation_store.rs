//! Conversation Store Port - checkpoint persistence between turns.
//!
//! The store persists the whole conversation record (message log plus the
//! latest turn's structured outputs) keyed by conversation id. A turn loads
//! the record at its start and saves the updated record at its end. Deletion
//! is hard and irreversible.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::analysis::{Decision, Language};
use crate::domain::conversation::Message;
use crate::domain::foundation::{ConversationId, Timestamp};

/// Port for conversation persistence.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads the record for a conversation, or `None` for a fresh id.
    async fn load(&self, id: &ConversationId) -> Result<Option<ConversationRecord>, StoreError>;

    /// Saves (inserts or replaces) a conversation record.
    async fn save(&self, record: &ConversationRecord) -> Result<(), StoreError>;

    /// Deletes all persisted state for a conversation.
    ///
    /// Returns true when a record existed and was removed, false when there
    /// was nothing to delete.
    async fn delete(&self, id: &ConversationId) -> Result<bool, StoreError>;
}

/// Persisted state of one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Ordered message log, oldest first. Append-only.
    pub messages: Vec<Message>,
    /// Product items extracted in the most recent turn.
    pub last_products: BTreeMap<String, Language>,
    /// Decisions produced in the most recent turn.
    pub last_decisions: BTreeMap<String, Decision>,
    /// When the record was last written.
    pub updated_at: Timestamp,
}

impl ConversationRecord {
    /// Creates an empty record for a fresh conversation.
    pub fn new(id: ConversationId) -> Self {
        Self {
            id,
            messages: Vec::new(),
            last_products: BTreeMap::new(),
            last_decisions: BTreeMap::new(),
            updated_at: Timestamp::now(),
        }
    }

    /// Appends a message and refreshes the update time.
    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Timestamp::now();
    }
}

/// Persistence errors. Unlike stage failures, these surface to the caller as
/// turn-level failures since conversation continuity cannot be guaranteed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend is unreachable or rejected the operation.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Stored record could not be decoded.
    #[error("corrupt record for conversation '{id}': {reason}")]
    CorruptRecord {
        /// Conversation whose record failed to decode.
        id: String,
        /// Decode failure details.
        reason: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a corrupt record error.
    pub fn corrupt(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

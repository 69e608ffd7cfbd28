//! In-Memory Store - ConversationStore backed by a HashMap.
//!
//! Used by tests and ephemeral deployments. Records survive only as long as
//! the process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationRecord, ConversationStore, StoreError};

/// Volatile conversation store.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<ConversationId, ConversationRecord>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn load(&self, id: &ConversationId) -> Result<Option<ConversationRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn save(&self, record: &ConversationRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, StoreError> {
        Ok(self.records.lock().unwrap().remove(id).is_some())
    }
}

//! Ports (interfaces) for external collaborators.
//!
//! The pipeline depends only on these traits; adapters provide the concrete
//! integrations (Gemini, the retrieval service, SQLite) and are injected at
//! startup.

mod conversation_store;
mod knowledge_index;
mod language_model;

pub use conversation_store::{ConversationRecord, ConversationStore, StoreError};
pub use knowledge_index::{IndexCatalog, IndexError, KnowledgeIndex, DEFAULT_TOP_K};
pub use language_model::{
    CompletionRequest, CompletionResponse, LanguageModel, LlmError, ProviderInfo, ResponseFormat,
};

//! Storage adapters - ConversationStore implementations.

mod in_memory_store;
mod sqlite_store;

pub use in_memory_store::InMemoryStore;
pub use sqlite_store::SqliteStore;

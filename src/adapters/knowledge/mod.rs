//! Knowledge adapters - KnowledgeIndex implementations.

mod in_memory_index;
mod remote_index;

pub use in_memory_index::InMemoryIndex;
pub use remote_index::{RemoteIndex, RemoteIndexConfig};

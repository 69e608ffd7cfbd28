//! Foundation types shared across the domain: identifiers, timestamps, errors.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ConversationId, MessageId};
pub use timestamp::Timestamp;

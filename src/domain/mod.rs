//! Domain layer: foundation types, analysis results, conversation data.

pub mod analysis;
pub mod conversation;
pub mod foundation;

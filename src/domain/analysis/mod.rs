//! Analysis types: language tagging and per-item compliance decisions.

mod decision;
mod evidence;
mod language;

pub use decision::{Decision, NOT_LISTED_OVERRIDE_NOTE};
pub use evidence::{EvidencePassage, PassageMetadata};
pub use language::Language;

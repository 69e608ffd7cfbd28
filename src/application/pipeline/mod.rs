//! The four-stage analysis pipeline.
//!
//! Stages run strictly in sequence within a turn; stages 2 and 3 fan out
//! concurrently across items internally. Each stage swallows its own
//! failures and degrades to a well-defined output so a turn always produces
//! a reply.

mod aggregator;
mod extractor;
mod retriever;
mod synthesizer;
mod turn;

pub use aggregator::{
    format_decisions, ReportAggregator, AGGREGATION_FAILURE_REPLY, NOTHING_ANALYZED_SENTINEL,
};
pub use extractor::{lift_quoted_spans, ItemExtractor};
pub use retriever::EvidenceRetriever;
pub use synthesizer::{format_evidence, DecisionSynthesizer, NO_EVIDENCE_SENTINEL};
pub use turn::{TurnError, TurnOutcome, TurnPipeline};

//! Stage 4: Report Aggregator.
//!
//! Builds a deterministic per-item summary of all decisions and hands it to a
//! final model call whose only job is readable phrasing; the model may not
//! alter facts. When that call fails, the reply degrades to a fixed sentence
//! while the structured decisions remain available to the turn.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::domain::analysis::Decision;
use crate::ports::{CompletionRequest, LanguageModel};

/// Fixed summary used when no items were extracted this turn.
pub const NOTHING_ANALYZED_SENTINEL: &str = "No products were analyzed or processed.";

/// Fixed reply used when the prose-formatting call fails.
pub const AGGREGATION_FAILURE_REPLY: &str =
    "An error occurred while compiling the final report.";

const SYSTEM_PROMPT: &str = "You present the final summary of a product compliance analysis. For each product, \
state whether it is listed in the mandatory list and whether it requires a Local \
Content Certificate, including the reasoning given. Rephrase for clarity and \
readability only; never change, add, or omit any fact.";

/// Aggregates per-item decisions into the user-facing reply.
pub struct ReportAggregator {
    llm: Arc<dyn LanguageModel>,
}

impl ReportAggregator {
    /// Creates an aggregator backed by the given model.
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Produces the final natural-language reply for the turn.
    pub async fn aggregate(&self, decisions: &BTreeMap<String, Decision>) -> String {
        let summary = format_decisions(decisions);

        let request = CompletionRequest::new(format!(
            "Here are the analysis results for the requested products:\n\n{}\n\n\
             Please provide a final, comprehensive summary for the user.",
            summary
        ))
        .with_system_prompt(SYSTEM_PROMPT);

        match self.llm.complete(request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "report aggregation failed, using fixed reply");
                AGGREGATION_FAILURE_REPLY.to_string()
            }
        }
    }
}

/// Builds the deterministic textual summary, one block per decision in map
/// iteration order, or the fixed sentinel when nothing was analyzed.
pub fn format_decisions(decisions: &BTreeMap<String, Decision>) -> String {
    if decisions.is_empty() {
        return NOTHING_ANALYZED_SENTINEL.to_string();
    }

    decisions
        .values()
        .map(|d| {
            let listed = if d.listed {
                "Listed in Mandatory List"
            } else {
                "NOT Listed in Mandatory List"
            };
            let certificate = if d.certificate_required {
                "REQUIRES Local Content Certificate"
            } else {
                "DOES NOT require Local Content Certificate"
            };
            format!(
                "- Product: '{}'\n  Status: {}.\n  Certificate: {}.\n  Reasoning: {}\n",
                d.item, listed, certificate, d.reasoning
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Stage 3: Decision Synthesizer.
//!
//! Combines each item's evidence with the listing business rule to produce a
//! structured [`Decision`]. The model proposes the verdict; the pipeline
//! enforces the hard post-condition `certificate_required ⇒ listed` and the
//! exact item name regardless of what the model returned. A per-item failure
//! substitutes a fallback decision for that item only; items are processed
//! independently with no cross-item state.

use futures::future::join_all;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::domain::analysis::{Decision, EvidencePassage, Language};
use crate::ports::{CompletionRequest, LanguageModel, LlmError};

use super::extractor::strip_code_fences;

/// Fixed text substituted for the evidence block when retrieval came back
/// empty for an item.
pub const NO_EVIDENCE_SENTINEL: &str =
    "No relevant documents were found for this product in the mandatory list.";

const SYSTEM_PROMPT: &str = "You determine whether a product is listed in the mandatory list and whether it \
requires a Local Content Certificate, based only on the provided documents. \
Follow these strict rules:\n\
1. Listing: set \"listed\" to true ONLY if the product is explicitly mentioned or is a \
clear semantic match to the Commodity Title (English) or Commodity Title (Arabic) field \
of a provided document. Otherwise set it to false.\n\
2. Certificate: if \"listed\" is false, \"certificate_required\" MUST be false. If \
\"listed\" is true, read the Manufacturer Local Content Minimum Baseline field of the \
matching document: values indicating a requirement (e.g. 'يشترط', 'نعم', 'Required', \
'Yes', or an explicit percentage such as '30%') mean true; values indicating none \
(e.g. 'لا يوجد', 'لا يشترط', 'No', 'Not Required', or empty) mean false.\n\
3. Reasoning: explain both flags concisely. When listed, cite the matching commodity \
title and the exact baseline value; when not listed, say why (e.g. 'no clear match found').\n\
4. Output ONLY a JSON object: {\"item\": \"...\", \"listed\": bool, \
\"certificate_required\": bool, \"reasoning\": \"...\"}. The \"item\" field must equal \
the input product item exactly.";

/// Synthesizes per-item decisions from evidence.
pub struct DecisionSynthesizer {
    llm: Arc<dyn LanguageModel>,
}

/// Wire shape of the model's verdict.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[allow(dead_code)]
    item: Option<String>,
    listed: bool,
    certificate_required: bool,
    reasoning: String,
}

impl DecisionSynthesizer {
    /// Creates a synthesizer backed by the given model.
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Produces a decision for every extracted item.
    ///
    /// The returned map always carries the full item key set: failures map to
    /// fallback decisions, items without evidence are judged against the
    /// no-documents sentinel (and so come back not listed).
    pub async fn synthesize(
        &self,
        items: &BTreeMap<String, Language>,
        evidence: &BTreeMap<String, Vec<EvidencePassage>>,
    ) -> BTreeMap<String, Decision> {
        if items.is_empty() {
            return BTreeMap::new();
        }

        let empty = Vec::new();
        let verdicts = items.keys().map(|item| {
            let passages = evidence.get(item).unwrap_or(&empty);
            async move {
                let decision = match self.judge_one(item, passages).await {
                    Ok(decision) => decision,
                    Err(e) => {
                        warn!(item, error = %e, "decision synthesis failed, using fallback");
                        Decision::fallback(item, e.to_string())
                    }
                };
                (item.clone(), decision)
            }
        });

        join_all(verdicts).await.into_iter().collect()
    }

    async fn judge_one(
        &self,
        item: &str,
        passages: &[EvidencePassage],
    ) -> Result<Decision, LlmError> {
        let documents = format_evidence(passages);
        let request = CompletionRequest::new(format!(
            "Analyze the following product using the provided documents:\n\
             Product Item: {}\n\nRetrieved Documents:\n{}",
            item, documents
        ))
        .with_system_prompt(SYSTEM_PROMPT)
        .with_temperature(0.0)
        .expecting_json();

        let response = self.llm.complete(request).await?;

        let raw: RawVerdict = serde_json::from_str(strip_code_fences(&response.content))
            .map_err(|e| LlmError::parse(format!("malformed verdict: {}", e)))?;

        // The item name comes from the extraction key, never from the model;
        // Decision::new applies the certificate rule.
        Ok(Decision::new(
            item,
            raw.listed,
            raw.certificate_required,
            raw.reasoning,
        ))
    }
}

/// Formats retrieved passages into the verbatim evidence block given to the
/// model: body plus full metadata per passage, or the fixed sentinel when
/// there is no evidence.
pub fn format_evidence(passages: &[EvidencePassage]) -> String {
    if passages.is_empty() {
        return NO_EVIDENCE_SENTINEL.to_string();
    }

    passages
        .iter()
        .map(|p| {
            let metadata =
                serde_json::to_string(&p.metadata).unwrap_or_else(|_| "{}".to_string());
            format!("Document Content: {}\nMetadata: {}", p.body, metadata)
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

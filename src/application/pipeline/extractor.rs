//! Stage 1: Item Extractor.
//!
//! Turns the combined user text into a deduplicated mapping of product name
//! to detected language. Quoted spans are lifted deterministically before the
//! model call: any text the user wrapped in matching double or single quotes
//! is one indivisible item even when it contains conjunctions. The model only
//! sees the residual text and proposes the remaining product mentions.
//!
//! This stage never raises past its boundary. Model errors and unparseable
//! output degrade to an empty mapping and the turn proceeds with "no items".

use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::analysis::Language;
use crate::ports::{CompletionRequest, LanguageModel};

const SYSTEM_PROMPT: &str = "You are an expert assistant that extracts product names from user queries. \
Identify every distinct product mention, regardless of quantity or phrasing. \
Return ONLY a JSON object of the form {\"products\": [{\"name\": \"...\"}]}. \
If no product names are mentioned, return {\"products\": []}.";

/// Extracts product items from a user query using the language model.
pub struct ItemExtractor {
    llm: Arc<dyn LanguageModel>,
}

/// Wire shape of the model's extraction output.
#[derive(Debug, Deserialize)]
struct ExtractedItems {
    products: Vec<ExtractedItem>,
}

#[derive(Debug, Deserialize)]
struct ExtractedItem {
    name: String,
}

impl ItemExtractor {
    /// Creates an extractor backed by the given model.
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Extracts distinct product names and tags each with its language.
    ///
    /// Returns an empty mapping when the text mentions no products or when
    /// the model call fails; neither case is an error.
    pub async fn extract(&self, query: &str) -> BTreeMap<String, Language> {
        let (quoted, residual) = lift_quoted_spans(query);

        let model_names = if residual.trim().is_empty() {
            Vec::new()
        } else {
            match self.extract_with_model(&residual).await {
                Ok(names) => names,
                Err(reason) => {
                    warn!(%reason, "item extraction failed, proceeding with no items");
                    return BTreeMap::new();
                }
            }
        };

        let mut items = BTreeMap::new();
        for name in quoted.into_iter().chain(model_names) {
            let name = name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            let language = Language::detect(&name);
            items.entry(name).or_insert(language);
        }

        debug!(count = items.len(), "extracted product items");
        items
    }

    async fn extract_with_model(&self, text: &str) -> Result<Vec<String>, String> {
        let request = CompletionRequest::new(format!("User query: {}", text))
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.0)
            .expecting_json();

        let response = self
            .llm
            .complete(request)
            .await
            .map_err(|e| e.to_string())?;

        let parsed: ExtractedItems = serde_json::from_str(strip_code_fences(&response.content))
            .map_err(|e| format!("unparseable extraction output: {}", e))?;

        Ok(parsed.products.into_iter().map(|p| p.name).collect())
    }
}

/// Lifts spans wrapped in matching quote characters out of the text.
///
/// Returns the quoted spans in order of appearance plus the residual text
/// with those spans removed. Unmatched quotes are left in place. Single
/// quotes only delimit a span at word boundaries, so apostrophes inside
/// words ("it's", "John's") stay literal and never pair up.
pub fn lift_quoted_spans(text: &str) -> (Vec<String>, String) {
    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();
    let mut residual = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' || (c == '\'' && opens_span(&chars, i)) {
            if let Some(close) = find_closing_quote(&chars, i, c) {
                let span: String = chars[i + 1..close].iter().collect();
                let trimmed = span.trim();
                if !trimmed.is_empty() {
                    spans.push(trimmed.to_string());
                }
                residual.push(' ');
                i = close + 1;
                continue;
            }
        }
        residual.push(c);
        i += 1;
    }

    (spans, residual)
}

fn opens_span(chars: &[char], i: usize) -> bool {
    i == 0 || !chars[i - 1].is_alphanumeric()
}

// A closing single quote must also sit at a word boundary, so quoted spans
// may themselves contain apostrophes.
fn find_closing_quote(chars: &[char], open: usize, quote: char) -> Option<usize> {
    (open + 1..chars.len()).find(|&j| {
        chars[j] == quote
            && (quote == '"' || chars.get(j + 1).map_or(true, |next| !next.is_alphanumeric()))
    })
}

/// Strips a surrounding markdown code fence, if present, so that models that
/// wrap their JSON in ``` blocks still parse.
pub(crate) fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

//! Per-item compliance decisions.
//!
//! A [`Decision`] records whether a product appears in the mandatory list and
//! whether a local-content certificate is required for it. The invariant
//! `certificate_required ⇒ listed` is a business rule, not a model behavior:
//! it is enforced in code after synthesis and never trusted from raw model
//! output.

use serde::{Deserialize, Serialize};

/// Note appended to the reasoning when the certificate flag is cleared
/// because the product turned out not to be listed.
pub const NOT_LISTED_OVERRIDE_NOTE: &str =
    " (certificate requirement cleared because the product is not listed)";

/// Structured verdict for one product item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The product name exactly as extracted.
    pub item: String,
    /// True when the product matches a commodity title in the mandatory list.
    pub listed: bool,
    /// True when the matching entry mandates a local-content certificate.
    /// Always false when `listed` is false.
    pub certificate_required: bool,
    /// Free-text explanation for both flags.
    pub reasoning: String,
}

impl Decision {
    /// Creates a decision and immediately applies the certificate rule.
    pub fn new(
        item: impl Into<String>,
        listed: bool,
        certificate_required: bool,
        reasoning: impl Into<String>,
    ) -> Self {
        let mut decision = Self {
            item: item.into(),
            listed,
            certificate_required,
            reasoning: reasoning.into(),
        };
        decision.enforce_certificate_rule();
        decision
    }

    /// Fallback decision used when per-item synthesis fails.
    pub fn fallback(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            listed: false,
            certificate_required: false,
            reasoning: format!(
                "Analysis failed: {}. Could not determine listing or certificate requirement.",
                reason.into()
            ),
        }
    }

    /// Decision for an item with no corpus match.
    pub fn not_listed(item: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            listed: false,
            certificate_required: false,
            reasoning: reasoning.into(),
        }
    }

    /// Forces `certificate_required` to false when the item is not listed.
    ///
    /// The override is unconditional and annotates the reasoning so the user
    /// can see the correction. Safe to call repeatedly; the note is only
    /// appended when a raw `true` is actually cleared.
    pub fn enforce_certificate_rule(&mut self) {
        if !self.listed && self.certificate_required {
            self.certificate_required = false;
            self.reasoning.push_str(NOT_LISTED_OVERRIDE_NOTE);
        }
    }

    /// Returns true when the invariant `certificate_required ⇒ listed` holds.
    pub fn is_consistent(&self) -> bool {
        !self.certificate_required || self.listed
    }
}

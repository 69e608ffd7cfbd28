//! Language tagging for extracted product names.
//!
//! The reference corpus is partitioned into an English and an Arabic index,
//! so every extracted item carries a language tag that routes its retrieval.
//! The tag is derived purely from the script of the name itself; the model's
//! own claim about language is never trusted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of an extracted product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Latin-script name, routed to the English index.
    En,
    /// Arabic-script name, routed to the Arabic index.
    Ar,
}

impl Language {
    /// Detects the language of a product name from its script.
    ///
    /// A name containing Arabic-block characters and no ASCII letters is
    /// tagged `Ar`. Everything else, including mixed-script and ambiguous
    /// names, defaults to `En`.
    pub fn detect(name: &str) -> Self {
        let mut has_arabic = false;
        let mut has_latin = false;

        for c in name.chars() {
            if is_arabic_char(c) {
                has_arabic = true;
            } else if c.is_ascii_alphabetic() {
                has_latin = true;
            }
        }

        if has_arabic && !has_latin {
            Language::Ar
        } else {
            Language::En
        }
    }

    /// Returns the tag used in wire formats and logs.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// Returns true for characters in the Arabic script blocks, including
/// presentation forms and the Arabic supplement.
fn is_arabic_char(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{08A0}'..='\u{08FF}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}'
    )
}

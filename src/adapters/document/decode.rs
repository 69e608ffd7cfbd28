//! Upload decoding - turns uploaded files into query text.
//!
//! Plain text files are decoded as UTF-8. Spreadsheets are flattened row by
//! row, cells joined with tabs, so lists of product names survive whatever
//! column layout the user exported. Anything else is unsupported.
//!
//! Decoding never fails the request: unsupported types and decode errors
//! produce a bracketed note that travels with the message in place of the
//! file content.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::warn;

/// Result of decoding one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedUpload {
    /// Usable text extracted from the file.
    Text(String),
    /// The file contributed no text; the note explains why.
    Note(String),
}

impl DecodedUpload {
    /// Returns the extracted text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Note(_) => None,
        }
    }
}

/// Decodes an uploaded file into query text, by extension.
pub fn decode_upload(file_name: &str, bytes: &[u8]) -> DecodedUpload {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => decode_text(file_name, bytes),
        "xlsx" | "xls" => decode_spreadsheet(file_name, bytes),
        _ => DecodedUpload::Note(format!("[Note: File type not supported for '{}']", file_name)),
    }
}

fn decode_text(file_name: &str, bytes: &[u8]) -> DecodedUpload {
    match std::str::from_utf8(bytes) {
        Ok(text) => DecodedUpload::Text(text.to_string()),
        Err(e) => {
            warn!(file_name, error = %e, "uploaded text file is not valid UTF-8");
            DecodedUpload::Note(format!(
                "[Note: Error reading uploaded file '{}']",
                file_name
            ))
        }
    }
}

fn decode_spreadsheet(file_name: &str, bytes: &[u8]) -> DecodedUpload {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = match open_workbook_auto_from_rs(cursor) {
        Ok(workbook) => workbook,
        Err(e) => {
            warn!(file_name, error = %e, "failed to open uploaded spreadsheet");
            return DecodedUpload::Note(format!(
                "[Note: Error reading uploaded file '{}']",
                file_name
            ));
        }
    };

    let mut lines = Vec::new();
    let sheet_names = workbook.sheet_names().to_vec();
    for name in sheet_names {
        let Ok(range) = workbook.worksheet_range(&name) else {
            continue;
        };
        for row in range.rows() {
            let cells: Vec<String> = row
                .iter()
                .filter(|cell| !matches!(cell, Data::Empty))
                .map(ToString::to_string)
                .collect();
            if !cells.is_empty() {
                lines.push(cells.join("\t"));
            }
        }
    }

    if lines.is_empty() {
        warn!(file_name, "uploaded spreadsheet contained no cells");
        return DecodedUpload::Note(format!(
            "[Note: Error reading uploaded file '{}']",
            file_name
        ));
    }

    DecodedUpload::Text(lines.join("\n"))
}

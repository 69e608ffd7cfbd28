//! HTTP DTOs for the chat endpoints.
//!
//! These types decouple the HTTP API from domain types. The wire vocabulary
//! ("human"/"ai" message types) is part of the public API contract and is
//! mapped from the domain roles here.

use serde::Serialize;

use crate::domain::conversation::{Message, MessageRole};

/// Response for POST /api/send_message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    /// Always true on a 200 response.
    pub success: bool,
    /// The typed text plus any file-processing note. Extracted file content
    /// is never echoed back.
    pub user_message: String,
    /// The agent's reply.
    pub ai_response: String,
    /// Metadata about the uploaded file, if one was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
}

/// Response for GET /api/history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    /// Message log, oldest first.
    pub messages: Vec<MessageView>,
}

/// One message in the history response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    /// "human" for user messages, "ai" for agent replies.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Display text of the message.
    pub content: String,
    /// Attached file metadata, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
}

impl MessageView {
    /// Maps a domain message to its wire view.
    pub fn from_message(message: &Message) -> Self {
        let message_type = match message.role {
            MessageRole::User => "human",
            MessageRole::Agent => "ai",
        }
        .to_string();

        Self {
            message_type,
            content: message.display_text(),
            file_info: message
                .attachment
                .as_ref()
                .map(|att| FileInfo::new(&att.file_name)),
        }
    }
}

/// Metadata about an uploaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Original file name as uploaded.
    pub name: String,
}

impl FileInfo {
    /// Creates file metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Response for POST /api/clear_history.
#[derive(Debug, Clone, Serialize)]
pub struct ClearHistoryResponse {
    /// Whether a conversation existed and was deleted.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// Error body for all non-2xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub error: String,
}

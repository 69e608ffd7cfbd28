//! Conversation messages.
//!
//! Messages are created once per turn and appended to the log; they are never
//! mutated or deleted individually. Only whole-conversation deletion exists.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed (or uploaded) by the user.
    User,
    /// Reply produced by the pipeline.
    Agent,
}

/// Metadata for a file attached to a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original file name as uploaded.
    pub file_name: String,
    /// Text extracted from the file by the document decoder. Empty when the
    /// file contributed no text.
    pub extracted_text: String,
    /// Fixed note recorded when the file was unsupported or unreadable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_note: Option<String>,
}

impl Attachment {
    /// Creates attachment metadata for a file that decoded to text.
    pub fn new(file_name: impl Into<String>, extracted_text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            extracted_text: extracted_text.into(),
            processing_note: None,
        }
    }

    /// Creates attachment metadata for a file that produced no text.
    pub fn with_note(file_name: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            extracted_text: String::new(),
            processing_note: Some(note.into()),
        }
    }
}

/// One entry in a conversation's message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique ID of this message.
    pub id: MessageId,
    /// Who sent this message.
    pub role: MessageRole,
    /// Text content. For user messages this is only the typed text; attached
    /// file content lives in `attachment`.
    pub content: String,
    /// Attachment metadata, present only on user messages with an upload.
    pub attachment: Option<Attachment>,
    /// When the message was created.
    pub created_at: Timestamp,
}

impl Message {
    /// Creates a user message without attachment.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            attachment: None,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a user message carrying an attachment.
    pub fn user_with_attachment(content: impl Into<String>, attachment: Attachment) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            attachment: Some(attachment),
            created_at: Timestamp::now(),
        }
    }

    /// Creates an agent reply.
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Agent,
            content: content.into(),
            attachment: None,
            created_at: Timestamp::now(),
        }
    }

    /// Combined text for pipeline consumption: typed text plus the attachment
    /// contribution (extracted content, or the processing note when the file
    /// produced none) separated by a line break.
    pub fn combined_query_text(&self) -> String {
        let file_text = self
            .attachment
            .as_ref()
            .map(|att| {
                if att.extracted_text.is_empty() {
                    att.processing_note.clone().unwrap_or_default()
                } else {
                    att.extracted_text.clone()
                }
            })
            .unwrap_or_default();

        if self.content.is_empty() {
            file_text
        } else if file_text.is_empty() {
            self.content.clone()
        } else {
            format!("{}\n{}", self.content, file_text)
        }
    }

    /// Text shown back to the user: the typed text plus any file-processing
    /// note. Extracted file content never appears here; it reaches the
    /// pipeline only through [`Self::combined_query_text`].
    pub fn display_text(&self) -> String {
        let note = self
            .attachment
            .as_ref()
            .and_then(|att| att.processing_note.as_deref());
        match note {
            Some(note) if self.content.is_empty() => note.to_string(),
            Some(note) => format!("{}\n\n{}", self.content, note),
            None => self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_has_no_attachment() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, MessageRole::User);
        assert!(msg.attachment.is_none());
    }

    #[test]
    fn combined_text_joins_with_line_break() {
        let msg = Message::user_with_attachment(
            "check these",
            Attachment::new("items.txt", "copper wire\nsteel pipes"),
        );
        assert_eq!(msg.combined_query_text(), "check these\ncopper wire\nsteel pipes");
    }

    #[test]
    fn combined_text_uses_attachment_alone_when_no_typed_text() {
        let msg = Message::user_with_attachment("", Attachment::new("items.txt", "copper wire"));
        assert_eq!(msg.combined_query_text(), "copper wire");
    }

    #[test]
    fn combined_text_uses_typed_text_when_attachment_empty() {
        let msg = Message::user_with_attachment("copper wire", Attachment::new("empty.txt", ""));
        assert_eq!(msg.combined_query_text(), "copper wire");
    }

    #[test]
    fn combined_text_carries_the_processing_note() {
        let msg = Message::user_with_attachment(
            "check copper wire",
            Attachment::with_note("scan.pdf", "[Note: File type not supported for 'scan.pdf']"),
        );
        assert_eq!(
            msg.combined_query_text(),
            "check copper wire\n[Note: File type not supported for 'scan.pdf']"
        );
    }

    #[test]
    fn display_text_omits_extracted_file_content() {
        let msg = Message::user_with_attachment(
            "check these",
            Attachment::new("items.txt", "copper wire\nsteel pipes"),
        );
        assert_eq!(msg.display_text(), "check these");
    }

    #[test]
    fn display_text_appends_the_processing_note() {
        let msg = Message::user_with_attachment(
            "check these",
            Attachment::with_note("scan.pdf", "[Note: File type not supported for 'scan.pdf']"),
        );
        assert_eq!(
            msg.display_text(),
            "check these\n\n[Note: File type not supported for 'scan.pdf']"
        );
    }

    #[test]
    fn display_text_is_the_note_alone_when_nothing_was_typed() {
        let msg = Message::user_with_attachment(
            "",
            Attachment::with_note("bad.txt", "[Note: Error reading uploaded file 'bad.txt']"),
        );
        assert_eq!(
            msg.display_text(),
            "[Note: Error reading uploaded file 'bad.txt']"
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&MessageRole::Agent).unwrap(), "\"agent\"");
    }
}

//! HTTP handlers for the chat endpoints.
//!
//! These handlers connect Axum routes to the turn pipeline. The service runs
//! one conversation per deployment; the fixed conversation id comes from
//! configuration and is held in the shared state.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::adapters::document::{decode_upload, DecodedUpload};
use crate::application::pipeline::{TurnError, TurnPipeline};
use crate::domain::conversation::{Attachment, Message};
use crate::domain::foundation::ConversationId;

use super::dto::{
    ClearHistoryResponse, ErrorResponse, FileInfo, HistoryResponse, MessageView,
    SendMessageResponse,
};

/// Shared application state for the chat handlers.
#[derive(Clone)]
pub struct AppState {
    /// The analysis pipeline.
    pub pipeline: Arc<TurnPipeline>,
    /// The fixed conversation this deployment serves.
    pub conversation_id: ConversationId,
}

impl AppState {
    /// Creates state for one pipeline and conversation.
    pub fn new(pipeline: Arc<TurnPipeline>, conversation_id: ConversationId) -> Self {
        Self {
            pipeline,
            conversation_id,
        }
    }
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request (bad multipart, empty input).
    BadRequest(String),
    /// Pipeline or persistence failure.
    Internal(String),
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => {
                error!(%message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Parsed form of the send_message multipart body.
struct SendMessageForm {
    message: String,
    file: Option<(String, Vec<u8>)>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<SendMessageForm, ApiError> {
    let mut form = SendMessageForm {
        message: String::new(),
        file: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("message") => {
                form.message = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable message field: {}", e)))?
                    .trim()
                    .to_string();
            }
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable file field: {}", e)))?
                    .to_vec();
                form.file = Some((name, bytes));
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/send_message - run one analysis turn.
///
/// Accepts a multipart body with a `message` text field and an optional
/// `file`. The typed text and any extracted file content are combined into
/// one query. A request with no typed text and no usable file content is
/// rejected.
pub async fn send_message(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_multipart(multipart).await?;

    let attachment = form.file.as_ref().map(|(name, bytes)| {
        let decoded = decode_upload(name, bytes);
        (name.clone(), decoded)
    });

    let has_usable_file = attachment
        .as_ref()
        .and_then(|(_, decoded)| decoded.text())
        .is_some();
    if form.message.is_empty() && !has_usable_file {
        return Err(ApiError::BadRequest(
            "Cannot send empty message or unreadable file.".to_string(),
        ));
    }

    let (user_message, file_info) = match attachment {
        Some((name, decoded)) => {
            let attachment = match decoded {
                DecodedUpload::Text(text) => Attachment::new(&name, text),
                DecodedUpload::Note(note) => Attachment::with_note(&name, note),
            };
            (
                Message::user_with_attachment(form.message, attachment),
                Some(FileInfo::new(name)),
            )
        }
        None => (Message::user(form.message), None),
    };

    let display_text = user_message.display_text();

    let outcome = state
        .pipeline
        .run_turn(&state.conversation_id, user_message)
        .await?;

    Ok(Json(SendMessageResponse {
        success: true,
        user_message: display_text,
        ai_response: outcome.reply,
        file_info,
    }))
}

/// GET /api/history - full message log of the conversation.
pub async fn get_history(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let messages = state.pipeline.history(&state.conversation_id).await?;

    Ok(Json(HistoryResponse {
        messages: messages.iter().map(MessageView::from_message).collect(),
    }))
}

/// POST /api/clear_history - delete all conversation state.
pub async fn clear_history(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.pipeline.clear(&state.conversation_id).await?;

    let message = if deleted {
        "Conversation history cleared.".to_string()
    } else {
        "No conversation history to clear.".to_string()
    };

    Ok(Json(ClearHistoryResponse {
        success: deleted,
        message,
    }))
}

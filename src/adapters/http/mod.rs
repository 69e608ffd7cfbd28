//! HTTP adapter - Axum surface over the turn pipeline.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ClearHistoryResponse, ErrorResponse, FileInfo, HistoryResponse, MessageView,
    SendMessageResponse,
};
pub use handlers::{ApiError, AppState};
pub use routes::{app_router, chat_routes};

//! Axum routes for the chat endpoints.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{clear_history, get_history, send_message, AppState};

/// Creates the chat routing table.
///
/// Endpoints:
/// - POST /api/send_message - run one analysis turn
/// - GET /api/history - full message log
/// - POST /api/clear_history - delete all conversation state
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/send_message", post(send_message))
        .route("/history", get(get_history))
        .route("/clear_history", post(clear_history))
}

/// Full application router with middleware, ready to serve.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", chat_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

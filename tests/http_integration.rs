//! Integration tests for the chat HTTP endpoints.
//!
//! These tests drive the full Axum router with tower's `oneshot`, backed by
//! a scripted language model, an in-process corpus index, and an in-memory
//! store. They verify the wire contract: multipart parsing, response shapes,
//! and error statuses.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use listing_advisor::adapters::ai::MockLanguageModel;
use listing_advisor::adapters::http::{app_router, AppState};
use listing_advisor::adapters::knowledge::InMemoryIndex;
use listing_advisor::adapters::storage::InMemoryStore;
use listing_advisor::application::pipeline::TurnPipeline;
use listing_advisor::domain::analysis::{EvidencePassage, PassageMetadata};
use listing_advisor::domain::foundation::ConversationId;
use listing_advisor::ports::IndexCatalog;

const BOUNDARY: &str = "test-boundary";

fn scripted_llm() -> Arc<MockLanguageModel> {
    Arc::new(MockLanguageModel::with_keyed_responses(vec![
        (
            "User query:",
            r#"{"products": [{"name": "copper wire"}]}"#,
        ),
        (
            "Product Item: copper wire",
            r#"{"item": "copper wire", "listed": true, "certificate_required": true, "reasoning": "Matches 'Copper Wire'; baseline is 30%."}"#,
        ),
        (
            "analysis results",
            "Copper wire is listed and requires a Local Content Certificate.",
        ),
    ]))
}

fn test_app(llm: Arc<MockLanguageModel>) -> Router {
    let store = Arc::new(InMemoryStore::new());
    let catalog = IndexCatalog::new().with_english(Arc::new(InMemoryIndex::new(vec![
        EvidencePassage::new(
            "Copper wire, insulated, for electrical installations",
            PassageMetadata::new("Copper Wire", "أسلاك نحاسية", "30%"),
        ),
    ])));
    let pipeline = Arc::new(TurnPipeline::new(llm, Arc::new(catalog), store));
    let state = AppState::new(pipeline, ConversationId::new("1").unwrap());
    app_router(state)
}

fn multipart_body(message: &str, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{message}\r\n"
        )
        .as_bytes(),
    );
    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn send_message_request(message: &str, file: Option<(&str, &[u8])>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/send_message")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(message, file)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn send_message_returns_analysis_reply() {
    let app = test_app(scripted_llm());

    let response = app
        .oneshot(send_message_request("Do I need a certificate for copper wire?", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["userMessage"],
        "Do I need a certificate for copper wire?"
    );
    assert!(body["aiResponse"]
        .as_str()
        .unwrap()
        .contains("Local Content Certificate"));
    assert!(body.get("fileInfo").is_none());
}

#[tokio::test]
async fn empty_message_without_file_is_rejected() {
    let app = test_app(scripted_llm());

    let response = app.oneshot(send_message_request("", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Cannot send empty message or unreadable file.");
}

#[tokio::test]
async fn unsupported_file_without_message_is_rejected() {
    let app = test_app(scripted_llm());

    let response = app
        .oneshot(send_message_request("", Some(("products.pdf", b"%PDF-1.4"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn text_file_alone_runs_the_turn_without_echoing_content() {
    let app = test_app(scripted_llm());

    let response = app
        .oneshot(send_message_request("", Some(("products.txt", b"copper wire"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    // The file content feeds the pipeline but is not echoed back.
    assert_eq!(body["userMessage"], "");
    assert!(body["aiResponse"]
        .as_str()
        .unwrap()
        .contains("Local Content Certificate"));
    assert_eq!(body["fileInfo"]["name"], "products.txt");
}

#[tokio::test]
async fn uploaded_content_never_appears_in_responses_or_history() {
    let app = test_app(scripted_llm());

    let response = app
        .clone()
        .oneshot(send_message_request(
            "check this list",
            Some(("products.txt", b"copper wire")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["userMessage"], "check this list");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages[0]["content"], "check this list");
    assert_eq!(messages[0]["fileInfo"]["name"], "products.txt");
}

#[tokio::test]
async fn unsupported_file_with_message_still_runs_the_turn() {
    let app = test_app(scripted_llm());

    let response = app
        .oneshot(send_message_request(
            "check copper wire",
            Some(("products.pdf", b"%PDF-1.4")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["userMessage"],
        "check copper wire\n\n[Note: File type not supported for 'products.pdf']"
    );
}

#[tokio::test]
async fn history_is_empty_before_any_message() {
    let app = test_app(scripted_llm());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn history_reflects_completed_turns() {
    let app = test_app(scripted_llm());

    app.clone()
        .oneshot(send_message_request("check copper wire", None))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = json_body(response).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["type"], "human");
    assert_eq!(messages[0]["content"], "check copper wire");
    assert_eq!(messages[1]["type"], "ai");
}

#[tokio::test]
async fn clear_history_reports_deletion_state() {
    let app = test_app(scripted_llm());

    // Nothing to clear yet.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/clear_history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["success"], false);

    app.clone()
        .oneshot(send_message_request("check copper wire", None))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/clear_history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["success"], true);

    // History is empty again.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 0);
}

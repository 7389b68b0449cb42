mod common;

use axum::{
    body::Body,
    http::{self, Request, StatusCode},
    Router,
};
use common::*;
use mmkb_node::api::{self, AppState};
use mmkb_node::config::IngestConfig;
use mmkb_node::models::*;
use mmkb_node::providers::Extractor;
use mmkb_node::services::QueryEngine;
use mmkb_node::store::{ContextBuilder, KnowledgeStore};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "mmkb-test-boundary";

struct TestApp {
    dir: TempDir,
    store: KnowledgeStore,
    router: Router,
}

fn test_app(store_failed_extractions: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = KnowledgeStore::new(dir.path().join("knowledge_base.db"));
    store.init().unwrap();

    let state = AppState {
        extractor: Arc::new(Extractor::new(&mock_services(dir.path()))),
        store: store.clone(),
        query: Arc::new(QueryEngine::new(ContextBuilder::new(store.clone()), Arc::new(EchoGenerator))),
        ingest: IngestConfig {
            store_failed_extractions,
        },
        work_dir: dir.path().to_path_buf(),
    };

    let router = Router::new()
        .nest("/api/v1", api::create_router(state))
        .fallback(|| async { "mmkb-node server" });

    TestApp { dir, store, router }
}

enum Part<'a> {
    File { name: &'a str, body: &'a [u8] },
    Text { field: &'a str, value: &'a str },
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File { name, body: bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { field, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", field, value).as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn json_request(uri: &str, value: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&value).unwrap()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn wav_bytes(dir: &Path) -> Vec<u8> {
    let path = dir.join("fixture.wav");
    write_tone(&path, 16000, 1);
    std::fs::read(path).unwrap()
}

#[tokio::test]
async fn test_fallback_route() {
    let app = test_app(true);

    let request = Request::builder()
        .method(http::Method::GET)
        .uri("/nonexistent")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"mmkb-node server");
}

#[tokio::test]
async fn test_extract_endpoint_no_file() {
    let app = test_app(true);

    let request = multipart_request(
        "/api/v1/content/extract",
        &[Part::Text {
            field: "url",
            value: "https://youtu.be/abc",
        }],
    );

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_extract_endpoint_does_not_store() {
    let app = test_app(true);

    let request = multipart_request(
        "/api/v1/content/extract",
        &[Part::File {
            name: "Notes.TXT",
            body: b"  Forests cover 31% of land.\n",
        }],
    );

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let result: ExtractionResponse = read_json(response).await;
    assert_eq!(result.name, "Notes.TXT");
    assert_eq!(result.status, ItemStatus::Extracted);
    assert_eq!(result.text, "Forests cover 31% of land.");
    assert_eq!(app.store.all_text().unwrap(), "");
}

#[tokio::test]
async fn test_ingest_files_then_url() {
    let app = test_app(true);
    let wav = wav_bytes(app.dir.path());

    let request = multipart_request(
        "/api/v1/content/ingest",
        &[
            Part::Text {
                field: "url",
                value: "https://www.youtube.com/watch?v=abc",
            },
            Part::File {
                name: "forest.txt",
                body: b"Forests cover 31% of land.",
            },
            Part::File {
                name: "interview.wav",
                body: &wav,
            },
        ],
    );

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report: IngestReport = read_json(response).await;
    let names: Vec<&str> = report.items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["forest.txt", "interview.wav", "https://www.youtube.com/watch?v=abc"]
    );
    assert_eq!(report.added().count(), 3);
    assert_eq!(report.failed().count(), 0);
    assert_eq!(report.items[1].text, "the river flooded in spring");

    let sources = app.store.sources().unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[2].1, "https://www.youtube.com/watch?v=abc");
    assert_eq!(
        app.store.search("forest", 5).unwrap(),
        vec![SourceDocument::new("forest.txt", "Forests cover 31% of land.")]
    );
}

#[tokio::test]
async fn test_ingest_stores_diagnostics_by_default() {
    let app = test_app(true);

    let request = json_request(
        "/api/v1/content/ingest/sources",
        json!({ "sources": ["/data/budget.xlsx"] }),
    );

    let response = app.router.oneshot(request).await.unwrap();
    let report: IngestReport = read_json(response).await;

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].status, ItemStatus::Unsupported);
    assert!(report.items[0].stored);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(app.store.all_text().unwrap(), "Unsupported file type: .xlsx");
}

#[tokio::test]
async fn test_ingest_can_skip_failures() {
    let app = test_app(false);
    let notes = app.dir.path().join("notes.txt");
    std::fs::write(&notes, "Oceans cover most of Earth.").unwrap();

    let request = json_request(
        "/api/v1/content/ingest/sources",
        json!({ "sources": [notes.to_str().unwrap(), "/data/budget.xlsx", "  "] }),
    );

    let response = app.router.oneshot(request).await.unwrap();
    let report: IngestReport = read_json(response).await;

    assert_eq!(report.items.len(), 2);
    assert!(report.items[0].stored);
    assert!(!report.items[1].stored);
    assert_eq!(app.store.all_text().unwrap(), "Oceans cover most of Earth.");
}

#[tokio::test]
async fn test_ingest_without_inputs() {
    let app = test_app(true);

    let request = json_request("/api/v1/content/ingest/sources", json!({ "sources": [] }));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_answers_from_context() {
    let app = test_app(true);
    app.store.add("forest.txt", "Forests cover 31% of land.").unwrap();

    let request = json_request("/api/v1/query", json!({ "query": "forest?" }));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let result: QueryResponse = read_json(response).await;
    assert_eq!(result.answer, "grounded on: From forest.txt:");
}

#[tokio::test]
async fn test_query_on_empty_knowledge_base() {
    let app = test_app(true);

    let request = json_request("/api/v1/query", json!({ "query": "anything" }));
    let response = app.router.oneshot(request).await.unwrap();

    let result: QueryResponse = read_json(response).await;
    assert_eq!(result.answer, "No relevant information found in the knowledge base.");
}

#[tokio::test]
async fn test_blank_query_is_rejected() {
    let app = test_app(true);

    let request = json_request("/api/v1/query", json!({ "query": "   " }));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_invalid_json() {
    let app = test_app(true);

    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/api/v1/query")
        .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from("invalid json"))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_context_endpoint_respects_max_chars() {
    let app = test_app(true);
    app.store.add("forest.txt", "Forests cover 31% of land.").unwrap();
    app.store.add("ocean.txt", "Oceans cover most of Earth.").unwrap();

    let request = json_request(
        "/api/v1/query/context",
        json!({ "query": "xyz123", "max_chars": 10 }),
    );
    let response = app.router.oneshot(request).await.unwrap();

    let result: ContextResponse = read_json(response).await;
    assert_eq!(result.context, "Forests co");
}

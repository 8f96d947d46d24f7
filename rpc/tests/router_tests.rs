//! End-to-end router tests using the nullable collaborators.

use atelier_nullables::{NullContentStore, NullLedger};
use atelier_rpc::handlers::CALLER_HEADER;
use atelier_rpc::router;
use atelier_verification::{StaticAuthorizer, VerificationOrchestrator};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const ARTIST: &str = "0x000000000000000000000000000000000000000a";
const ADMIN: &str = "0x000000000000000000000000000000000000000f";

fn app() -> Router {
    let store = Arc::new(NullContentStore::new());
    let ledger = Arc::new(NullLedger::new());
    let authz = Arc::new(StaticAuthorizer::new([
        atelier_types::ArtistAddress::parse(ADMIN).unwrap()
    ]));
    let orchestrator = Arc::new(VerificationOrchestrator::new(store, ledger, authz));
    router(orchestrator)
}

fn submit_body() -> Value {
    json!({
        "artist_address": ARTIST,
        "profile": {
            "name": "Ada",
            "bio": "Paints with light",
            "portfolio_url": "https://example.com/portfolio",
            "email": "ada@example.com",
            "twitter": "@ada"
        }
    })
}

fn post(path: &str, caller: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(caller) = caller {
        builder = builder.header(CALLER_HEADER, caller);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn submit_returns_content_ref_and_receipt() {
    let app = app();
    let response = app
        .oneshot(post("/api/artist/submit", Some(ARTIST), submit_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(!body["content_ref"].as_str().unwrap().is_empty());
    assert!(!body["receipt_id"].as_str().unwrap().is_empty());
    assert_eq!(body["record"]["status"], "pending");
}

#[tokio::test]
async fn submit_without_caller_header_is_bad_request() {
    let app = app();
    let response = app
        .oneshot(post("/api/artist/submit", None, submit_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["kind"], "missing_caller");
}

#[tokio::test]
async fn submit_for_someone_else_is_forbidden() {
    let app = app();
    let other = "0x000000000000000000000000000000000000000b";
    let response = app
        .oneshot(post("/api/artist/submit", Some(other), submit_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn verify_requires_admin() {
    let app = app();
    app.clone()
        .oneshot(post("/api/artist/submit", Some(ARTIST), submit_body()))
        .await
        .unwrap();

    let body = json!({ "artist_address": ARTIST });
    let response = app
        .oneshot(post("/api/artist/verify", Some(ARTIST), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn full_moderation_flow_over_http() {
    let app = app();
    app.clone()
        .oneshot(post("/api/artist/submit", Some(ARTIST), submit_body()))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post(
            "/api/artist/verify",
            Some(ADMIN),
            json!({ "artist_address": ARTIST }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/artist/status/{ARTIST}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "verified");

    // A later reject conflicts with the terminal state.
    let response = app
        .clone()
        .oneshot(post(
            "/api/artist/reject",
            Some(ADMIN),
            json!({ "artist_address": ARTIST, "reason": "spam" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/artist/verified")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["artist"], ARTIST);
}

#[tokio::test]
async fn unknown_artist_status_is_not_found() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/artist/status/{ARTIST}?refresh=true"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_address_is_bad_request() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/artist/status/not-an-address")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["kind"], "validation");
}

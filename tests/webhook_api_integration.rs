//! End-to-end tests for the webhook endpoint: signed deliveries through the
//! real router, covering acceptance, rejection, filtering and fallbacks.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use hookrelay::{build_router, signature, RelayConfig, RelayState};

const SECRET: &str = "whsec_integration";

const INTENT_BODY: &str =
    r#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","amount":1999,"currency":"usd"}}}"#;

fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.stripe.webhook_secret = SECRET.to_string();
    // Keep the global recorder out of router tests
    config.metrics_enabled = false;
    config
}

fn router() -> axum::Router {
    let state = Arc::new(RelayState::new(test_config()).expect("state"));
    build_router(state)
}

fn signature_header(secret: &str, timestamp: i64, body: &str) -> String {
    let tag = signature::compute_tag(secret, timestamp, body.as_bytes());
    format!("t={timestamp},v1={tag}")
}

fn signed_request(header: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/stripe-webhook")
        .header("stripe-signature", header)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn valid_delivery_with_no_channels_returns_ok_with_zero_dispatches() {
    let now = chrono::Utc::now().timestamp();
    let header = signature_header(SECRET, now, INTENT_BODY);

    let response = router().oneshot(signed_request(&header, INTENT_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dispatched"], 0);
    assert_eq!(json["delivered"], 0);
}

#[tokio::test]
async fn stale_timestamp_is_rejected() {
    let stale = chrono::Utc::now().timestamp() - 600;
    let header = signature_header(SECRET, stale, INTENT_BODY);

    let response = router().oneshot(signed_request(&header, INTENT_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forged_tag_is_rejected_without_naming_the_check() {
    let now = chrono::Utc::now().timestamp();
    let header = format!(
        "t={now},v1=0000000000000000000000000000000000000000000000000000000000000000"
    );

    let response = router().oneshot(signed_request(&header, INTENT_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "AUTH_FAILED");
    assert_eq!(json["error"]["message"], "invalid signature");
}

#[tokio::test]
async fn missing_header_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/stripe-webhook")
        .body(Body::from(INTENT_BODY))
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_but_tampered_body_is_rejected() {
    let now = chrono::Utc::now().timestamp();
    let header = signature_header(SECRET, now, INTENT_BODY);
    let tampered = INTENT_BODY.replace("1999", "1");

    let response = router().oneshot(signed_request(&header, &tampered)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unaccepted_event_type_is_ignored_with_success() {
    let body = r#"{"type":"customer.created","id":"evt_c1","data":{"object":{}}}"#;
    let now = chrono::Utc::now().timestamp();
    let header = signature_header(SECRET, now, body);

    let response = router().oneshot(signed_request(&header, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ignored");
}

#[tokio::test]
async fn well_signed_garbage_is_a_bad_request() {
    let body = "not json at all";
    let now = chrono::Utc::now().timestamp();
    let header = signature_header(SECRET, now, body);

    let response = router().oneshot(signed_request(&header, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn empty_secret_rejects_even_a_self_consistent_delivery() {
    let mut config = test_config();
    config.stripe.webhook_secret = String::new();
    let state = Arc::new(RelayState::new(config).unwrap());
    let app = build_router(state);

    let now = chrono::Utc::now().timestamp();
    let header = signature_header("", now, INTENT_BODY);

    let response = app.oneshot(signed_request(&header, INTENT_BODY)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_probe_answers() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "hookrelay");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let request = Request::builder()
        .method("GET")
        .uri("/nope")
        .body(Body::empty())
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_method_on_webhook_path_is_not_found() {
    let request = Request::builder()
        .method("GET")
        .uri("/stripe-webhook")
        .body(Body::empty())
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_disabled_renders_not_found() {
    let request = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

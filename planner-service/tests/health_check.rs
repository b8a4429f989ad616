mod common;

use axum::http::StatusCode;
use common::{body_text, TestApp};
use planner_service::services::providers::mock::MockTextProvider;

#[tokio::test]
async fn health_check_works() {
    let mut app = TestApp::new(MockTextProvider::new("ok"));

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let mut app = TestApp::new(MockTextProvider::new("ok"));

    let response = app
        .send(
            axum::http::Request::builder()
                .uri("/health")
                .header("x-request-id", "test-123")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.headers().get("x-request-id").unwrap(), "test-123");

    let response = app.get("/health").await;
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn metrics_endpoint_exposes_http_counters() {
    planner_service::services::metrics::init_metrics().unwrap();
    let mut app = TestApp::new(MockTextProvider::new("ok"));

    app.get("/health").await;
    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("http_requests_total"));
}

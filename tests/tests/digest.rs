//! Tests for the cached digest content endpoint.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;

#[tokio::test]
async fn digest_is_computed_once_then_served_from_cache() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.mock_pipeline
        .set_compute_result(serde_json::json!({"items": ["manchete"]}));

    let response = server.get("/digest/trends").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["items"][0], "manchete");
    assert_eq!(ctx.mock_pipeline.compute_call_count(), 1);

    // Second request within the freshness window: no recomputation.
    let response = server.get("/digest/trends").await;
    response.assert_status_ok();
    assert_eq!(ctx.mock_pipeline.compute_call_count(), 1);
}

#[tokio::test]
async fn digest_tags_are_cached_separately() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/digest/topics").await.assert_status_ok();
    server
        .get("/digest/topics")
        .add_query_param("tag", "brasil")
        .await
        .assert_status_ok();

    assert_eq!(ctx.mock_pipeline.compute_call_count(), 2);
}

#[tokio::test]
async fn unknown_digest_kind_is_not_found() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/digest/weather").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pipeline_failure_surfaces_as_bad_gateway() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.mock_pipeline.set_should_fail(true);

    let response = server.get("/digest/summary").await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);

    // Failures are not cached: recovery is immediate.
    ctx.mock_pipeline.set_should_fail(false);
    let response = server.get("/digest/summary").await;
    response.assert_status_ok();
}

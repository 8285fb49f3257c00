//! Tests for the administrative surface: cache invalidation, cache
//! statistics, and session enumeration.

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use gateway_core::ContentKind;
use integration_tests::fixtures::TEST_ADMIN_TOKEN;
use integration_tests::setup::TestContext;

fn bearer() -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {TEST_ADMIN_TOKEN}")).unwrap()
}

#[tokio::test]
async fn admin_routes_require_bearer_token() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/admin/cache/stats").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "AUTH_001");

    let response = server
        .get("/admin/cache/stats")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer wrong"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "AUTH_003");

    let response = server
        .get("/admin/cache/stats")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic abc"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "AUTH_002");
}

#[tokio::test]
async fn invalidate_by_prefix_removes_exactly_matching_entries() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.state
        .cache
        .set(ContentKind::Trends, "global", serde_json::json!({"n": 1}));
    ctx.state
        .cache
        .set(ContentKind::Trends, "brasil", serde_json::json!({"n": 2}));
    ctx.state
        .cache
        .set(ContentKind::Topics, "global", serde_json::json!({"n": 3}));

    let response = server
        .post("/admin/cache/invalidate")
        .add_header(AUTHORIZATION, bearer())
        .json(&serde_json::json!({ "prefix": "trends:", "reason": "editorial refresh" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    assert!(ctx.state.cache.get(ContentKind::Trends, "global").is_none());
    assert!(ctx.state.cache.get(ContentKind::Trends, "brasil").is_none());
    assert!(ctx.state.cache.get(ContentKind::Topics, "global").is_some());
}

#[tokio::test]
async fn invalidate_by_explicit_keys() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.state
        .cache
        .set(ContentKind::Summary, "global", serde_json::json!({"n": 1}));

    let response = server
        .post("/admin/cache/invalidate")
        .add_header(AUTHORIZATION, bearer())
        .json(&serde_json::json!({ "keys": ["summary:global", "summary:missing"] }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn invalidate_without_selectors_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.state
        .cache
        .set(ContentKind::Trends, "global", serde_json::json!({"n": 1}));

    let response = server
        .post("/admin/cache/invalidate")
        .add_header(AUTHORIZATION, bearer())
        .json(&serde_json::json!({ "reason": "nothing selected" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_002");

    // No entries were touched.
    assert!(ctx.state.cache.get(ContentKind::Trends, "global").is_some());
}

#[tokio::test]
async fn cache_stats_shape() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.state
        .cache
        .set(ContentKind::Trends, "global", serde_json::json!({"n": 1}));
    let _ = ctx.state.cache.get(ContentKind::Trends, "global");
    let _ = ctx.state.cache.get(ContentKind::Topics, "global");

    let response = server
        .get("/admin/cache/stats")
        .add_header(AUTHORIZATION, bearer())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["hits"], 1);
    assert_eq!(body["misses"], 1);
    assert_eq!(body["entries"], 1);
    assert_eq!(body["inflight"], 0);
    assert!(body.get("evictions").is_some());
}

#[tokio::test]
async fn session_enumeration_is_redacted() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let (session_id, _rx) = ctx.register_session("user-a");
    let (_other_id, _rx2) = ctx.register_session("user-b");

    let response = server
        .get("/admin/sessions")
        .add_header(AUTHORIZATION, bearer())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 2);

    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    let listed = sessions
        .iter()
        .find(|s| s["session_id"] == session_id.as_str())
        .expect("registered session is enumerated");

    assert_eq!(listed["user_id"], "user-a");
    assert_eq!(listed["user_email"], "user-a@example.com");
    assert!(listed.get("connected_at").is_some());
    assert!(listed.get("last_heartbeat").is_some());
    // The connection handle and metadata never cross the admin surface.
    assert!(listed.get("handle").is_none());
    assert!(listed.get("metadata").is_none());
}

//! Session establishment: the handoff token gates the duplex upgrade.
//!
//! The token is checked before the upgrade, so rejection is observable over
//! plain HTTP; a valid token over plain HTTP is answered with an upgrade
//! demand rather than a credential error.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use integration_tests::fixtures::{sign_claims, sign_token, TEST_SECRET};
use integration_tests::setup::TestContext;

#[tokio::test]
async fn connection_without_token_is_unauthorized() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/ws").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "TOKEN_001");
    assert!(ctx.state.registry.is_empty());
}

#[tokio::test]
async fn connection_with_forged_token_is_unauthorized() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let now = Utc::now().timestamp();
    let forged = sign_token("some-other-secret", "mallory@example.com", now, now + 600);

    let response = server
        .get("/ws")
        .add_query_param("token", forged)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(ctx.state.registry.is_empty());
}

#[tokio::test]
async fn connection_with_expired_token_is_unauthorized() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let now = Utc::now().timestamp();
    let expired = sign_token(TEST_SECRET, "ana@example.com", now - 700, now - 100);

    let response = server
        .get("/ws")
        .add_query_param("token", expired)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn connection_with_wrong_audience_is_unauthorized() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let now = Utc::now().timestamp();
    let claims = serde_json::json!({
        "email": "ana@example.com",
        "iat": now,
        "exp": now + 600,
        "iss": gateway_core::TOKEN_ISSUER,
        "aud": "mobile",
    });
    let token = sign_claims(TEST_SECRET, &claims);

    let response = server
        .get("/ws")
        .add_query_param("token", token)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_over_plain_http_demands_an_upgrade() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let now = Utc::now().timestamp();
    let token = sign_token(TEST_SECRET, "ana@example.com", now, now + 600);

    // The token was accepted — what's missing is the websocket handshake.
    let response = server
        .get("/ws")
        .add_query_param("token", token)
        .await;
    assert_eq!(response.status_code(), StatusCode::UPGRADE_REQUIRED);
}

//! Shared test fixtures.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use gateway_core::{TOKEN_AUDIENCE, TOKEN_ISSUER};

/// Signing secret used across the integration tests.
pub const TEST_SECRET: &str = "integration-test-secret";

/// Admin bearer token used across the integration tests.
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

/// Builds a handoff token the way the identity provider does.
pub fn sign_token(secret: &str, email: &str, iat: i64, exp: i64) -> String {
    let claims = serde_json::json!({
        "email": email,
        "iat": iat,
        "exp": exp,
        "iss": TOKEN_ISSUER,
        "aud": TOKEN_AUDIENCE,
    });
    sign_claims(secret, &claims)
}

/// Builds a token from arbitrary claims (for negative tests).
pub fn sign_claims(secret: &str, claims: &serde_json::Value) -> String {
    let header =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&serde_json::json!({"alg": "HS256"})).unwrap());
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{header}.{payload}.{signature}")
}

/// A callback payload as the pipeline sends it.
pub fn callback_json(
    event: &str,
    message: serde_json::Value,
    correlation_id: Option<&str>,
    session_id: Option<&str>,
) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "event": event,
        "message": message,
    });
    if let Some(id) = correlation_id {
        payload["correlation_id"] = serde_json::json!(id);
    }
    if let Some(id) = session_id {
        payload["session_id"] = serde_json::json!(id);
    }
    payload
}

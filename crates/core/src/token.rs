//! Webchannel handoff token verification.
//!
//! The identity provider hands the browser a compact signed token asserting
//! an email identity; the gateway verifies it during session establishment
//! so the client never presents a password. Format: three dot-separated
//! URL-safe base64 segments (header, payload, signature), signed with
//! HMAC-SHA256 over `header + "." + payload`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Fixed issuer claim the payload must carry.
pub const TOKEN_ISSUER: &str = "quenty.com.br";

/// Fixed audience claim the payload must carry.
pub const TOKEN_AUDIENCE: &str = "webchannel";

/// Verified claims extracted from a handoff token.
///
/// Exists only for the duration of a single verification call; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub email: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Stateless verifier for webchannel handoff tokens.
///
/// Verification is a pure function of token + secret + current time.
pub struct TokenVerifier {
    secret: Vec<u8>,
}

impl TokenVerifier {
    /// Creates a verifier from the shared signing secret.
    ///
    /// An absent secret is a startup-class configuration error: the verifier
    /// refuses to exist rather than silently accept forged tokens.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::internal(
                "webchannel signing secret is not configured",
            ));
        }
        Ok(Self { secret })
    }

    /// Verifies a token against the current wall clock.
    ///
    /// Returns `None` for any malformed or invalid token; never panics.
    pub fn verify(&self, token: &str) -> Option<TokenPayload> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies a token against an explicit time, in seconds since epoch.
    pub fn verify_at(&self, token: &str, now_secs: i64) -> Option<TokenPayload> {
        let mut segments = token.split('.');
        let header = segments.next()?;
        let payload = segments.next()?;
        let signature = segments.next()?;
        if segments.next().is_some() {
            return None;
        }

        // Recompute the MAC over the literal signing input and compare
        // against the decoded signature segment in constant time.
        let sig_bytes = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig_bytes).ok()?;

        let payload_bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;

        if claims.get("iss")?.as_str()? != TOKEN_ISSUER {
            return None;
        }
        if claims.get("aud")?.as_str()? != TOKEN_AUDIENCE {
            return None;
        }
        let email = claims.get("email")?.as_str()?.to_string();
        let iat = claims.get("iat")?.as_i64()?;
        let exp = claims.get("exp")?.as_i64()?;

        // Strict: a token expiring exactly now is already dead. No leeway.
        if exp <= now_secs {
            return None;
        }

        Some(TokenPayload { email, iat, exp })
    }
}

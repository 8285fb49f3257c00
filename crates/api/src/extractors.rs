//! Request extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use gateway_core::error::AuthErrorCode;

use crate::response::ApiError;
use crate::state::AppState;

/// Proof that the request carried the administrative bearer token.
#[derive(Debug, Clone)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                ApiError::unauthorized(
                    AuthErrorCode::MissingCredential.code(),
                    "bearer token required",
                )
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::unauthorized(
                AuthErrorCode::MalformedCredential.code(),
                "expected Bearer authorization",
            )
        })?;

        if token.trim() != state.admin_token {
            return Err(ApiError::unauthorized(
                AuthErrorCode::InvalidCredential.code(),
                "invalid bearer token",
            ));
        }

        Ok(AdminAuth)
    }
}

/// Client IP address.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // X-Forwarded-For first (for proxied requests), first hop wins.
        if let Some(xff) = parts.headers.get("X-Forwarded-For") {
            if let Ok(xff_str) = xff.to_str() {
                if let Some(ip) = xff_str.split(',').next() {
                    return Ok(ClientIp(Some(ip.trim().to_string())));
                }
            }
        }

        if let Some(real_ip) = parts.headers.get("X-Real-IP") {
            if let Ok(ip) = real_ip.to_str() {
                return Ok(ClientIp(Some(ip.to_string())));
            }
        }

        Ok(ClientIp(None))
    }
}

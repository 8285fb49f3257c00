//! Administrative endpoints: cache invalidation, cache statistics, and
//! session enumeration. All bearer-token protected via [`AdminAuth`].

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use gateway_core::CacheStats;

use crate::extractors::AdminAuth;
use crate::response::{ApiError, InvalidateResponse, SessionsResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// POST /admin/cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Json(request): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let count = state
        .cache
        .invalidate(request.keys.as_deref(), request.prefix.as_deref())?;

    info!(
        count,
        keys = ?request.keys,
        prefix = request.prefix.as_deref().unwrap_or(""),
        reason = request.reason.as_deref().unwrap_or("unspecified"),
        "Cache invalidated"
    );

    Ok(Json(InvalidateResponse::removed(count)))
}

/// GET /admin/cache/stats
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// GET /admin/sessions
///
/// Snapshot enumeration of the redacted session list: identifiers, user,
/// email, and timestamps — never the connection handle or metadata.
pub async fn sessions_handler(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Json<SessionsResponse> {
    let sessions = state.registry.list_all();
    Json(SessionsResponse {
        count: sessions.len(),
        sessions,
    })
}

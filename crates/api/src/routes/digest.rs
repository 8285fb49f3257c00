//! Cached digest content endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::time::Instant;
use telemetry::metrics;

use gateway_core::{ContentKind, DEFAULT_CONTENT_TAG};

use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DigestQuery {
    pub tag: Option<String>,
}

/// GET /digest/:kind?tag=...
///
/// Served through the cache; a cold key triggers at most one pipeline
/// computation no matter how many requests race for it.
pub async fn digest_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<DigestQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let kind: ContentKind = kind
        .parse()
        .map_err(|_| ApiError::not_found(format!("unknown content kind: {kind}")))?;
    let tag = query.tag.as_deref().unwrap_or(DEFAULT_CONTENT_TAG);

    let start = Instant::now();
    let payload = state.coordinator.request_content(kind, tag).await?;
    metrics()
        .compute_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    Ok(Json(payload))
}

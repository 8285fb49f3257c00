//! Pipeline callback endpoint.
//!
//! The automation pipeline answers dispatched requests here, echoing the
//! correlation identifier it was handed. Unroutable callbacks (expired
//! correlation, vanished session) are an expected outcome and reported in
//! the response body, not as an error status.

use axum::{body::Bytes, extract::State, Json};
use std::time::Instant;
use telemetry::metrics;
use tracing::debug;

use gateway_core::PipelineCallback;

use crate::extractors::ClientIp;
use crate::response::{ApiError, CallbackResponse};
use crate::state::AppState;

/// POST /internal/pipeline/callback
pub async fn callback_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    body: Bytes,
) -> Result<Json<CallbackResponse>, ApiError> {
    let start = Instant::now();

    let limiter_key = client_ip.unwrap_or_else(|| "unknown".to_string());
    if !state.callback_limiter.check(&limiter_key) {
        metrics().rate_limited_requests.inc();
        return Err(ApiError::rate_limited("callback rate limit exceeded", Some(1)));
    }

    let callback: PipelineCallback = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Unparseable callback payload");
        ApiError::bad_request(format!("invalid callback payload: {e}"))
    })?;

    let outcome = state.coordinator.handle_callback(callback).await;

    metrics()
        .callback_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    Ok(Json(CallbackResponse {
        success: true,
        outcome: outcome.as_str().to_string(),
    }))
}

//! Duplex connection endpoint.
//!
//! Session establishment: the browser presents its handoff token as a query
//! parameter; the upgrade is refused outright when verification fails. Once
//! upgraded, one task owns the socket: inbound frames are parsed and routed,
//! outbound frames drain from the session's channel, and either side
//! closing tears the session down.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use telemetry::metrics;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use validator::Validate;

use gateway_core::{ClientFrame, FrameKind, OutboundFrame, Session, TokenPayload};

use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// GET /ws?token=...
///
/// The handoff token is checked before the upgrade: a client that cannot
/// prove an identity never gets a socket.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let token = query.token.unwrap_or_default();
    let Some(payload) = state.verifier.verify(&token) else {
        metrics().tokens_rejected.inc();
        debug!("Refusing connection: handoff token rejected");
        return ApiError::from(gateway_core::Error::TokenRejected).into_response();
    };
    metrics().tokens_verified.inc();

    match ws {
        Some(upgrade) => upgrade.on_upgrade(move |socket| handle_socket(socket, state, payload)),
        None => ApiError::with_code(
            StatusCode::UPGRADE_REQUIRED,
            "UPGRADE_REQUIRED",
            "websocket upgrade required",
        )
        .into_response(),
    }
}

async fn handle_socket(mut socket: WebSocket, state: AppState, payload: TokenPayload) {
    let (tx, mut outbound) = mpsc::unbounded_channel::<OutboundFrame>();
    let user_id = derive_user_id(&payload.email);
    let session = Session::new(user_id.clone(), payload.email.clone(), tx);
    if let Err(e) = session.validate() {
        warn!(error = %e, "Refusing session with invalid identity");
        return;
    }

    let session_id = session.id.clone();
    state.registry.register(session);
    metrics().sessions_opened.inc();
    metrics().active_sessions.set(state.registry.len() as u64);
    info!(session_id = %session_id, user_id = %user_id, "Session connected");

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                match frame {
                    Some(frame) => {
                        let Ok(text) = serde_json::to_string(&frame) else { continue };
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Registry entry replaced or removed from elsewhere.
                    None => break,
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&state, &session_id, &user_id, &payload.email, &text).await;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        state.registry.touch(&session_id);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(session_id = %session_id, error = %e, "Socket error");
                        break;
                    }
                }
            }
        }
    }

    state.registry.remove(&session_id);
    metrics().sessions_closed.inc();
    metrics().active_sessions.set(state.registry.len() as u64);
    info!(session_id = %session_id, "Session disconnected");
}

async fn handle_frame(
    state: &AppState,
    session_id: &str,
    user_id: &str,
    user_email: &str,
    text: &str,
) {
    metrics().frames_received.inc();

    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(session_id, error = %e, "Dropping unparseable frame");
            return;
        }
    };

    match frame.kind {
        FrameKind::Ping => {
            state.registry.touch(session_id);
            metrics().heartbeats.inc();
            state.registry.send(session_id, OutboundFrame::pong());
        }
        FrameKind::Pong => {
            state.registry.touch(session_id);
        }
        FrameKind::TypingStart | FrameKind::TypingStop | FrameKind::ReadReceipt => {
            // Presence signals count as liveness but have no server-side
            // consumer.
            state.registry.touch(session_id);
            debug!(session_id, kind = frame.kind.as_str(), "Presence frame");
        }
        FrameKind::Message => {
            state.registry.touch(session_id);
            if let Err(e) = state
                .coordinator
                .handle_client_message(session_id, user_id, user_email, frame)
                .await
            {
                warn!(session_id, error = %e, "Dispatch failed");
                state.registry.send(
                    session_id,
                    OutboundFrame::new(
                        "error",
                        serde_json::json!({ "message": "request could not be forwarded" }),
                    ),
                );
            }
        }
    }
}

/// Stable per-email user identifier.
///
/// The user store lives outside the gateway; a hash of the verified email
/// is enough to correlate a user's sessions within this process.
fn derive_user_id(email: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    email.hash(&mut hasher);
    format!("user_{:016x}", hasher.finish())
}

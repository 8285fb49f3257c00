//! Live session handling.
//!
//! One `Session` exists per authenticated duplex connection. The registry is
//! the sole owner of sessions; every other component refers to them by
//! identifier only. The connection handle is an in-process channel sender
//! draining into the WebSocket write loop — it is never serialized and never
//! crosses the admin surface.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;
use validator::Validate;

use crate::message::OutboundFrame;

/// Sessions with no heartbeat for this long are considered dead (5 minutes).
pub const SESSION_LIVENESS_TIMEOUT: Duration = Duration::from_secs(300);

/// Sender half of a session's outbound frame channel.
pub type ConnectionHandle = mpsc::UnboundedSender<OutboundFrame>;

/// A connected, authenticated duplex session.
#[derive(Debug, Clone, Validate)]
pub struct Session {
    /// Unique session ID, `sess_<uuid>`, unique for the process lifetime.
    pub id: String,
    /// Stable user identifier (max 128 chars).
    #[validate(length(max = 128))]
    pub user_id: String,
    /// Email asserted by the verified handoff token.
    #[validate(email)]
    pub user_email: String,
    /// Outbound frame channel into the connection's write loop.
    pub handle: ConnectionHandle,
    /// Connection accept time.
    pub connected_at: DateTime<Utc>,
    /// Last liveness signal.
    pub last_heartbeat: DateTime<Utc>,
    /// Opaque per-connection metadata (client version, locale, ...).
    pub metadata: Option<serde_json::Value>,
}

impl Session {
    /// Creates a new session with a freshly generated identifier.
    pub fn new(
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        handle: ConnectionHandle,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("sess_{}", Uuid::new_v4().simple()),
            user_id: user_id.into(),
            user_email: user_email.into(),
            handle,
            connected_at: now,
            last_heartbeat: now,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether the last heartbeat is older than the given timeout.
    pub fn is_stale(&self, timeout: Duration) -> bool {
        let age = Utc::now() - self.last_heartbeat;
        age.num_milliseconds() > timeout.as_millis() as i64
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            user_id: self.user_id.clone(),
            user_email: self.user_email.clone(),
            connected_at: self.connected_at,
            last_heartbeat: self.last_heartbeat,
        }
    }
}

/// Redacted session view for administrative enumeration.
///
/// Deliberately excludes the connection handle and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub user_id: String,
    pub user_email: String,
    pub connected_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
}

/// Authoritative table of currently-connected sessions.
pub struct SessionRegistry {
    sessions: parking_lot::RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: parking_lot::RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces the session keyed by its identifier.
    pub fn register(&self, session: Session) {
        self.sessions.write().insert(session.id.clone(), session);
    }

    /// Updates the session's last heartbeat to now.
    ///
    /// Returns `false` when the session is absent.
    pub fn touch(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.last_heartbeat = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Redacted view of a single session.
    pub fn get(&self, session_id: &str) -> Option<SessionSummary> {
        self.sessions.read().get(session_id).map(Session::summary)
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }

    /// Snapshot of all sessions for administrative enumeration.
    ///
    /// A snapshot, not a live view: callers iterate freely while
    /// registrations continue.
    pub fn list_all(&self) -> Vec<SessionSummary> {
        self.sessions.read().values().map(Session::summary).collect()
    }

    /// Pushes a frame onto the session's connection handle.
    ///
    /// Returns `false` when the session is absent or its connection has
    /// already closed (receiver dropped).
    pub fn send(&self, session_id: &str, frame: OutboundFrame) -> bool {
        let handle = match self.sessions.read().get(session_id) {
            Some(session) => session.handle.clone(),
            None => return false,
        };
        handle.send(frame).is_ok()
    }

    /// Removes sessions whose heartbeat exceeded the liveness timeout,
    /// returning the removed identifiers.
    pub fn reap_stale(&self, timeout: Duration) -> Vec<String> {
        let mut sessions = self.sessions.write();
        let dead: Vec<String> = sessions
            .values()
            .filter(|s| s.is_stale(timeout))
            .map(|s| s.id.clone())
            .collect();
        for id in &dead {
            sessions.remove(id);
        }
        dead
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

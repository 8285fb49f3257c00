//! Stale-session reaping.
//!
//! A connection that stops heartbeating without closing leaves a dead
//! registry entry behind; the reaper enforces the liveness timeout so the
//! table reflects connections that are actually alive.

use std::sync::Arc;
use std::time::Duration;

use telemetry::metrics;
use tracing::info;

use gateway_core::SessionRegistry;

pub struct SessionReaper {
    registry: Arc<SessionRegistry>,
    timeout: Duration,
}

impl SessionReaper {
    pub fn new(registry: Arc<SessionRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Runs one reap pass, returning the removed session identifiers.
    pub fn run(&self) -> Vec<String> {
        let reaped = self.registry.reap_stale(self.timeout);
        if !reaped.is_empty() {
            info!(count = reaped.len(), "Reaped stale sessions");
            metrics().sessions_reaped.inc_by(reaped.len() as u64);
        }
        metrics().active_sessions.set(self.registry.len() as u64);
        reaped
    }
}

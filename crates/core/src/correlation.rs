//! Correlation tracking for asynchronous pipeline replies.
//!
//! When a request is dispatched to the automation pipeline it carries an
//! opaque correlation identifier; the eventual callback presents the same
//! identifier and must be routed back to the connection that originated the
//! request. Entries expire lazily on access after a fixed TTL — there is no
//! background sweep in the contract, so the map may grow between accesses
//! (an accepted bounded leak; the worker crate runs an optional hygiene
//! sweep that does not change observable behavior).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Correlation entries are valid for 10 minutes after creation.
pub const DEFAULT_CORRELATION_TTL: Duration = Duration::from_secs(600);

/// The originating context of one dispatched pipeline request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationEntry {
    pub correlation_id: String,
    pub session_id: String,
    pub user_id: String,
    pub user_email: Option<String>,
}

struct TrackedEntry {
    entry: CorrelationEntry,
    created_at: Instant,
}

/// Short-lived map from correlation identifier to originating context.
pub struct CorrelationTracker {
    entries: Mutex<HashMap<String, TrackedEntry>>,
    ttl: Duration,
}

impl CorrelationTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Records the originating context for a correlation identifier.
    ///
    /// An existing entry for the same identifier is overwritten
    /// unconditionally (last-writer-wins). This is intentional: the pipeline
    /// may retry a request under the same identifier, and the freshest
    /// context wins.
    pub fn track(
        &self,
        correlation_id: impl Into<String>,
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        user_email: Option<String>,
    ) {
        let correlation_id = correlation_id.into();
        let tracked = TrackedEntry {
            entry: CorrelationEntry {
                correlation_id: correlation_id.clone(),
                session_id: session_id.into(),
                user_id: user_id.into(),
                user_email,
            },
            created_at: Instant::now(),
        };
        self.entries.lock().insert(correlation_id, tracked);
    }

    /// Looks up the context for a correlation identifier.
    ///
    /// Returns `None` when the identifier is absent, and applies the lazy
    /// TTL check: an entry older than the TTL is deleted and reported
    /// absent. A surviving entry is returned unchanged — its age is not
    /// refreshed, so repeated resolution of the same identifier (partial
    /// callbacks) still expires at the original deadline.
    pub fn resolve(&self, correlation_id: Option<&str>) -> Option<CorrelationEntry> {
        self.resolve_at(correlation_id, Instant::now())
    }

    fn resolve_at(&self, correlation_id: Option<&str>, now: Instant) -> Option<CorrelationEntry> {
        let id = correlation_id?;
        let mut entries = self.entries.lock();
        let tracked = entries.get(id)?;
        if now.duration_since(tracked.created_at) > self.ttl {
            entries.remove(id);
            return None;
        }
        Some(tracked.entry.clone())
    }

    /// Removes an entry. No-op when the identifier is absent or `None`.
    pub fn clear(&self, correlation_id: Option<&str>) {
        if let Some(id) = correlation_id {
            self.entries.lock().remove(id);
        }
    }

    /// Removes every expired entry and returns how many were dropped.
    ///
    /// Memory hygiene only; `resolve` already treats expired entries as
    /// absent, so sweeping changes no observable behavior.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, tracked| now.duration_since(tracked.created_at) <= self.ttl);
        before - entries.len()
    }

    /// Current entry count, including not-yet-swept expired entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    #[cfg(test)]
    fn backdate(&self, correlation_id: &str, age: Duration) {
        let mut entries = self.entries.lock();
        if let Some(tracked) = entries.get_mut(correlation_id) {
            tracked.created_at = Instant::now().checked_sub(age).unwrap();
        }
    }
}

impl Default for CorrelationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CORRELATION_TTL)
    }
}

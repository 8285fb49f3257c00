//! Internal metrics collection.
//!
//! Lock-free atomic counters for the delivery path; snapshots are logged
//! periodically by the background worker and surfaced on the health route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }
}

/// Collected metrics for the gateway.
#[derive(Debug, Default)]
pub struct Metrics {
    // Session lifecycle
    pub tokens_verified: Counter,
    pub tokens_rejected: Counter,
    pub sessions_opened: Counter,
    pub sessions_closed: Counter,
    pub sessions_reaped: Counter,
    pub heartbeats: Counter,

    // Delivery path
    pub frames_received: Counter,
    pub dispatches: Counter,
    pub dispatch_failures: Counter,
    pub callbacks_received: Counter,
    pub callbacks_delivered: Counter,
    pub callbacks_dropped_unresolved: Counter,
    pub callbacks_dropped_session_gone: Counter,
    pub rate_limited_requests: Counter,

    // Latency histograms
    pub callback_latency_ms: Histogram,
    pub compute_latency_ms: Histogram,

    // Gauges
    pub active_sessions: Gauge,
    pub correlation_entries: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            tokens_verified: self.tokens_verified.get(),
            tokens_rejected: self.tokens_rejected.get(),
            sessions_opened: self.sessions_opened.get(),
            sessions_closed: self.sessions_closed.get(),
            sessions_reaped: self.sessions_reaped.get(),
            heartbeats: self.heartbeats.get(),
            frames_received: self.frames_received.get(),
            dispatches: self.dispatches.get(),
            dispatch_failures: self.dispatch_failures.get(),
            callbacks_received: self.callbacks_received.get(),
            callbacks_delivered: self.callbacks_delivered.get(),
            callbacks_dropped_unresolved: self.callbacks_dropped_unresolved.get(),
            callbacks_dropped_session_gone: self.callbacks_dropped_session_gone.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            callback_latency_mean_ms: self.callback_latency_ms.mean(),
            compute_latency_mean_ms: self.compute_latency_ms.mean(),
            active_sessions: self.active_sessions.get(),
            correlation_entries: self.correlation_entries.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub tokens_verified: u64,
    pub tokens_rejected: u64,
    pub sessions_opened: u64,
    pub sessions_closed: u64,
    pub sessions_reaped: u64,
    pub heartbeats: u64,
    pub frames_received: u64,
    pub dispatches: u64,
    pub dispatch_failures: u64,
    pub callbacks_received: u64,
    pub callbacks_delivered: u64,
    pub callbacks_dropped_unresolved: u64,
    pub callbacks_dropped_session_gone: u64,
    pub rate_limited_requests: u64,
    pub callback_latency_mean_ms: f64,
    pub compute_latency_mean_ms: f64,
    pub active_sessions: u64,
    pub correlation_entries: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}

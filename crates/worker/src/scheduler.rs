//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use gateway_core::{ContentCache, CorrelationTracker, SessionRegistry, SESSION_LIVENESS_TIMEOUT};

use crate::reaper::SessionReaper;
use crate::sweep::HygieneSweep;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Hygiene sweep interval
    pub sweep_interval: Duration,
    /// Stale-session reap interval
    pub reap_interval: Duration,
    /// Session liveness timeout
    pub session_timeout: Duration,
    /// Metrics snapshot log interval
    pub stats_log_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            reap_interval: Duration::from_secs(60),
            session_timeout: SESSION_LIVENESS_TIMEOUT,
            stats_log_interval: Duration::from_secs(60),
        }
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    registry: Arc<SessionRegistry>,
    correlations: Arc<CorrelationTracker>,
    cache: Arc<ContentCache>,
}

impl WorkerScheduler {
    pub fn new(
        config: WorkerConfig,
        registry: Arc<SessionRegistry>,
        correlations: Arc<CorrelationTracker>,
        cache: Arc<ContentCache>,
    ) -> Self {
        Self {
            config,
            registry,
            correlations,
            cache,
        }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_hygiene_sweep().await;
        }));

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_session_reaper().await;
        }));

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_stats_log().await;
        }));

        info!("Background workers started");
        handles
    }

    async fn run_hygiene_sweep(&self) {
        let sweep = HygieneSweep::new(self.correlations.clone(), self.cache.clone());
        let mut ticker = interval(self.config.sweep_interval);

        loop {
            ticker.tick().await;
            sweep.run();
        }
    }

    async fn run_session_reaper(&self) {
        let reaper = SessionReaper::new(self.registry.clone(), self.config.session_timeout);
        let mut ticker = interval(self.config.reap_interval);

        loop {
            ticker.tick().await;
            reaper.run();
        }
    }

    async fn run_stats_log(&self) {
        use telemetry::metrics;

        let mut ticker = interval(self.config.stats_log_interval);

        loop {
            ticker.tick().await;

            let snapshot = metrics().snapshot();
            let cache_stats = self.cache.stats();
            info!(
                active_sessions = snapshot.active_sessions,
                callbacks_delivered = snapshot.callbacks_delivered,
                callbacks_dropped_unresolved = snapshot.callbacks_dropped_unresolved,
                callbacks_dropped_session_gone = snapshot.callbacks_dropped_session_gone,
                cache_hits = cache_stats.hits,
                cache_misses = cache_stats.misses,
                cache_entries = cache_stats.entries,
                "Gateway metrics"
            );
        }
    }
}

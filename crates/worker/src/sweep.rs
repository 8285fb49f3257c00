//! Memory-hygiene sweeps.
//!
//! Both the correlation tracker and the content cache expire lazily on
//! access; between accesses their maps can only grow. This sweep removes
//! entries that are already past their TTL — it never changes what
//! `resolve` or `get` would have returned.

use std::sync::Arc;

use telemetry::metrics;
use tracing::debug;

use gateway_core::{ContentCache, CorrelationTracker};

pub struct HygieneSweep {
    correlations: Arc<CorrelationTracker>,
    cache: Arc<ContentCache>,
}

impl HygieneSweep {
    pub fn new(correlations: Arc<CorrelationTracker>, cache: Arc<ContentCache>) -> Self {
        Self {
            correlations,
            cache,
        }
    }

    /// Runs one sweep pass, returning (correlations, cache entries) removed.
    pub fn run(&self) -> (usize, usize) {
        let correlations_removed = self.correlations.sweep_expired();
        let cache_removed = self.cache.sweep_expired();

        metrics()
            .correlation_entries
            .set(self.correlations.len() as u64);

        if correlations_removed > 0 || cache_removed > 0 {
            debug!(
                correlations_removed,
                cache_removed, "Hygiene sweep removed expired entries"
            );
        }
        (correlations_removed, cache_removed)
    }
}

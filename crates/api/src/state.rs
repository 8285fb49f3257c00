//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use gateway_core::{CacheConfig, ContentCache, CorrelationTracker, SessionRegistry, TokenVerifier};
use pipeline::PipelineClient;

use crate::coordinator::DeliveryCoordinator;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Live session table
    pub registry: Arc<SessionRegistry>,
    /// Correlation id → originating context
    pub correlations: Arc<CorrelationTracker>,
    /// Computed content cache
    pub cache: Arc<ContentCache>,
    /// Automation pipeline client (HTTP in production, mock in tests)
    pub pipeline: Arc<dyn PipelineClient>,
    /// Handoff token verifier
    pub verifier: Arc<TokenVerifier>,
    /// Delivery orchestration over the components above
    pub coordinator: DeliveryCoordinator,
    /// Bearer token protecting the admin surface
    pub admin_token: String,
    /// Per-client-IP limiter for the callback surface
    pub callback_limiter: SharedRateLimiter,
}

impl AppState {
    pub fn new(
        pipeline_client: Arc<dyn PipelineClient>,
        verifier: Arc<TokenVerifier>,
        admin_token: impl Into<String>,
        cache_config: CacheConfig,
        correlation_ttl: Duration,
    ) -> Self {
        Self::with_rate_limit(
            pipeline_client,
            verifier,
            admin_token,
            cache_config,
            correlation_ttl,
            RateLimitConfig::default(),
        )
    }

    /// Create with custom rate limit config.
    pub fn with_rate_limit(
        pipeline_client: Arc<dyn PipelineClient>,
        verifier: Arc<TokenVerifier>,
        admin_token: impl Into<String>,
        cache_config: CacheConfig,
        correlation_ttl: Duration,
        rate_config: RateLimitConfig,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let correlations = Arc::new(CorrelationTracker::new(correlation_ttl));
        let cache = Arc::new(ContentCache::new(cache_config));
        let coordinator = DeliveryCoordinator::new(
            registry.clone(),
            correlations.clone(),
            cache.clone(),
            pipeline_client.clone(),
        );

        Self {
            registry,
            correlations,
            cache,
            pipeline: pipeline_client,
            verifier,
            coordinator,
            admin_token: admin_token.into(),
            callback_limiter: Arc::new(RateLimiter::new(rate_config)),
        }
    }

    /// Start the rate limiter cleanup background task.
    /// Returns a handle that can be used to cancel the task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let limiter = self.callback_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup(Duration::from_secs(600));
            }
        })
    }
}

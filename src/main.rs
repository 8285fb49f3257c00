//! Quenty Webchannel Gateway
//!
//! Real-time correlation and delivery layer for the conversational news
//! digest:
//! - Handoff token verification during session establishment
//! - Live session registry with heartbeat liveness
//! - Correlation tracking for asynchronous pipeline replies
//! - TTL content cache with in-flight deduplication
//! - Administrative cache invalidation and session enumeration

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use gateway_core::{CacheConfig, TokenVerifier};
use pipeline::{HttpPipelineClient, PipelineConfig};
use telemetry::{health, init_tracing_from_env};
use worker::{WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Shared secret for handoff token verification. Must be configured;
    /// the gateway refuses to start without it.
    #[serde(default)]
    webchannel_secret: String,

    /// Bearer token protecting the admin surface.
    #[serde(default = "default_admin_token")]
    admin_token: String,

    #[serde(default = "default_correlation_ttl_secs")]
    correlation_ttl_secs: u64,

    #[serde(default = "default_session_timeout_secs")]
    session_timeout_secs: u64,

    #[serde(default)]
    cache: CacheTtls,

    #[serde(default)]
    pipeline: PipelineConfig,
}

/// Kind-specific cache freshness windows, in seconds.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct CacheTtls {
    #[serde(default = "default_trends_ttl_secs")]
    trends_ttl_secs: u64,
    #[serde(default = "default_topics_ttl_secs")]
    topics_ttl_secs: u64,
    #[serde(default = "default_summary_ttl_secs")]
    summary_ttl_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_admin_token() -> String {
    "dev-admin-token".to_string()
}

fn default_correlation_ttl_secs() -> u64 {
    600
}

fn default_session_timeout_secs() -> u64 {
    300
}

fn default_trends_ttl_secs() -> u64 {
    300
}

fn default_topics_ttl_secs() -> u64 {
    600
}

fn default_summary_ttl_secs() -> u64 {
    900
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            trends_ttl_secs: default_trends_ttl_secs(),
            topics_ttl_secs: default_topics_ttl_secs(),
            summary_ttl_secs: default_summary_ttl_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webchannel_secret: String::new(),
            admin_token: default_admin_token(),
            correlation_ttl_secs: default_correlation_ttl_secs(),
            session_timeout_secs: default_session_timeout_secs(),
            cache: CacheTtls::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            trends_ttl: Duration::from_secs(self.cache.trends_ttl_secs),
            topics_ttl: Duration::from_secs(self.cache.topics_ttl_secs),
            summary_ttl: Duration::from_secs(self.cache.summary_ttl_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!(
        "Starting Quenty Webchannel Gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = load_config()?;

    // An absent signing secret must fail loudly here, not silently accept
    // forged tokens later.
    let verifier = Arc::new(
        TokenVerifier::new(config.webchannel_secret.as_bytes().to_vec())
            .context("GATEWAY_WEBCHANNEL_SECRET must be configured")?,
    );

    // Pipeline client
    let pipeline_client = Arc::new(
        HttpPipelineClient::new(config.pipeline.clone())
            .context("Failed to create pipeline client")?,
    );

    // Check pipeline reachability and record it
    if pipeline::health::check_connection(&config.pipeline).await {
        health().pipeline.set_healthy();
        info!("Pipeline connection: healthy");
    } else {
        health().pipeline.set_unhealthy("Connection failed");
        error!("Pipeline connection: unhealthy");
    }

    // Create application state
    let state = AppState::new(
        pipeline_client,
        verifier,
        &config.admin_token,
        config.cache_config(),
        Duration::from_secs(config.correlation_ttl_secs),
    );

    // Start background workers over the same shared state
    let worker_config = WorkerConfig {
        session_timeout: Duration::from_secs(config.session_timeout_secs),
        ..WorkerConfig::default()
    };
    let scheduler = Arc::new(WorkerScheduler::new(
        worker_config,
        state.registry.clone(),
        state.correlations.clone(),
        state.cache.clone(),
    ));
    let _worker_handles = scheduler.start();

    // Start rate limiter cleanup background task
    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();

    // Create router
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("GATEWAY")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for flat environment variable names; the config
    // crate's nested parsing doesn't work reliably with underscored fields.
    if let Ok(secret) = std::env::var("GATEWAY_WEBCHANNEL_SECRET") {
        config.webchannel_secret = secret;
    }
    if let Ok(token) = std::env::var("GATEWAY_ADMIN_TOKEN") {
        config.admin_token = token;
    }
    if let Ok(url) = std::env::var("GATEWAY_PIPELINE_WEBHOOK_URL") {
        config.pipeline.webhook_url = url;
    }
    if let Ok(url) = std::env::var("GATEWAY_PIPELINE_COMPUTE_URL") {
        config.pipeline.compute_url = url;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}

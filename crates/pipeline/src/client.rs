//! HTTP client for the external automation pipeline.
//!
//! The pipeline is reached two ways: asynchronous webhook dispatches whose
//! replies come back later on the gateway's callback route, and synchronous
//! content computation for the digest cache. Both sit behind the
//! [`PipelineClient`] trait so tests can capture traffic without a network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use gateway_core::error::{Error, PipelineErrorCode, Result};
use gateway_core::ContentKind;

use crate::config::PipelineConfig;

/// One asynchronous request forwarded to the pipeline.
///
/// Carries the correlation identifier the eventual callback must echo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub correlation_id: String,
    pub session_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Seam to the automation pipeline.
#[async_trait]
pub trait PipelineClient: Send + Sync {
    /// Forwards a request to the pipeline webhook. Fire-and-forget: the
    /// reply arrives asynchronously on the callback route.
    async fn dispatch(&self, request: DispatchRequest) -> Result<()>;

    /// Computes digest content synchronously.
    async fn compute(&self, kind: ContentKind, tag: &str) -> Result<serde_json::Value>;

    fn is_healthy(&self) -> bool;
}

/// Production client speaking HTTP to the pipeline.
pub struct HttpPipelineClient {
    config: PipelineConfig,
    http_client: reqwest::Client,
    healthy: AtomicBool,
}

impl HttpPipelineClient {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            healthy: AtomicBool::new(true),
        })
    }

    fn record_outcome<T>(&self, result: &Result<T>) {
        self.healthy.store(result.is_ok(), Ordering::Relaxed);
    }
}

#[async_trait]
impl PipelineClient for HttpPipelineClient {
    async fn dispatch(&self, request: DispatchRequest) -> Result<()> {
        debug!(
            correlation_id = %request.correlation_id,
            session_id = %request.session_id,
            "Dispatching to pipeline webhook"
        );

        let result = async {
            let response = self
                .http_client
                .post(&self.config.webhook_url)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, "Pipeline webhook request failed");
                    Error::pipeline(
                        PipelineErrorCode::Unavailable,
                        format!("pipeline unreachable: {e}"),
                    )
                })?;

            if !response.status().is_success() {
                let status = response.status();
                warn!(status = %status, "Pipeline webhook returned error");
                return Err(Error::pipeline(
                    PipelineErrorCode::Unavailable,
                    format!("pipeline returned {status}"),
                ));
            }
            Ok(())
        }
        .await;

        self.record_outcome(&result);
        result
    }

    async fn compute(&self, kind: ContentKind, tag: &str) -> Result<serde_json::Value> {
        debug!(kind = kind.as_str(), tag = tag, "Requesting content computation");

        let result = async {
            let response = self
                .http_client
                .post(&self.config.compute_url)
                .json(&serde_json::json!({ "kind": kind.as_str(), "tag": tag }))
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, "Pipeline compute request failed");
                    Error::pipeline(
                        PipelineErrorCode::Unavailable,
                        format!("pipeline unreachable: {e}"),
                    )
                })?;

            if !response.status().is_success() {
                let status = response.status();
                warn!(status = %status, "Pipeline compute returned error");
                return Err(Error::pipeline(
                    PipelineErrorCode::Unavailable,
                    format!("pipeline returned {status}"),
                ));
            }

            response.json().await.map_err(|e| {
                warn!(error = %e, "Failed to parse pipeline response");
                Error::pipeline(
                    PipelineErrorCode::Unavailable,
                    format!("invalid pipeline response: {e}"),
                )
            })
        }
        .await;

        self.record_outcome(&result);
        result
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}

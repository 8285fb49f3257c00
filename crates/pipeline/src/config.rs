//! Automation pipeline connection configuration.

use serde::{Deserialize, Serialize};

/// Where and how to reach the external automation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Webhook endpoint for asynchronous dispatches; replies arrive later
    /// on the gateway's callback route.
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
    /// Request/response endpoint for content computation.
    #[serde(default = "default_compute_url")]
    pub compute_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_webhook_url() -> String {
    "http://automation:5678/webhook/chat".to_string()
}

fn default_compute_url() -> String {
    "http://automation:5678/webhook/content".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            webhook_url: default_webhook_url(),
            compute_url: default_compute_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

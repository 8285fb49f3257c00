//! Pipeline reachability check used at startup.

use std::time::Duration;

use tracing::debug;

use crate::config::PipelineConfig;

/// Probes the pipeline's compute endpoint. Any HTTP response counts as
/// reachable; only transport failures count against it.
pub async fn check_connection(config: &PipelineConfig) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client.get(&config.compute_url).send().await {
        Ok(response) => {
            debug!(status = %response.status(), "Pipeline probe answered");
            true
        }
        Err(e) => {
            debug!(error = %e, "Pipeline probe failed");
            false
        }
    }
}

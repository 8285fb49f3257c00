//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use gateway_core::error::{Error, PipelineErrorCode, Result};
use gateway_core::ContentKind;
use pipeline::{DispatchRequest, PipelineClient};

/// Mock pipeline that captures dispatches in memory.
///
/// Implements the same `PipelineClient` trait as the HTTP client, so tests
/// drive the real router and coordinator without a network.
#[derive(Clone)]
pub struct MockPipeline {
    /// All requests dispatched through this client.
    dispatches: Arc<Mutex<Vec<DispatchRequest>>>,
    /// Payload returned by `compute`.
    compute_result: Arc<Mutex<serde_json::Value>>,
    /// Number of `compute` invocations.
    compute_calls: Arc<Mutex<usize>>,
    /// Simulate failures if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MockPipeline {
    pub fn new() -> Self {
        Self {
            dispatches: Arc::new(Mutex::new(Vec::new())),
            compute_result: Arc::new(Mutex::new(serde_json::json!({"items": []}))),
            compute_calls: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Get all captured dispatch requests.
    pub fn captured_dispatches(&self) -> Vec<DispatchRequest> {
        self.dispatches.lock().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches.lock().len()
    }

    pub fn compute_call_count(&self) -> usize {
        *self.compute_calls.lock()
    }

    /// Set the payload `compute` returns.
    pub fn set_compute_result(&self, value: serde_json::Value) {
        *self.compute_result.lock() = value;
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    pub fn clear(&self) {
        self.dispatches.lock().clear();
        *self.compute_calls.lock() = 0;
    }
}

impl Default for MockPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineClient for MockPipeline {
    async fn dispatch(&self, request: DispatchRequest) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(Error::pipeline(
                PipelineErrorCode::Unavailable,
                "mock pipeline failure",
            ));
        }
        self.dispatches.lock().push(request);
        Ok(())
    }

    async fn compute(&self, kind: ContentKind, _tag: &str) -> Result<serde_json::Value> {
        *self.compute_calls.lock() += 1;
        if *self.should_fail.lock() {
            return Err(Error::pipeline(
                PipelineErrorCode::Unavailable,
                "mock pipeline failure",
            ));
        }
        let mut payload = self.compute_result.lock().clone();
        if let Some(object) = payload.as_object_mut() {
            object.insert("kind".to_string(), serde_json::json!(kind.as_str()));
        }
        Ok(payload)
    }

    fn is_healthy(&self) -> bool {
        !*self.should_fail.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_captures_dispatches() {
        let mock = MockPipeline::new();
        mock.dispatch(DispatchRequest {
            correlation_id: "corr_1".into(),
            session_id: "sess_A".into(),
            user_id: "user-1".into(),
            user_email: None,
            content: "hello".into(),
            metadata: None,
        })
        .await
        .unwrap();

        assert_eq!(mock.dispatch_count(), 1);
        assert_eq!(mock.captured_dispatches()[0].correlation_id, "corr_1");
    }

    #[tokio::test]
    async fn mock_failure_mode() {
        let mock = MockPipeline::new();
        mock.set_should_fail(true);

        assert!(mock
            .compute(ContentKind::Trends, "global")
            .await
            .is_err());
        assert!(!mock.is_healthy());
    }
}

//! Common test setup functions.

use std::sync::Arc;
use std::time::Duration;

use api::{router, AppState};
use axum::Router;
use gateway_core::{
    CacheConfig, OutboundFrame, Session, TokenVerifier,
};
use pipeline::PipelineClient;
use tokio::sync::mpsc;

use crate::fixtures::{TEST_ADMIN_TOKEN, TEST_SECRET};
use crate::mocks::MockPipeline;

/// Test context driving the production code paths:
/// - the real axum router with all middleware
/// - MockPipeline behind the same `PipelineClient` trait as production
/// - real registry, tracker, and cache state
pub struct TestContext {
    pub state: AppState,
    pub mock_pipeline: Arc<MockPipeline>,
    pub router: Router,
}

impl TestContext {
    /// Create a new test context with all components initialized.
    pub fn new() -> Self {
        let mock_pipeline = Arc::new(MockPipeline::new());
        let verifier =
            Arc::new(TokenVerifier::new(TEST_SECRET).expect("test secret is non-empty"));

        let state = AppState::new(
            mock_pipeline.clone() as Arc<dyn PipelineClient>,
            verifier,
            TEST_ADMIN_TOKEN,
            CacheConfig::default(),
            Duration::from_secs(600),
        );
        let router = router(state.clone());

        Self {
            state,
            mock_pipeline,
            router,
        }
    }

    /// Registers a live session directly in the registry, returning its
    /// identifier and the receiving end of its connection handle. This is
    /// what the WebSocket upgrade does after token verification.
    pub fn register_session(
        &self,
        user_id: &str,
    ) -> (String, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(user_id, format!("{user_id}@example.com"), tx);
        let session_id = session.id.clone();
        self.state.registry.register(session);
        (session_id, rx)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

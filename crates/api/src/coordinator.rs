//! Delivery coordination.
//!
//! Orchestrates the session registry, correlation tracker, cache, and
//! pipeline client: outbound requests are tracked and forwarded; inbound
//! callbacks are resolved and pushed to the live connection that asked.
//! Conceptually each correlation ends in exactly one terminal state —
//! delivered, session gone, or expired unresolved — and this layer never
//! retries (retry policy belongs to the pipeline).

use std::sync::Arc;

use telemetry::metrics;
use tracing::{debug, info, warn};
use uuid::Uuid;

use gateway_core::{
    ClientFrame, ContentCache, ContentKind, CorrelationTracker, OutboundFrame, PipelineCallback,
    Result, SessionRegistry, DEFAULT_CONTENT_TAG,
};
use pipeline::{DispatchRequest, PipelineClient};

/// Terminal outcome of one pipeline callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Pushed to the originating connection.
    Delivered,
    /// Correlation resolved but the connection dropped in the interim.
    SessionGone,
    /// Correlation expired, unknown, or absent.
    Unresolved,
}

impl CallbackOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::SessionGone => "session_gone",
            Self::Unresolved => "unresolved",
        }
    }
}

/// Orchestration over the gateway's shared state. Cheap to clone.
#[derive(Clone)]
pub struct DeliveryCoordinator {
    registry: Arc<SessionRegistry>,
    correlations: Arc<CorrelationTracker>,
    cache: Arc<ContentCache>,
    pipeline: Arc<dyn PipelineClient>,
}

impl DeliveryCoordinator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        correlations: Arc<CorrelationTracker>,
        cache: Arc<ContentCache>,
        pipeline: Arc<dyn PipelineClient>,
    ) -> Self {
        Self {
            registry,
            correlations,
            cache,
            pipeline,
        }
    }

    /// Handles one `message` frame from a connected client.
    ///
    /// A frame asking for a cached content kind is answered from the cache
    /// when fresh; everything else is dispatched to the pipeline under a
    /// correlation entry, to be answered by a later callback.
    pub async fn handle_client_message(
        &self,
        session_id: &str,
        user_id: &str,
        user_email: &str,
        frame: ClientFrame,
    ) -> Result<()> {
        if let Some(kind) = frame
            .content
            .as_deref()
            .and_then(|content| content.parse::<ContentKind>().ok())
        {
            let tag = content_tag(&frame);
            if let Some(found) = self.cache.get(kind, tag) {
                debug!(session_id, kind = kind.as_str(), tag, "Serving content from cache");
                let mut out = OutboundFrame::new("content", found.payload);
                if let Some(correlation_id) = &frame.correlation_id {
                    out = out.with_correlation(correlation_id.clone());
                }
                self.registry.send(session_id, out);
                return Ok(());
            }
        }

        self.dispatch(session_id, user_id, user_email, frame).await?;
        Ok(())
    }

    /// Records a correlation entry and forwards the request to the
    /// pipeline. Returns the correlation identifier the callback will echo.
    pub async fn dispatch(
        &self,
        session_id: &str,
        user_id: &str,
        user_email: &str,
        frame: ClientFrame,
    ) -> Result<String> {
        let correlation_id = frame
            .correlation_id
            .clone()
            .unwrap_or_else(|| format!("corr_{}", Uuid::new_v4().simple()));

        self.correlations.track(
            correlation_id.clone(),
            session_id,
            user_id,
            Some(user_email.to_string()),
        );
        metrics()
            .correlation_entries
            .set(self.correlations.len() as u64);

        let request = DispatchRequest {
            correlation_id: correlation_id.clone(),
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            user_email: Some(user_email.to_string()),
            content: frame.content.unwrap_or_default(),
            metadata: frame.metadata,
        };

        metrics().dispatches.inc();
        if let Err(e) = self.pipeline.dispatch(request).await {
            metrics().dispatch_failures.inc();
            return Err(e);
        }

        debug!(correlation_id = %correlation_id, session_id, "Request dispatched");
        Ok(correlation_id)
    }

    /// Routes one asynchronous pipeline callback.
    ///
    /// Every outcome here is terminal and non-fatal: an unroutable callback
    /// is logged and dropped, never retried and never an error to the
    /// pipeline.
    pub async fn handle_callback(&self, callback: PipelineCallback) -> CallbackOutcome {
        metrics().callbacks_received.inc();

        let target = match self.correlations.resolve(callback.correlation_id.as_deref()) {
            Some(entry) => Some(entry.session_id),
            // A callback with no correlation id may still address a known
            // session directly; one with an unresolvable id may not — stale
            // data never resurrects a route.
            None => match &callback.correlation_id {
                Some(correlation_id) => {
                    info!(
                        correlation_id = %correlation_id,
                        event = %callback.event,
                        "Dropping callback: correlation expired or unknown"
                    );
                    None
                }
                None => callback.session_id.clone(),
            },
        };
        metrics()
            .correlation_entries
            .set(self.correlations.len() as u64);

        let Some(session_id) = target else {
            metrics().callbacks_dropped_unresolved.inc();
            return CallbackOutcome::Unresolved;
        };

        let mut frame = OutboundFrame::new(callback.event.clone(), callback.message.clone());
        if let Some(correlation_id) = &callback.correlation_id {
            frame = frame.with_correlation(correlation_id.clone());
        }

        if !self.registry.send(&session_id, frame) {
            warn!(
                session_id = %session_id,
                event = %callback.event,
                "Dropping callback: session is gone"
            );
            metrics().callbacks_dropped_session_gone.inc();
            return CallbackOutcome::SessionGone;
        }

        // Content events short-circuit the next request for the same kind.
        if let Ok(kind) = callback.event.parse::<ContentKind>() {
            self.cache
                .set(kind, DEFAULT_CONTENT_TAG, callback.message.clone());
        }

        metrics().callbacks_delivered.inc();
        debug!(session_id = %session_id, event = %callback.event, "Callback delivered");
        CallbackOutcome::Delivered
    }

    /// Serves digest content through the cache, computing at most once per
    /// key across all concurrent requesters.
    pub async fn request_content(
        &self,
        kind: ContentKind,
        tag: &str,
    ) -> Result<serde_json::Value> {
        let pipeline = self.pipeline.clone();
        let owned_tag = tag.to_string();
        self.cache
            .get_or_compute(kind, tag, async move {
                pipeline.compute(kind, &owned_tag).await
            })
            .await
    }
}

fn content_tag(frame: &ClientFrame) -> &str {
    frame
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.get("tag"))
        .and_then(|tag| tag.as_str())
        .unwrap_or(DEFAULT_CONTENT_TAG)
}

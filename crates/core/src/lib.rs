//! Core types and state for the webchannel gateway.

pub mod cache;
pub mod correlation;
pub mod error;
pub mod message;
pub mod session;
pub mod token;

pub use cache::{
    CacheConfig, CacheStats, CachedContent, ContentCache, ContentKind, DEFAULT_CONTENT_TAG,
};
pub use correlation::{CorrelationEntry, CorrelationTracker, DEFAULT_CORRELATION_TTL};
pub use error::{Error, Result};
pub use message::{ClientFrame, FrameKind, OutboundFrame, PipelineCallback};
pub use session::{
    ConnectionHandle, Session, SessionRegistry, SessionSummary, SESSION_LIVENESS_TIMEOUT,
};
pub use token::{TokenPayload, TokenVerifier, TOKEN_AUDIENCE, TOKEN_ISSUER};

//! Wire types for the duplex connection and the pipeline callback.

use serde::{Deserialize, Serialize};

/// Message kinds a client may send over the duplex connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Message,
    TypingStart,
    TypingStop,
    ReadReceipt,
    Ping,
    Pong,
}

impl FrameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::TypingStart => "typing_start",
            Self::TypingStop => "typing_stop",
            Self::ReadReceipt => "read_receipt",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }
}

/// One inbound frame from a connected client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    pub kind: FrameKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// One outbound frame pushed to a connected client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundFrame {
    /// Event name (`pong`, `message`, `content`, ...).
    pub event: String,
    /// Opaque payload; schema belongs to the producer.
    #[serde(default)]
    pub message: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl OutboundFrame {
    pub fn new(event: impl Into<String>, message: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            message,
            correlation_id: None,
        }
    }

    pub fn with_correlation(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Heartbeat reply.
    pub fn pong() -> Self {
        Self::new("pong", serde_json::Value::Null)
    }
}

/// Asynchronous callback payload from the automation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineCallback {
    /// Event name to forward to the client.
    pub event: String,
    /// Message content; opaque to the gateway.
    #[serde(default)]
    pub message: serde_json::Value,
    /// Direct session address, used when no correlation entry exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

//! Unified error types for the webchannel gateway.
//!
//! Error codes:
//! - AUTH_001-003: Admin credential errors
//! - TOKEN_001: Handoff token rejected
//! - VALID_001-002: Validation errors
//! - PIPE_001: Pipeline dispatch errors
//! - RATE_001: Rate limit errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Admin credential error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// AUTH_001: Bearer token is required
    MissingCredential,
    /// AUTH_002: Malformed Authorization header
    MalformedCredential,
    /// AUTH_003: Bearer token does not match
    InvalidCredential,
}

impl AuthErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "AUTH_001",
            Self::MalformedCredential => "AUTH_002",
            Self::InvalidCredential => "AUTH_003",
        }
    }

    pub fn http_status(&self) -> u16 {
        401
    }
}

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Invalid JSON / invalid format
    InvalidFormat,
    /// VALID_002: Invalidation request named neither keys nor prefix
    EmptyInvalidation,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "VALID_001",
            Self::EmptyInvalidation => "VALID_002",
        }
    }

    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Pipeline error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorCode {
    /// PIPE_001: Automation pipeline unreachable or returned an error
    Unavailable,
}

impl PipelineErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "PIPE_001",
        }
    }

    pub fn http_status(&self) -> u16 {
        502
    }
}

/// Rate limit error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitErrorCode {
    /// RATE_001: Rate limit exceeded
    Exceeded,
}

impl RateLimitErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Exceeded => "RATE_001",
        }
    }

    pub fn http_status(&self) -> u16 {
        429
    }
}

/// Unified error type for the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// Admin credential error with code.
    #[error("[{code}] {message}")]
    Auth {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Handoff token rejected (TOKEN_001). Carries no detail: the caller
    /// only learns that verification failed.
    #[error("[TOKEN_001] handoff token rejected")]
    TokenRejected,

    /// Validation error with code.
    #[error("[{code}] {message}")]
    ValidationWithCode {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Pipeline error with code.
    #[error("[{code}] {message}")]
    Pipeline {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Rate limit error with code.
    #[error("[{code}] {message}")]
    RateLimit {
        code: &'static str,
        message: String,
        http_status: u16,
        retry_after: Option<u64>,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("unknown content kind: {0}")]
    UnknownContentKind(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an admin credential error.
    pub fn auth(code: AuthErrorCode, msg: impl Into<String>) -> Self {
        Self::Auth {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a validation error with code.
    pub fn validation_code(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::ValidationWithCode {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a pipeline error.
    pub fn pipeline(code: PipelineErrorCode, msg: impl Into<String>) -> Self {
        Self::Pipeline {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit(
        code: RateLimitErrorCode,
        msg: impl Into<String>,
        retry_after: Option<u64>,
    ) -> Self {
        Self::RateLimit {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
            retry_after,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown_session(id: impl Into<String>) -> Self {
        Self::UnknownSession(id.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Auth { http_status, .. } => *http_status,
            Self::TokenRejected => 401,
            Self::ValidationWithCode { http_status, .. } => *http_status,
            Self::Pipeline { http_status, .. } => *http_status,
            Self::RateLimit { http_status, .. } => *http_status,
            Self::Validation(_) => 400,
            Self::Serialization(_) => 400,
            Self::UnknownSession(_) => 404,
            Self::UnknownContentKind(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Auth { code, .. } => Some(code),
            Self::TokenRejected => Some("TOKEN_001"),
            Self::ValidationWithCode { code, .. } => Some(code),
            Self::Pipeline { code, .. } => Some(code),
            Self::RateLimit { code, .. } => Some(code),
            _ => None,
        }
    }
}

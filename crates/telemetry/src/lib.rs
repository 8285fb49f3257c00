//! Internal telemetry for the webchannel gateway.
//!
//! Structured logging via tracing plus in-process atomic metrics; no
//! external metrics system.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;

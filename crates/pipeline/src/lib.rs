//! Client crate for the external automation pipeline.

pub mod client;
pub mod config;
pub mod health;

pub use client::{DispatchRequest, HttpPipelineClient, PipelineClient};
pub use config::PipelineConfig;

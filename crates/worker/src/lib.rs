//! Background workers for the webchannel gateway.

pub mod reaper;
pub mod scheduler;
pub mod sweep;

pub use reaper::SessionReaper;
pub use scheduler::{WorkerConfig, WorkerScheduler};
pub use sweep::HygieneSweep;

//! HTTP and WebSocket API layer for the webchannel gateway.

pub mod coordinator;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use coordinator::{CallbackOutcome, DeliveryCoordinator};
pub use routes::router;
pub use state::AppState;

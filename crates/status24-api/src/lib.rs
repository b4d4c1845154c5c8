//! Status24 API Library
//!
//! This crate provides the HTTP API handlers, authentication, and application setup.

// Module declarations
mod api_doc;
mod handlers;
pub mod setup;
mod telemetry;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use handlers::status::{NOT_FOUND_EVENT, STATUS_EVENT};
pub use state::AppState;
pub use telemetry::init_telemetry;

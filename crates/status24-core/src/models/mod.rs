//! Data models for the application
//!
//! Stored document shapes (organization document, services, incidents and their
//! update log), identity-provider shapes, and API request/response bodies.

mod identity;
mod incident;
mod organization;
mod requests;
mod service;

pub use identity::*;
pub use incident::*;
pub use organization::*;
pub use requests::*;
pub use service::*;

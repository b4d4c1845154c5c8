//! Status24 Core Library
//!
//! This crate provides the domain models, the read model projection, the
//! authorization gate, error types and configuration shared by every Status24
//! component.

pub mod config;
pub mod error;
pub mod gate;
pub mod ids;
pub mod models;
pub mod projection;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, IdentityBackend, TokenVerification};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use gate::{PublicLookup, Resolution, Route, Session, SessionContext, SessionState, View};
pub use projection::{project_incidents, project_services, project_status_page, StatusPage};

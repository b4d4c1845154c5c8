//! Identity provider seam.
//!
//! Users, organizations and memberships live in an external identity provider.
//! [`ClerkIdentityProvider`] talks to its REST API; [`MemoryIdentityProvider`]
//! keeps everything in process for development and tests.

mod clerk;
mod memory;

pub use clerk::ClerkIdentityProvider;
pub use memory::MemoryIdentityProvider;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use status24_core::models::{Organization, OrganizationMembership};
use status24_core::{AppError, Config, IdentityBackend};

/// Errors returned by identity providers.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success answer; `body` is the provider's raw response text.
    #[error("identity provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected identity provider response: {0}")]
    Decode(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl IdentityError {
    /// Provider status code, or 502 when the provider was never reached.
    pub fn status(&self) -> u16 {
        match self {
            IdentityError::Status { status, .. } => *status,
            IdentityError::NotFound(_) => 404,
            IdentityError::Transport(_) | IdentityError::Decode(_) => 502,
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            IdentityError::Status { status, body } => AppError::IdentityProvider {
                status,
                message: body,
            },
            other => AppError::IdentityProvider {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

/// A user to create in the identity provider.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewUser {
    #[serde(rename = "email_address")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub public_metadata: serde_json::Value,
}

/// Operations the API needs from the identity provider.
///
/// Creation calls return the provider's JSON untouched; the admin endpoints
/// pass it through to their callers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Organization memberships of a user, in provider order.
    async fn memberships(&self, user_id: &str) -> Result<Vec<OrganizationMembership>, IdentityError>;

    /// An organization by id; `None` when the provider does not know it.
    async fn organization(&self, org_id: &str) -> Result<Option<Organization>, IdentityError>;

    async fn list_organizations(&self) -> Result<Vec<Organization>, IdentityError>;

    async fn create_user(&self, user: &NewUser) -> Result<serde_json::Value, IdentityError>;

    async fn create_organization(&self, name: &str) -> Result<serde_json::Value, IdentityError>;

    async fn add_member(
        &self,
        org_id: &str,
        email: &str,
        full_name: &str,
    ) -> Result<serde_json::Value, IdentityError>;
}

/// Builds the provider selected by configuration.
pub fn build_identity_provider(config: &Config) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    match &config.identity {
        IdentityBackend::Clerk { api_url, api_key } => {
            let provider = ClerkIdentityProvider::new(
                api_url.clone(),
                api_key.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?;
            tracing::info!(api_url = %api_url, "Using Clerk identity provider");
            Ok(Arc::new(provider))
        }
        IdentityBackend::Memory => {
            tracing::warn!("Using in-memory identity provider; data is lost on restart");
            Ok(Arc::new(MemoryIdentityProvider::new()))
        }
    }
}

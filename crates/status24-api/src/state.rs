//! Application state shared by all handlers.

use std::sync::Arc;

use status24_core::models::OrganizationDetails;
use status24_core::Config;
use status24_db::OrganizationRepository;
use status24_services::IdentityProvider;

use crate::auth::AuthState;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub organizations: OrganizationRepository,
    pub identity: Arc<dyn IdentityProvider>,
    pub auth: Arc<AuthState>,
}

impl AppState {
    /// Name and image of an organization for display.
    ///
    /// Public pages still render when the identity provider does not know the
    /// organization or cannot be reached; the details are then empty.
    pub async fn organization_details(&self, org_id: &str) -> OrganizationDetails {
        match self.identity.organization(org_id).await {
            Ok(Some(org)) => org.into(),
            Ok(None) => OrganizationDetails::default(),
            Err(e) => {
                tracing::warn!(organization_id = %org_id, error = %e, "Failed to load organization details");
                OrganizationDetails::default()
            }
        }
    }
}

use status24_core::AppError;

/// Errors raised by document stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("organization document not found: {0}")]
    DocumentNotFound(String),

    #[error("service {service_id} not found in organization {org_id}")]
    ServiceNotFound { org_id: String, service_id: String },

    #[error("incident {incident_id} not found in organization {org_id}")]
    IncidentNotFound { org_id: String, incident_id: String },

    #[error("subscription to {0} closed")]
    SubscriptionClosed(String),

    #[error("invalid seed data: {0}")]
    Seed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DocumentNotFound(_) => {
                AppError::OrganizationNotFound("Organization not found".to_string())
            }
            StoreError::ServiceNotFound { .. } => AppError::NotFound("Service not found".to_string()),
            StoreError::IncidentNotFound { .. } => {
                AppError::NotFound("Incident not found".to_string())
            }
            other => AppError::Store(other.to_string()),
        }
    }
}

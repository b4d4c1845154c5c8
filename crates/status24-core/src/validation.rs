//! Request validation shared by the server and the client.
//!
//! The client runs the same checks before sending anything, so a draft that
//! fails here never reaches the network.

use validator::Validate;

use crate::error::AppError;
use crate::models::{
    AddUserToOrgRequest, CreateOrgRequest, CreateUserRequest, IncidentCreate,
    IncidentUpdateRequest, ServiceCreate, ServiceDelete, ServiceUpdate,
};

/// Message shown when a draft is missing required input.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";

/// Message of the add-service and add-incident forms.
pub const MISSING_REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// Full validation of an API request body.
pub trait ValidateRequest {
    fn validate_request(&self) -> Result<(), AppError>;
}

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

impl ValidateRequest for ServiceCreate {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate()?;
        require_text("name", &self.name)?;
        require_text("type", self.service_type.as_str())
    }
}

impl ValidateRequest for ServiceUpdate {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate()?;
        Ok(())
    }
}

impl ValidateRequest for ServiceDelete {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate()?;
        Ok(())
    }
}

impl ValidateRequest for IncidentCreate {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate()?;
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        if self.affected_services.iter().any(|id| id.trim().is_empty()) {
            return Err(AppError::InvalidInput(
                "affectedServices cannot contain empty ids".to_string(),
            ));
        }
        Ok(())
    }
}

impl ValidateRequest for IncidentUpdateRequest {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate()?;
        require_text("message", &self.message)
    }
}

impl ValidateRequest for CreateUserRequest {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate()?;
        require_text("name", &self.name)
    }
}

impl ValidateRequest for CreateOrgRequest {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate()?;
        require_text("orgName", &self.org_name)
    }
}

impl ValidateRequest for AddUserToOrgRequest {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate()?;
        require_text("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncidentStatus, ServiceStatus, ServiceType};

    fn incident_update(message: &str) -> IncidentUpdateRequest {
        IncidentUpdateRequest {
            incident_id: "inc_1".to_string(),
            organization_id: "org_1".to_string(),
            status: IncidentStatus::Resolved,
            message: message.to_string(),
        }
    }

    #[test]
    fn incident_update_requires_message() {
        assert!(incident_update("Fixed the root cause").validate_request().is_ok());
        assert!(incident_update("").validate_request().is_err());
        assert!(incident_update("   ").validate_request().is_err());
    }

    #[test]
    fn service_create_requires_name_and_type() {
        let mut draft = ServiceCreate {
            organization_id: "org_1".to_string(),
            name: "Website".to_string(),
            service_type: ServiceType::Website,
            status: ServiceStatus::Operational,
            description: None,
        };
        assert!(draft.validate_request().is_ok());

        draft.service_type = ServiceType::Other(" ".to_string());
        assert!(draft.validate_request().is_err());

        draft.service_type = ServiceType::Api;
        draft.name = String::new();
        assert!(draft.validate_request().is_err());
    }

    #[test]
    fn create_user_requires_valid_email() {
        let request = CreateUserRequest {
            email: "not-an-email".to_string(),
            name: "Ada Lovelace".to_string(),
        };
        let err = request.validate_request().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}

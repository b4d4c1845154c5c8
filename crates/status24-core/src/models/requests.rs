//! Request and response bodies of the Status24 HTTP API.
//!
//! Field names follow the wire contract (`organizationId`, `serviceId`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{IncidentStatus, ServiceStatus, ServiceType};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCreate {
    #[validate(length(min = 1, message = "organizationId is required"))]
    pub organization_id: String,
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "api")]
    pub service_type: ServiceType,
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    #[validate(length(min = 1, message = "serviceId is required"))]
    pub service_id: String,
    #[validate(length(min = 1, message = "organizationId is required"))]
    pub organization_id: String,
    pub status: ServiceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDelete {
    #[validate(length(min = 1, message = "serviceId is required"))]
    pub service_id: String,
    #[validate(length(min = 1, message = "organizationId is required"))]
    pub organization_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentCreate {
    #[validate(length(min = 1, message = "organizationId is required"))]
    pub organization_id: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub status: IncidentStatus,
    pub datetime: DateTime<Utc>,
    #[serde(default)]
    pub affected_services: Vec<String>,
}

/// Status change plus one new entry in the incident's update log.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentUpdateRequest {
    #[validate(length(min = 1, message = "incidentId is required"))]
    pub incident_id: String,
    #[validate(length(min = 1, message = "organizationId is required"))]
    pub organization_id: String,
    pub status: IncidentStatus,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrgRequest {
    #[validate(length(min = 1, max = 100, message = "orgName must be 1-100 characters"))]
    pub org_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddUserToOrgRequest {
    #[validate(length(min = 1, message = "orgId is required"))]
    pub org_id: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

/// Envelope of every successful tenant mutation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct MutationResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> MutationResponse<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        MutationResponse {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentUpdateAck {
    pub message_id: String,
    pub status: IncidentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationsList {
    pub organizations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct OrganizationSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminOrganizationsList {
    pub organizations: Vec<OrganizationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

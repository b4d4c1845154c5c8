//! Domain methods for the Status24 API client.
//!
//! Request and record types come from `status24_core::models`; wrapper
//! response shapes that only the client decodes are defined here.

use crate::{ApiClient, ClientError, Result};
use serde::{Deserialize, Serialize};
use status24_core::models::{
    AddUserToOrgRequest, AdminOrganizationsList, CreateOrgRequest, CreateUserRequest, Incident,
    IncidentCreate, IncidentUpdateAck, IncidentUpdateRequest, MutationResponse, Organization,
    OrganizationDetails, OrganizationSummary, OrganizationsList, Service, ServiceCreate,
    ServiceDelete, ServiceUpdate,
};
use status24_core::StatusPage;

/// `GET /user/org`: the caller's first organization, or a message when there is none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserOrgResponse {
    Organization { organization: Organization },
    NoOrganization { message: String },
}

impl UserOrgResponse {
    pub fn organization(self) -> Option<Organization> {
        match self {
            UserOrgResponse::Organization { organization } => Some(organization),
            UserOrgResponse::NoOrganization { .. } => None,
        }
    }
}

fn missing_data(operation: &str) -> ClientError {
    ClientError::Decode(format!("{} response carried no data", operation))
}

impl ApiClient {
    pub async fn user_org(&self) -> Result<UserOrgResponse> {
        self.get("/user/org", &[]).await
    }

    /// Ids of every organization that has a status document.
    pub async fn organizations_list(&self) -> Result<Vec<String>> {
        let list: OrganizationsList = self.get("/organizations-list", &[]).await?;
        Ok(list.organizations)
    }

    /// Header details of an organization; `None` when the provider does not know it.
    pub async fn org_details(&self, org_id: &str) -> Result<Option<OrganizationDetails>> {
        match self
            .get("/org-details", &[("org_id", org_id.to_string())])
            .await
        {
            Ok(details) => Ok(Some(details)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// One projected snapshot of a public status page; `None` when the organization has no document.
    pub async fn status_page(&self, org_id: &str) -> Result<Option<StatusPage>> {
        match self.get(&format!("/status/{}", org_id), &[]).await {
            Ok(page) => Ok(Some(page)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn add_service(&self, request: &ServiceCreate) -> Result<Service> {
        let response: MutationResponse<Service> =
            self.post_json("/org/add-service", request).await?;
        response.data.ok_or_else(|| missing_data("add-service"))
    }

    pub async fn update_service_status(&self, request: &ServiceUpdate) -> Result<String> {
        let response: MutationResponse<serde_json::Value> =
            self.put_json("/org/update-service", request).await?;
        Ok(response.message)
    }

    pub async fn delete_service(&self, request: &ServiceDelete) -> Result<String> {
        let response: MutationResponse<serde_json::Value> =
            self.delete_json("/org/delete-service", request).await?;
        Ok(response.message)
    }

    pub async fn add_incident(&self, request: &IncidentCreate) -> Result<Incident> {
        let response: MutationResponse<Incident> =
            self.post_json("/org/add-incident", request).await?;
        response.data.ok_or_else(|| missing_data("add-incident"))
    }

    pub async fn update_incident(&self, request: &IncidentUpdateRequest) -> Result<IncidentUpdateAck> {
        let response: MutationResponse<IncidentUpdateAck> =
            self.put_json("/org/update-incident", request).await?;
        response.data.ok_or_else(|| missing_data("update-incident"))
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<serde_json::Value> {
        self.post_json("/admin/create-user", request).await
    }

    pub async fn create_org(&self, request: &CreateOrgRequest) -> Result<serde_json::Value> {
        self.post_json("/admin/create-org", request).await
    }

    pub async fn add_user_to_org(&self, request: &AddUserToOrgRequest) -> Result<serde_json::Value> {
        self.post_json("/admin/add-user-to-org", request).await
    }

    pub async fn admin_organizations(&self) -> Result<Vec<OrganizationSummary>> {
        let list: AdminOrganizationsList = self.get("/admin/organizations", &[]).await?;
        Ok(list.organizations)
    }
}

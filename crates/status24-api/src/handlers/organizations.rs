use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use status24_core::models::{Organization, OrganizationDetails, OrganizationsList};
use status24_core::AppError;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Either the caller's organization or a note that there is none.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UserOrgResponse {
    Organization { organization: Organization },
    NoOrganization { message: String },
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrgDetailsQuery {
    /// Organization ID
    pub org_id: String,
}

#[utoipa::path(
    get,
    path = "/user/org",
    tag = "organizations",
    responses(
        (status = 200, description = "Organization of the caller", body = UserOrgResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Memberships could not be loaded", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(user), fields(user_id = %user.user_id(), operation = "get_user_org"))]
pub async fn get_user_org(user: AuthenticatedUser) -> Result<impl IntoResponse, HttpAppError> {
    let response = match user.identity.primary_organization() {
        Some(org) => UserOrgResponse::Organization {
            organization: org.clone(),
        },
        None => UserOrgResponse::NoOrganization {
            message: "User has no organization.".to_string(),
        },
    };
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/organizations-list",
    tag = "organizations",
    responses(
        (status = 200, description = "Ids of all organizations with a status document", body = OrganizationsList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_organization_ids"))]
pub async fn list_organization_ids(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organizations = state.organizations.list_ids().await?;
    Ok(Json(OrganizationsList { organizations }))
}

#[utoipa::path(
    get,
    path = "/org-details",
    tag = "organizations",
    params(OrgDetailsQuery),
    responses(
        (status = 200, description = "Organization name and image", body = OrganizationDetails),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(organization_id = %query.org_id, operation = "get_org_details"))]
pub async fn get_org_details(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrgDetailsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = state
        .identity
        .organization(&query.org_id)
        .await?
        .ok_or_else(|| AppError::OrganizationNotFound("Organization not found".to_string()))?;

    Ok(Json(OrganizationDetails::from(organization)))
}

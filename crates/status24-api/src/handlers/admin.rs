//! Admin endpoints, proxied to the identity provider.
//!
//! Callers must belong to the admin organization. Provider responses are
//! passed through as-is; provider failures keep their status and are
//! prefixed with the operation that failed.

use crate::auth::AdminContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use status24_core::models::{
    split_full_name, AddUserToOrgRequest, AdminOrganizationsList, CreateOrgRequest,
    CreateUserRequest, OrganizationSummary,
};
use status24_core::validation::ValidateRequest;
use status24_core::AppError;
use status24_services::{IdentityError, NewUser};
use std::sync::Arc;

fn provider_error(context: &str, err: IdentityError) -> AppError {
    match err {
        IdentityError::Status { status, body } => AppError::IdentityProvider {
            status,
            message: format!("{}: {}", context, body),
        },
        other => AppError::from(other),
    }
}

#[utoipa::path(
    post,
    path = "/admin/create-user",
    tag = "admin",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User as returned by the identity provider", body = Object),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 422, description = "Rejected by the identity provider", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, admin, request), fields(user_id = %admin.user_id, operation = "create_user"))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate_request()?;

    let (first_name, last_name) = split_full_name(&request.name);
    let user = NewUser {
        email: request.email.trim().to_string(),
        first_name,
        last_name,
        public_metadata: serde_json::json!({ "organization": state.config.admin_org_name }),
    };

    let created = state
        .identity
        .create_user(&user)
        .await
        .map_err(|e| provider_error("Error creating user", e))?;
    tracing::info!(email = %user.email, "User created");

    Ok(Json(created))
}

#[utoipa::path(
    post,
    path = "/admin/create-org",
    tag = "admin",
    request_body = CreateOrgRequest,
    responses(
        (status = 200, description = "Organization as returned by the identity provider", body = Object),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, admin, request), fields(user_id = %admin.user_id, operation = "create_org"))]
pub async fn create_org(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    ValidatedJson(request): ValidatedJson<CreateOrgRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate_request()?;

    let created = state
        .identity
        .create_organization(request.org_name.trim())
        .await
        .map_err(|e| provider_error("Error creating organization", e))?;

    // The public page of a new organization resolves right away.
    match created.get("id").and_then(|id| id.as_str()) {
        Some(org_id) => {
            state.organizations.ensure_document(org_id).await?;
        }
        None => tracing::warn!("Identity provider returned an organization without id"),
    }

    Ok(Json(created))
}

#[utoipa::path(
    post,
    path = "/admin/add-user-to-org",
    tag = "admin",
    request_body = AddUserToOrgRequest,
    responses(
        (status = 200, description = "Membership as returned by the identity provider", body = Object),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, admin, request),
    fields(user_id = %admin.user_id, organization_id = %request.org_id, operation = "add_user_to_org")
)]
pub async fn add_user_to_org(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    ValidatedJson(request): ValidatedJson<AddUserToOrgRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate_request()?;

    let membership = state
        .identity
        .add_member(&request.org_id, request.email.trim(), request.name.trim())
        .await
        .map_err(|e| provider_error("Error adding user to organization", e))?;

    Ok(Json(membership))
}

#[utoipa::path(
    get,
    path = "/admin/organizations",
    tag = "admin",
    responses(
        (status = 200, description = "All organizations known to the identity provider", body = AdminOrganizationsList),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, admin), fields(user_id = %admin.user_id, operation = "list_organizations"))]
pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let organizations = state
        .identity
        .list_organizations()
        .await
        .map_err(|e| provider_error("Error fetching organizations", e))?
        .into_iter()
        .map(|org| OrganizationSummary {
            id: org.id,
            name: org.name,
        })
        .collect();

    Ok(Json(AdminOrganizationsList { organizations }))
}

use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use status24_core::models::{MutationResponse, Service, ServiceCreate, ServiceDelete, ServiceUpdate};
use status24_core::validation::ValidateRequest;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/org/add-service",
    tag = "services",
    request_body = ServiceCreate,
    responses(
        (status = 200, description = "Service added", body = MutationResponse<Service>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not a member of the organization", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, member, request),
    fields(
        organization_id = %request.organization_id,
        user_id = %member.user_id,
        operation = "add_service"
    )
)]
pub async fn add_service(
    State(state): State<Arc<AppState>>,
    member: MemberContext,
    ValidatedJson(request): ValidatedJson<ServiceCreate>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate_request()?;
    member.authorize(&request.organization_id, "add services to")?;

    let service = state.organizations.add_service(&request).await?;
    tracing::info!(service_id = %service.id, "Service added");

    Ok(Json(MutationResponse::success(
        "Service added successfully",
        Some(service),
    )))
}

#[utoipa::path(
    put,
    path = "/org/update-service",
    tag = "services",
    request_body = ServiceUpdate,
    responses(
        (status = 200, description = "Service status updated; `data` is omitted", body = MutationResponse<Service>),
        (status = 403, description = "Not a member of the organization", body = ErrorResponse),
        (status = 404, description = "Organization or service not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, member, request),
    fields(
        organization_id = %request.organization_id,
        service_id = %request.service_id,
        user_id = %member.user_id,
        operation = "update_service"
    )
)]
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    member: MemberContext,
    ValidatedJson(request): ValidatedJson<ServiceUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate_request()?;
    member.authorize(&request.organization_id, "update services in")?;

    state
        .organizations
        .update_service_status(&request.organization_id, &request.service_id, request.status)
        .await?;

    Ok(Json(MutationResponse::<Service>::success(
        "Service status updated successfully",
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/org/delete-service",
    tag = "services",
    request_body = ServiceDelete,
    responses(
        (status = 200, description = "Service deleted; `data` is omitted", body = MutationResponse<Service>),
        (status = 403, description = "Not a member of the organization", body = ErrorResponse),
        (status = 404, description = "Organization or service not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, member, request),
    fields(
        organization_id = %request.organization_id,
        service_id = %request.service_id,
        user_id = %member.user_id,
        operation = "delete_service"
    )
)]
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    member: MemberContext,
    ValidatedJson(request): ValidatedJson<ServiceDelete>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate_request()?;
    member.authorize(&request.organization_id, "delete services in")?;

    state
        .organizations
        .delete_service(&request.organization_id, &request.service_id)
        .await?;
    tracing::info!("Service deleted");

    Ok(Json(MutationResponse::<Service>::success(
        "Service deleted successfully",
        None,
    )))
}

use crate::auth::MemberContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use status24_core::models::{
    Incident, IncidentCreate, IncidentUpdateAck, IncidentUpdateRequest, MutationResponse,
};
use status24_core::validation::ValidateRequest;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/org/add-incident",
    tag = "incidents",
    request_body = IncidentCreate,
    responses(
        (status = 200, description = "Incident added", body = MutationResponse<Incident>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not a member of the organization", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, member, request),
    fields(
        organization_id = %request.organization_id,
        user_id = %member.user_id,
        affected = request.affected_services.len(),
        operation = "add_incident"
    )
)]
pub async fn add_incident(
    State(state): State<Arc<AppState>>,
    member: MemberContext,
    ValidatedJson(request): ValidatedJson<IncidentCreate>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate_request()?;
    member.authorize(&request.organization_id, "add incidents to")?;

    let incident = state.organizations.add_incident(&request).await?;
    tracing::info!(incident_id = %incident.id, status = %incident.status, "Incident added");

    Ok(Json(MutationResponse::success(
        "Incident added successfully",
        Some(incident),
    )))
}

#[utoipa::path(
    put,
    path = "/org/update-incident",
    tag = "incidents",
    request_body = IncidentUpdateRequest,
    responses(
        (status = 200, description = "Incident updated and one message appended", body = MutationResponse<IncidentUpdateAck>),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 403, description = "Not a member of the organization", body = ErrorResponse),
        (status = 404, description = "Organization or incident not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, member, request),
    fields(
        organization_id = %request.organization_id,
        incident_id = %request.incident_id,
        user_id = %member.user_id,
        status = %request.status,
        operation = "update_incident"
    )
)]
pub async fn update_incident(
    State(state): State<Arc<AppState>>,
    member: MemberContext,
    ValidatedJson(request): ValidatedJson<IncidentUpdateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate_request()?;
    member.authorize(&request.organization_id, "update incidents in")?;

    let ack = state
        .organizations
        .update_incident(
            &request.organization_id,
            &request.incident_id,
            request.status,
            request.message.trim(),
        )
        .await?;
    tracing::info!(message_id = %ack.message_id, "Incident updated");

    Ok(Json(MutationResponse::success(
        "Incident updated successfully",
        Some(ack),
    )))
}

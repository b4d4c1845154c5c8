//! Public status page: a one-shot snapshot and a live SSE feed.
//!
//! Both are built from the same store read and the same projection. The feed
//! holds one store subscription per connected client; it is released when the
//! client goes away and the stream is dropped.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::{self, Stream};
use status24_core::models::OrganizationDetails;
use status24_core::{project_status_page, AppError, StatusPage};
use status24_db::{Snapshot, Subscription};
use std::sync::Arc;

/// SSE event carrying a [`StatusPage`].
pub const STATUS_EVENT: &str = "status";
/// SSE event sent while the organization has no document.
pub const NOT_FOUND_EVENT: &str = "not_found";

#[utoipa::path(
    get,
    path = "/status/{org_id}",
    tag = "status",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Projected status page", body = StatusPage),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(organization_id = %org_id, operation = "get_status_page"))]
pub async fn get_status_page(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .organizations
        .get(&org_id)
        .await?
        .ok_or_else(|| AppError::OrganizationNotFound("Organization not found".to_string()))?;

    let details = state.organization_details(&org_id).await;
    Ok(Json(project_status_page(&details, &document)))
}

fn status_event(org_id: &str, details: &OrganizationDetails, snapshot: &Snapshot) -> Event {
    match snapshot {
        Some(document) => {
            let page = project_status_page(details, document);
            match Event::default().event(STATUS_EVENT).json_data(&page) {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(organization_id = %org_id, error = %e, "Failed to encode status page");
                    Event::default().comment("encoding failed")
                }
            }
        }
        None => Event::default().event(NOT_FOUND_EVENT).data(org_id),
    }
}

struct FeedState {
    subscription: Subscription,
    details: OrganizationDetails,
    first: bool,
}

#[utoipa::path(
    get,
    path = "/status/{org_id}/stream",
    tag = "status",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Server-sent events: `status` with a StatusPage on every change, `not_found` while the organization has no document", content_type = "text/event-stream")
    )
)]
#[tracing::instrument(skip(state), fields(organization_id = %org_id, operation = "stream_status_page"))]
pub async fn stream_status_page(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>>, HttpAppError> {
    let subscription = state.organizations.subscribe(&org_id).await?;
    let details = state.organization_details(&org_id).await;
    tracing::debug!("Status feed opened");

    let feed = FeedState {
        subscription,
        details,
        first: true,
    };

    let events = stream::unfold(feed, |mut feed| async move {
        let snapshot = if feed.first {
            feed.first = false;
            feed.subscription.current()
        } else {
            match feed.subscription.changed().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(organization_id = %feed.subscription.org_id(), error = %e, "Status feed closed");
                    return None;
                }
            }
        };

        let event = status_event(feed.subscription.org_id(), &feed.details, &snapshot);
        Some((Ok(event), feed))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}


//! Domain route groups (organizations, status pages, services, incidents, admin).

use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;

pub fn organization_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/organizations-list",
            get(handlers::organizations::list_organization_ids),
        )
        .route("/org-details", get(handlers::organizations::get_org_details))
}

pub fn status_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status/{org_id}", get(handlers::status::get_status_page))
        .route(
            "/status/{org_id}/stream",
            get(handlers::status::stream_status_page),
        )
}

pub fn user_routes() -> Router<Arc<AppState>> {
    Router::new().route("/user/org", get(handlers::organizations::get_user_org))
}

pub fn service_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/org/add-service", post(handlers::services::add_service))
        .route("/org/update-service", put(handlers::services::update_service))
        .route("/org/delete-service", delete(handlers::services::delete_service))
}

pub fn incident_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/org/add-incident", post(handlers::incidents::add_incident))
        .route("/org/update-incident", put(handlers::incidents::update_incident))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/create-user", post(handlers::admin::create_user))
        .route("/admin/create-org", post(handlers::admin::create_org))
        .route("/admin/add-user-to-org", post(handlers::admin::add_user_to_org))
        .route("/admin/organizations", get(handlers::admin::list_organizations))
}

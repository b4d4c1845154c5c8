//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use status24_core::{models, projection};

/// Returns the OpenAPI spec served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Status24 API",
        version = "0.1.0",
        description = "Multi-tenant status pages. Organizations publish services and incidents; anyone can read an organization's status page, live over server-sent events."
    ),
    modifiers(&BearerAuth),
    paths(
        // General
        handlers::root::root,
        health::health_check,
        // Organizations
        handlers::organizations::get_user_org,
        handlers::organizations::list_organization_ids,
        handlers::organizations::get_org_details,
        // Status pages
        handlers::status::get_status_page,
        handlers::status::stream_status_page,
        // Services
        handlers::services::add_service,
        handlers::services::update_service,
        handlers::services::delete_service,
        // Incidents
        handlers::incidents::add_incident,
        handlers::incidents::update_incident,
        // Admin
        handlers::admin::create_user,
        handlers::admin::create_org,
        handlers::admin::add_user_to_org,
        handlers::admin::list_organizations,
    ),
    components(
        schemas(
            // Domain models
            models::Service,
            models::ServiceStatus,
            models::Incident,
            models::IncidentStatus,
            models::IncidentUpdate,
            models::Organization,
            models::OrganizationDetails,
            models::OrganizationMembership,
            // Requests
            models::ServiceCreate,
            models::ServiceUpdate,
            models::ServiceDelete,
            models::IncidentCreate,
            models::IncidentUpdateRequest,
            models::CreateUserRequest,
            models::CreateOrgRequest,
            models::AddUserToOrgRequest,
            // Responses
            models::IncidentUpdateAck,
            models::OrganizationsList,
            models::OrganizationSummary,
            models::AdminOrganizationsList,
            models::MessageResponse,
            projection::StatusPage,
            projection::IncidentView,
            projection::AffectedService,
            handlers::organizations::UserOrgResponse,
            health::HealthCheckResponse,
            // Error
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "general", description = "Welcome message and health check"),
        (name = "organizations", description = "Organization lookup for signed-in users and public pages"),
        (name = "status", description = "Public status pages, one-shot and live"),
        (name = "services", description = "Service management for organization members"),
        (name = "incidents", description = "Incident reporting and updates for organization members"),
        (name = "admin", description = "User and organization management for the admin organization")
    )
)]
pub struct ApiDoc;

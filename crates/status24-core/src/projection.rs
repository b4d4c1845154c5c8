//! Read model projection.
//!
//! Turns the keyed maps of a stored [`OrganizationDocument`] into the sorted,
//! display-ready sequences every view renders. Projections are pure and are
//! recomputed from scratch on every snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::models::{
    Incident, IncidentStatus, IncidentUpdate, OrganizationDetails, OrganizationDocument, Service,
    ServiceStatus, ServiceType,
};

/// A service referenced by an incident, resolved against the current service list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AffectedService {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub service_type: ServiceType,
    pub status: ServiceStatus,
}

/// Display form of an incident: affected services resolved, update log sorted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct IncidentView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: IncidentStatus,
    pub datetime: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub affected_services: Vec<AffectedService>,
    /// Newest first.
    pub messages: Vec<IncidentUpdate>,
}

/// Everything a public status page shows for one organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct StatusPage {
    pub organization_id: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    /// Worst status among the services; operational when there are none.
    pub overall_status: ServiceStatus,
    pub services: Vec<Service>,
    pub incidents: Vec<IncidentView>,
}

impl StatusPage {
    /// Incidents that are not resolved yet, in display order.
    pub fn active_incidents(&self) -> impl Iterator<Item = &IncidentView> {
        self.incidents.iter().filter(|i| !i.status.is_resolved())
    }
}

/// Locale-aware name comparison: case-insensitive first, then code points so
/// the order stays total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Newest first; `None` sorts after every timestamp.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn with_key_as_id(key: &str, service: &Service) -> Service {
    let mut service = service.clone();
    if service.id.is_empty() {
        service.id = key.to_string();
    }
    service
}

/// Services in display order.
///
/// Newest `created_at` first; services without a creation timestamp come
/// after all timestamped ones, ordered by name. Equal keys fall back to name,
/// then id.
pub fn project_services(services: &BTreeMap<String, Service>) -> Vec<Service> {
    let mut projected: Vec<Service> = services
        .iter()
        .map(|(key, service)| with_key_as_id(key, service))
        .collect();

    projected.sort_by(|a, b| {
        newest_first(a.created_at, b.created_at)
            .then_with(|| compare_names(&a.name, &b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    projected
}

/// Services ordered by name only, for pickers such as the incident form.
pub fn services_by_name(services: &BTreeMap<String, Service>) -> Vec<Service> {
    let mut projected: Vec<Service> = services
        .iter()
        .map(|(key, service)| with_key_as_id(key, service))
        .collect();
    projected.sort_by(|a, b| compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
    projected
}

fn project_incident(key: &str, incident: &Incident, services: &[Service]) -> IncidentView {
    let affected_services = incident
        .affected_services
        .iter()
        .filter_map(|id| services.iter().find(|s| &s.id == id))
        .map(|s| AffectedService {
            id: s.id.clone(),
            name: s.name.clone(),
            service_type: s.service_type.clone(),
            status: s.status,
        })
        .collect();

    let mut messages: Vec<IncidentUpdate> = incident
        .messages
        .iter()
        .map(|(message_key, message)| {
            let mut message = message.clone();
            if message.id.is_empty() {
                message.id = message_key.clone();
            }
            message
        })
        .collect();
    messages.sort_by(|a, b| newest_first(a.timestamp, b.timestamp));

    IncidentView {
        id: if incident.id.is_empty() {
            key.to_string()
        } else {
            incident.id.clone()
        },
        title: incident.title.clone(),
        description: incident.description.clone(),
        status: incident.status,
        datetime: incident.datetime,
        created_at: incident.created_at,
        updated_at: incident.updated_at,
        resolved_at: incident.resolved_at,
        affected_services,
        messages,
    }
}

/// Incidents in display order, newest first.
///
/// The creation timestamp falls back to the reported start time; incidents
/// with neither keep their relative order at the end. References to services
/// that no longer exist are dropped.
pub fn project_incidents(
    incidents: &BTreeMap<String, Incident>,
    services: &[Service],
) -> Vec<IncidentView> {
    let mut projected: Vec<IncidentView> = incidents
        .iter()
        .map(|(key, incident)| project_incident(key, incident, services))
        .collect();

    projected.sort_by(|a, b| {
        newest_first(a.created_at.or(a.datetime), b.created_at.or(b.datetime))
    });
    projected
}

/// Full status page for one organization document.
pub fn project_status_page(
    details: &OrganizationDetails,
    document: &OrganizationDocument,
) -> StatusPage {
    let services = project_services(&document.services);
    let incidents = project_incidents(&document.incidents, &services);
    let overall_status = services
        .iter()
        .map(|s| s.status)
        .max()
        .unwrap_or(ServiceStatus::Operational);

    StatusPage {
        organization_id: document.id.clone(),
        name: details.name.clone(),
        image_url: details.image_url.clone(),
        overall_status,
        services,
        incidents,
    }
}

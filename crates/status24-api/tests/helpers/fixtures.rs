use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use status24_core::models::{
    Incident, IncidentStatus, OrganizationDocument, Service, ServiceStatus, ServiceType,
};
use status24_db::MemoryDocumentStore;

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

pub fn service(id: &str, name: &str, created_at: Option<DateTime<Utc>>) -> Service {
    Service {
        id: id.to_string(),
        name: name.to_string(),
        service_type: ServiceType::Api,
        status: ServiceStatus::Operational,
        description: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn incident(id: &str, title: &str, affected: &[&str], created_at: DateTime<Utc>) -> Incident {
    Incident {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        status: IncidentStatus::Investigating,
        datetime: Some(created_at),
        affected_services: affected.iter().map(|s| s.to_string()).collect(),
        created_at: Some(created_at),
        updated_at: Some(created_at),
        resolved_at: None,
        messages: Default::default(),
    }
}

/// Store holding one acme document with a few services and an incident.
pub fn seeded_store(org_id: &str) -> MemoryDocumentStore {
    let mut document = OrganizationDocument::new(org_id);
    for svc in [
        service("svc_old", "Website", Some(at(8))),
        service("svc_new", "API", Some(at(10))),
        service("svc_zeta", "Zeta", None),
        service("svc_alpha", "Alpha", None),
    ] {
        document.services.insert(svc.id.clone(), svc);
    }
    let inc = incident("inc_1", "Slow responses", &["svc_new", "svc_gone"], at(11));
    document.incidents.insert(inc.id.clone(), inc);

    MemoryDocumentStore::with_documents([(org_id.to_string(), document)])
}

pub fn add_service_body(org_id: &str, name: &str) -> Value {
    json!({
        "organizationId": org_id,
        "name": name,
        "type": "website",
        "status": "operational",
    })
}

pub fn add_incident_body(org_id: &str, affected: &[&str]) -> Value {
    json!({
        "organizationId": org_id,
        "title": "Database latency",
        "description": "Queries are slower than usual",
        "status": "investigating",
        "datetime": "2024-03-01T12:00:00Z",
        "affectedServices": affected,
    })
}

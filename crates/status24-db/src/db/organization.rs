use chrono::Utc;
use std::sync::Arc;

use status24_core::ids::new_document_id;
use status24_core::models::{
    Incident, IncidentCreate, IncidentStatus, IncidentUpdate, IncidentUpdateAck,
    OrganizationDocument, Service, ServiceCreate, ServiceStatus,
};

use super::{DocumentStore, StoreError, Subscription, WriteMode};

/// Repository for organization documents
///
/// Every write names the fields it changes and stamps server-side timestamps.
#[derive(Clone)]
pub struct OrganizationRepository {
    store: Arc<dyn DocumentStore>,
}

impl OrganizationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        self.store.list_ids().await
    }

    pub async fn exists(&self, org_id: &str) -> Result<bool, StoreError> {
        self.store.exists(org_id).await
    }

    pub async fn get(&self, org_id: &str) -> Result<Option<OrganizationDocument>, StoreError> {
        self.store.get(org_id).await
    }

    /// Creates an empty document for a new organization.
    #[tracing::instrument(skip(self), fields(db.operation = "ensure"))]
    pub async fn ensure_document(&self, org_id: &str) -> Result<bool, StoreError> {
        let created = self.store.ensure_document(org_id).await?;
        if created {
            tracing::info!(org_id, "Initialized organization document");
        }
        Ok(created)
    }

    pub async fn subscribe(&self, org_id: &str) -> Result<Subscription, StoreError> {
        self.store.subscribe(org_id).await
    }

    /// Adds a service, creating the document when the organization has none.
    #[tracing::instrument(skip(self, request), fields(db.operation = "insert", org_id = %request.organization_id))]
    pub async fn add_service(&self, request: &ServiceCreate) -> Result<Service, StoreError> {
        let now = Utc::now();
        let service = Service {
            id: new_document_id(),
            name: request.name.trim().to_string(),
            service_type: request.service_type.clone(),
            status: request.status,
            description: request
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            created_at: Some(now),
            updated_at: Some(now),
        };

        let stored = service.clone();
        self.store
            .apply(
                &request.organization_id,
                WriteMode::CreateIfMissing,
                Box::new(move |doc| {
                    doc.services.insert(stored.id.clone(), stored);
                    Ok(())
                }),
            )
            .await?;

        Ok(service)
    }

    /// Sets a service's status. Only `status` and `updated_at` change.
    #[tracing::instrument(skip(self), fields(db.operation = "update"))]
    pub async fn update_service_status(
        &self,
        org_id: &str,
        service_id: &str,
        status: ServiceStatus,
    ) -> Result<(), StoreError> {
        let org = org_id.to_string();
        let id = service_id.to_string();
        self.store
            .apply(
                org_id,
                WriteMode::RequireExisting,
                Box::new(move |doc| {
                    let service = doc
                        .services
                        .get_mut(&id)
                        .ok_or(StoreError::ServiceNotFound {
                            org_id: org,
                            service_id: id.clone(),
                        })?;
                    service.status = status;
                    service.updated_at = Some(Utc::now());
                    Ok(())
                }),
            )
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.operation = "delete"))]
    pub async fn delete_service(&self, org_id: &str, service_id: &str) -> Result<(), StoreError> {
        let org = org_id.to_string();
        let id = service_id.to_string();
        self.store
            .apply(
                org_id,
                WriteMode::RequireExisting,
                Box::new(move |doc| {
                    doc.services
                        .remove(&id)
                        .map(|_| ())
                        .ok_or(StoreError::ServiceNotFound {
                            org_id: org,
                            service_id: id,
                        })
                }),
            )
            .await?;
        Ok(())
    }

    /// Adds an incident, creating the document when the organization has none.
    #[tracing::instrument(skip(self, request), fields(db.operation = "insert", org_id = %request.organization_id))]
    pub async fn add_incident(&self, request: &IncidentCreate) -> Result<Incident, StoreError> {
        let now = Utc::now();
        let incident = Incident {
            id: new_document_id(),
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            status: request.status,
            datetime: Some(request.datetime),
            affected_services: request.affected_services.clone(),
            created_at: Some(now),
            updated_at: Some(now),
            resolved_at: request.status.is_resolved().then_some(now),
            messages: Default::default(),
        };

        let stored = incident.clone();
        self.store
            .apply(
                &request.organization_id,
                WriteMode::CreateIfMissing,
                Box::new(move |doc| {
                    doc.incidents.insert(stored.id.clone(), stored);
                    Ok(())
                }),
            )
            .await?;

        Ok(incident)
    }

    /// Sets an incident's status and appends one message to its log.
    ///
    /// Moving to `resolved` also stamps `resolved_at`.
    #[tracing::instrument(skip(self, message), fields(db.operation = "update"))]
    pub async fn update_incident(
        &self,
        org_id: &str,
        incident_id: &str,
        status: IncidentStatus,
        message: &str,
    ) -> Result<IncidentUpdateAck, StoreError> {
        let now = Utc::now();
        let entry = IncidentUpdate {
            id: new_document_id(),
            status,
            message: message.trim().to_string(),
            timestamp: Some(now),
        };
        let ack = IncidentUpdateAck {
            message_id: entry.id.clone(),
            status,
        };

        let org = org_id.to_string();
        let id = incident_id.to_string();
        self.store
            .apply(
                org_id,
                WriteMode::RequireExisting,
                Box::new(move |doc| {
                    let incident = doc
                        .incidents
                        .get_mut(&id)
                        .ok_or(StoreError::IncidentNotFound {
                            org_id: org,
                            incident_id: id.clone(),
                        })?;
                    incident.status = status;
                    incident.updated_at = Some(now);
                    if status.is_resolved() {
                        incident.resolved_at = Some(now);
                    }
                    incident.messages.insert(entry.id.clone(), entry);
                    Ok(())
                }),
            )
            .await?;

        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDocumentStore;
    use chrono::TimeZone;
    use status24_core::models::ServiceType;

    fn repository() -> OrganizationRepository {
        OrganizationRepository::new(Arc::new(MemoryDocumentStore::new()))
    }

    fn service_request(org_id: &str, name: &str) -> ServiceCreate {
        ServiceCreate {
            organization_id: org_id.to_string(),
            name: name.to_string(),
            service_type: ServiceType::Api,
            status: ServiceStatus::Operational,
            description: None,
        }
    }

    fn incident_request(org_id: &str) -> IncidentCreate {
        IncidentCreate {
            organization_id: org_id.to_string(),
            title: "Database outage".to_string(),
            description: "Primary is down".to_string(),
            status: IncidentStatus::Investigating,
            datetime: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            affected_services: vec![],
        }
    }

    #[tokio::test]
    async fn add_service_creates_document_lazily() {
        let repo = repository();
        let service = repo.add_service(&service_request("org_1", " API ")).await.unwrap();

        assert_eq!(service.name, "API");
        assert!(service.created_at.is_some());
        let doc = repo.get("org_1").await.unwrap().unwrap();
        assert_eq!(doc.services.get(&service.id), Some(&service));
    }

    #[tokio::test]
    async fn update_service_touches_status_only() {
        let repo = repository();
        let service = repo.add_service(&service_request("org_1", "API")).await.unwrap();

        repo.update_service_status("org_1", &service.id, ServiceStatus::MajorOutage)
            .await
            .unwrap();

        let doc = repo.get("org_1").await.unwrap().unwrap();
        let stored = &doc.services[&service.id];
        assert_eq!(stored.status, ServiceStatus::MajorOutage);
        assert_eq!(stored.name, "API");
        assert_eq!(stored.created_at, service.created_at);
        assert!(stored.updated_at >= service.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_service_is_not_found() {
        let repo = repository();
        let err = repo
            .update_service_status("org_1", "nope", ServiceStatus::Degraded)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound(_)));

        repo.ensure_document("org_1").await.unwrap();
        let err = repo
            .update_service_status("org_1", "nope", ServiceStatus::Degraded)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ServiceNotFound { .. }));
    }

    #[tokio::test]
    async fn delete_service_removes_it() {
        let repo = repository();
        let service = repo.add_service(&service_request("org_1", "API")).await.unwrap();
        repo.delete_service("org_1", &service.id).await.unwrap();

        assert!(repo.get("org_1").await.unwrap().unwrap().services.is_empty());
        assert!(repo.delete_service("org_1", &service.id).await.is_err());
    }

    #[tokio::test]
    async fn resolving_incident_appends_one_message_and_stamps_resolved_at() {
        let repo = repository();
        let incident = repo.add_incident(&incident_request("org_1")).await.unwrap();
        assert!(incident.resolved_at.is_none());

        let ack = repo
            .update_incident("org_1", &incident.id, IncidentStatus::Resolved, "Fixed")
            .await
            .unwrap();
        assert_eq!(ack.status, IncidentStatus::Resolved);

        let doc = repo.get("org_1").await.unwrap().unwrap();
        let stored = &doc.incidents[&incident.id];
        assert_eq!(stored.status, IncidentStatus::Resolved);
        assert!(stored.resolved_at.is_some());
        assert_eq!(stored.messages.len(), 1);
        assert_eq!(stored.messages[&ack.message_id].message, "Fixed");
    }

    #[tokio::test]
    async fn non_resolving_update_keeps_resolved_at_empty() {
        let repo = repository();
        let incident = repo.add_incident(&incident_request("org_1")).await.unwrap();
        repo.update_incident("org_1", &incident.id, IncidentStatus::Identified, "Found it")
            .await
            .unwrap();
        repo.update_incident("org_1", &incident.id, IncidentStatus::Monitoring, "Watching")
            .await
            .unwrap();

        let doc = repo.get("org_1").await.unwrap().unwrap();
        let stored = &doc.incidents[&incident.id];
        assert!(stored.resolved_at.is_none());
        assert_eq!(stored.messages.len(), 2);
    }

    #[tokio::test]
    async fn writes_are_published_to_subscribers() {
        let repo = repository();
        let mut subscription = repo.subscribe("org_1").await.unwrap();

        let service = repo.add_service(&service_request("org_1", "API")).await.unwrap();
        let snapshot = subscription.changed().await.unwrap().unwrap();
        assert!(snapshot.services.contains_key(&service.id));
    }
}

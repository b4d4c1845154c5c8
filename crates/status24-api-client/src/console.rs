//! Tenant and admin console workflows.
//!
//! Every mutation runs the same cycle: validate the draft locally, mark the
//! target in flight, send one authenticated request, then report the outcome
//! through a [`Notifier`]. A draft that fails validation never reaches the
//! network. Pending edits are cleared only after a 2xx; failures leave them
//! in place so the user can try again. There is no retry.

use chrono::{DateTime, Utc};
use status24_core::models::{
    AddUserToOrgRequest, CreateOrgRequest, CreateUserRequest, Incident, IncidentCreate,
    IncidentStatus, IncidentUpdateAck, IncidentUpdateRequest, OrganizationSummary, Service,
    ServiceCreate, ServiceDelete, ServiceStatus, ServiceType, ServiceUpdate,
};
use status24_core::validation::{
    ValidateRequest, MISSING_FIELDS_MESSAGE, MISSING_REQUIRED_FIELDS_MESSAGE,
};
use status24_core::ErrorMetadata;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{ApiClient, ClientError, Result};

/// Transient feedback for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => tracing::info!(%message, "Mutation succeeded"),
            Notification::Error(message) => tracing::warn!(%message, "Mutation failed"),
        }
    }
}

fn missing_fields() -> ClientError {
    ClientError::Validation(MISSING_FIELDS_MESSAGE.to_string())
}

fn missing_required_fields() -> ClientError {
    ClientError::Validation(MISSING_REQUIRED_FIELDS_MESSAGE.to_string())
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Runs the full request validation of a body about to be sent.
fn validated<T: ValidateRequest>(request: T) -> Result<T> {
    request.validate_request().map_err(|err| {
        tracing::debug!(error = %err, "Draft rejected");
        ClientError::Validation(err.client_message())
    })?;
    Ok(request)
}

/// Removes its target from the in-flight set when dropped.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    target: String,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<String>>>, target: &str) -> Result<Self> {
        let mut set = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(target.to_string()) {
            return Err(ClientError::Busy(target.to_string()));
        }
        Ok(InFlightGuard {
            in_flight: in_flight.clone(),
            target: target.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.target);
    }
}

/// Validation, in-flight tracking and notifications shared by both consoles.
struct Workflow<N> {
    notifier: N,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<N: Notifier> Workflow<N> {
    fn new(notifier: N) -> Self {
        Workflow {
            notifier,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn is_in_flight(&self, target: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(target)
    }

    fn reject<T>(&self, err: ClientError) -> Result<T> {
        self.notifier.notify(Notification::Error(err.notification_message()));
        Err(err)
    }

    /// Sends one request for `target`. `on_success` runs before the success
    /// notification, while the target is still marked in flight.
    async fn submit<T, Fut>(
        &self,
        target: &str,
        success_message: &str,
        request: Fut,
        on_success: impl FnOnce(&T),
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let _guard = InFlightGuard::acquire(&self.in_flight, target)?;

        match request.await {
            Ok(value) => {
                on_success(&value);
                self.notifier
                    .notify(Notification::Success(success_message.to_string()));
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(mutation_target = target, error = %err, "Request failed");
                self.reject(err)
            }
        }
    }
}

/// Add-service form contents. Unset selections are `None`.
#[derive(Debug, Clone, Default)]
pub struct ServiceDraft {
    pub name: String,
    pub service_type: Option<ServiceType>,
    pub status: Option<ServiceStatus>,
    pub description: Option<String>,
}

/// Add-incident form contents. Unset selections are `None`.
#[derive(Debug, Clone, Default)]
pub struct IncidentDraft {
    pub title: String,
    pub description: String,
    pub status: Option<IncidentStatus>,
    pub datetime: Option<DateTime<Utc>>,
    pub affected_services: Vec<String>,
}

/// Staged status change plus update message for one incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentEdit {
    pub status: IncidentStatus,
    pub message: String,
}

#[derive(Debug, Default)]
struct PendingEdits {
    service_status: HashMap<String, ServiceStatus>,
    incident: HashMap<String, IncidentEdit>,
}

/// Console of one tenant organization.
pub struct TenantConsole<N> {
    client: ApiClient,
    organization_id: String,
    workflow: Workflow<N>,
    pending: Mutex<PendingEdits>,
}

impl<N: Notifier> TenantConsole<N> {
    pub fn new(client: ApiClient, organization_id: impl Into<String>, notifier: N) -> Self {
        TenantConsole {
            client,
            organization_id: organization_id.into(),
            workflow: Workflow::new(notifier),
            pending: Mutex::new(PendingEdits::default()),
        }
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn is_in_flight(&self, target: &str) -> bool {
        self.workflow.is_in_flight(target)
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, PendingEdits> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stages a status selection for a service without sending it.
    pub fn stage_service_status(&self, service_id: &str, status: ServiceStatus) {
        self.pending()
            .service_status
            .insert(service_id.to_string(), status);
    }

    pub fn pending_service_status(&self, service_id: &str) -> Option<ServiceStatus> {
        self.pending().service_status.get(service_id).copied()
    }

    /// Stages a status change and update message for an incident without sending it.
    pub fn stage_incident_update(&self, incident_id: &str, status: IncidentStatus, message: &str) {
        self.pending().incident.insert(
            incident_id.to_string(),
            IncidentEdit {
                status,
                message: message.to_string(),
            },
        );
    }

    pub fn pending_incident_update(&self, incident_id: &str) -> Option<IncidentEdit> {
        self.pending().incident.get(incident_id).cloned()
    }

    pub async fn add_service(&self, draft: ServiceDraft) -> Result<Service> {
        let request = match self.service_request(draft) {
            Ok(request) => request,
            Err(err) => return self.workflow.reject(err),
        };

        self.workflow
            .submit(
                "add-service",
                "Service added successfully",
                self.client.add_service(&request),
                |_| {},
            )
            .await
    }

    fn service_request(&self, draft: ServiceDraft) -> Result<ServiceCreate> {
        let (Some(service_type), Some(status)) = (draft.service_type, draft.status) else {
            return Err(missing_required_fields());
        };
        if blank(&draft.name) || blank(service_type.as_str()) {
            return Err(missing_required_fields());
        }

        validated(ServiceCreate {
            organization_id: self.organization_id.clone(),
            name: draft.name.trim().to_string(),
            service_type,
            status,
            description: draft.description.filter(|d| !blank(d)),
        })
    }

    /// Sends the staged status of `service_id`.
    pub async fn save_service_status(&self, service_id: &str) -> Result<String> {
        let Some(status) = self.pending_service_status(service_id) else {
            return self.workflow.reject(missing_fields());
        };

        let request = ServiceUpdate {
            service_id: service_id.to_string(),
            organization_id: self.organization_id.clone(),
            status,
        };

        self.workflow
            .submit(
                &format!("service:{}", service_id),
                "Service status updated successfully",
                self.client.update_service_status(&request),
                |_| {
                    self.pending().service_status.remove(service_id);
                },
            )
            .await
    }

    pub async fn delete_service(&self, service_id: &str) -> Result<String> {
        if blank(service_id) {
            return self.workflow.reject(missing_fields());
        }

        let request = ServiceDelete {
            service_id: service_id.to_string(),
            organization_id: self.organization_id.clone(),
        };

        self.workflow
            .submit(
                &format!("service:{}", service_id),
                "Service deleted successfully",
                self.client.delete_service(&request),
                |_| {
                    self.pending().service_status.remove(service_id);
                },
            )
            .await
    }

    pub async fn add_incident(&self, draft: IncidentDraft) -> Result<Incident> {
        let request = match self.incident_request(draft) {
            Ok(request) => request,
            Err(err) => return self.workflow.reject(err),
        };

        self.workflow
            .submit(
                "add-incident",
                "Incident added successfully",
                self.client.add_incident(&request),
                |_| {},
            )
            .await
    }

    fn incident_request(&self, draft: IncidentDraft) -> Result<IncidentCreate> {
        let (Some(status), Some(datetime)) = (draft.status, draft.datetime) else {
            return Err(missing_required_fields());
        };
        if blank(&draft.title) || blank(&draft.description) {
            return Err(missing_required_fields());
        }

        validated(IncidentCreate {
            organization_id: self.organization_id.clone(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            status,
            datetime,
            affected_services: draft.affected_services,
        })
    }

    /// Sends the staged update of `incident_id`: new status plus one log message.
    pub async fn save_incident_update(&self, incident_id: &str) -> Result<IncidentUpdateAck> {
        let edit = match self.pending_incident_update(incident_id) {
            Some(edit) if !blank(&edit.message) => edit,
            _ => return self.workflow.reject(missing_fields()),
        };

        let request = match validated(IncidentUpdateRequest {
            incident_id: incident_id.to_string(),
            organization_id: self.organization_id.clone(),
            status: edit.status,
            message: edit.message.trim().to_string(),
        }) {
            Ok(request) => request,
            Err(err) => return self.workflow.reject(err),
        };

        self.workflow
            .submit(
                &format!("incident:{}", incident_id),
                "Incident updated successfully",
                self.client.update_incident(&request),
                |_| {
                    self.pending().incident.remove(incident_id);
                },
            )
            .await
    }
}

/// Console of the admin organization.
pub struct AdminConsole<N> {
    client: ApiClient,
    workflow: Workflow<N>,
}

impl<N: Notifier> AdminConsole<N> {
    pub fn new(client: ApiClient, notifier: N) -> Self {
        AdminConsole {
            client,
            workflow: Workflow::new(notifier),
        }
    }

    pub fn is_in_flight(&self, target: &str) -> bool {
        self.workflow.is_in_flight(target)
    }

    pub async fn create_user(&self, email: &str, name: &str) -> Result<serde_json::Value> {
        if blank(email) || blank(name) {
            return self.workflow.reject(missing_fields());
        }
        let request = match validated(CreateUserRequest {
            email: email.trim().to_string(),
            name: name.trim().to_string(),
        }) {
            Ok(request) => request,
            Err(err) => return self.workflow.reject(err),
        };

        self.workflow
            .submit(
                "create-user",
                "User created successfully",
                self.client.create_user(&request),
                |_| {},
            )
            .await
    }

    pub async fn create_org(&self, org_name: &str) -> Result<serde_json::Value> {
        if blank(org_name) {
            return self.workflow.reject(missing_fields());
        }
        let request = match validated(CreateOrgRequest {
            org_name: org_name.trim().to_string(),
        }) {
            Ok(request) => request,
            Err(err) => return self.workflow.reject(err),
        };

        self.workflow
            .submit(
                "create-org",
                "Organization created successfully",
                self.client.create_org(&request),
                |_| {},
            )
            .await
    }

    pub async fn add_user_to_org(
        &self,
        org_id: &str,
        email: &str,
        name: &str,
    ) -> Result<serde_json::Value> {
        if blank(org_id) || blank(email) || blank(name) {
            return self.workflow.reject(missing_fields());
        }
        let request = match validated(AddUserToOrgRequest {
            org_id: org_id.trim().to_string(),
            email: email.trim().to_string(),
            name: name.trim().to_string(),
        }) {
            Ok(request) => request,
            Err(err) => return self.workflow.reject(err),
        };

        self.workflow
            .submit(
                "add-user-to-org",
                "User added to organization successfully",
                self.client.add_user_to_org(&request),
                |_| {},
            )
            .await
    }

    /// Organization picker contents. Failures are reported like any mutation.
    pub async fn organizations(&self) -> Result<Vec<OrganizationSummary>> {
        match self.client.admin_organizations().await {
            Ok(organizations) => Ok(organizations),
            Err(err) => self.workflow.reject(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notification>>);

    impl Recorder {
        fn taken(&self) -> Vec<Notification> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, notification: Notification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    fn tenant(server: &mockito::Server) -> (TenantConsole<Arc<Recorder>>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::new(server.url(), Some("tok".to_string())).unwrap();
        (TenantConsole::new(client, "org_1", recorder.clone()), recorder)
    }

    fn error(message: &str) -> Notification {
        Notification::Error(message.to_string())
    }

    #[tokio::test]
    async fn empty_incident_message_never_reaches_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/org/update-incident")
            .expect(0)
            .create_async()
            .await;
        let (console, recorder) = tenant(&server);

        console.stage_incident_update("inc_1", IncidentStatus::Resolved, "   ");
        let err = console.save_incident_update("inc_1").await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(recorder.taken(), vec![error(MISSING_FIELDS_MESSAGE)]);
        assert!(console.pending_incident_update("inc_1").is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn resolving_incident_clears_pending_edit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/org/update-incident")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(serde_json::json!({
                "incidentId": "inc_1",
                "organizationId": "org_1",
                "status": "resolved",
                "message": "Fixed",
            })))
            .with_status(200)
            .with_body(r#"{"status": "success", "message": "Incident updated successfully", "data": {"messageId": "msg_1", "status": "resolved"}}"#)
            .create_async()
            .await;
        let (console, recorder) = tenant(&server);

        console.stage_incident_update("inc_1", IncidentStatus::Resolved, " Fixed ");
        let ack = console.save_incident_update("inc_1").await.unwrap();

        assert_eq!(ack.message_id, "msg_1");
        assert!(console.pending_incident_update("inc_1").is_none());
        assert!(!console.is_in_flight("incident:inc_1"));
        assert_eq!(
            recorder.taken(),
            vec![Notification::Success("Incident updated successfully".to_string())]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_save_keeps_pending_status_and_reports_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/org/update-service")
            .with_status(404)
            .with_body(r#"{"detail": "Service not found", "code": "NOT_FOUND"}"#)
            .create_async()
            .await;
        let (console, recorder) = tenant(&server);

        console.stage_service_status("svc_1", ServiceStatus::Degraded);
        let err = console.save_service_status("svc_1").await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(recorder.taken(), vec![error("Service not found")]);
        assert_eq!(
            console.pending_service_status("svc_1"),
            Some(ServiceStatus::Degraded)
        );
        assert!(!console.is_in_flight("service:svc_1"));
    }

    #[tokio::test]
    async fn second_submit_is_refused_while_in_flight() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/org/update-service")
            .with_status(200)
            .with_body(r#"{"status": "success", "message": "Service status updated successfully"}"#)
            .expect(1)
            .create_async()
            .await;
        let (console, _recorder) = tenant(&server);

        console.stage_service_status("svc_1", ServiceStatus::MajorOutage);
        let (first, second) = tokio::join!(
            console.save_service_status("svc_1"),
            console.save_service_status("svc_1")
        );

        let busy = [&first, &second]
            .iter()
            .filter(|r| matches!(r, Err(ClientError::Busy(_))))
            .count();
        assert_eq!(busy, 1);
        assert!(first.is_ok() || second.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn incomplete_service_draft_is_rejected_locally() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/org/add-service")
            .expect(0)
            .create_async()
            .await;
        let (console, recorder) = tenant(&server);

        let draft = ServiceDraft {
            name: "Website".to_string(),
            service_type: None,
            status: Some(ServiceStatus::Operational),
            description: None,
        };
        assert!(console.add_service(draft).await.is_err());
        assert_eq!(recorder.taken(), vec![error(MISSING_REQUIRED_FIELDS_MESSAGE)]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn incident_draft_without_start_is_rejected_locally() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/org/add-incident")
            .expect(0)
            .create_async()
            .await;
        let (console, recorder) = tenant(&server);

        let draft = IncidentDraft {
            title: "Database latency".to_string(),
            description: "Slow".to_string(),
            status: Some(IncidentStatus::Investigating),
            datetime: None,
            affected_services: vec![],
        };
        let err = console.add_incident(draft).await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(m) if m == "Please fill in all required fields"));
        assert_eq!(recorder.taken(), vec![error(MISSING_REQUIRED_FIELDS_MESSAGE)]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn add_incident_sends_organization_of_the_console() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/org/add-incident")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "organizationId": "org_1",
                "title": "Database latency",
                "affectedServices": ["svc_db"],
            })))
            .with_status(200)
            .with_body(
                r#"{"status": "success", "message": "Incident added successfully", "data": {
                    "id": "inc_9", "title": "Database latency", "description": "Slow",
                    "status": "investigating", "affectedServices": ["svc_db"]}}"#,
            )
            .create_async()
            .await;
        let (console, _recorder) = tenant(&server);

        let incident = console
            .add_incident(IncidentDraft {
                title: "Database latency".to_string(),
                description: "Slow".to_string(),
                status: Some(IncidentStatus::Investigating),
                datetime: Some(Utc::now()),
                affected_services: vec!["svc_db".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(incident.id, "inc_9");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn admin_invalid_email_is_rejected_locally() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/admin/create-user")
            .expect(0)
            .create_async()
            .await;
        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::new(server.url(), Some("tok".to_string())).unwrap();
        let console = AdminConsole::new(client, recorder.clone());

        assert!(console.create_user("", "Ada").await.is_err());
        assert!(console.create_user("not-an-email", "Ada").await.is_err());

        let notifications = recorder.taken();
        assert_eq!(notifications[0], error(MISSING_FIELDS_MESSAGE));
        assert!(matches!(&notifications[1], Notification::Error(m) if m != MISSING_FIELDS_MESSAGE));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn admin_provider_failure_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/admin/create-org")
            .with_status(403)
            .with_body(r#"{"detail": "User is not authorized. Admin access required."}"#)
            .create_async()
            .await;
        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::new(server.url(), Some("tok".to_string())).unwrap();
        let console = AdminConsole::new(client, recorder.clone());

        assert!(console.create_org("Initech").await.is_err());
        assert_eq!(
            recorder.taken(),
            vec![error("User is not authorized. Admin access required.")]
        );
    }
}

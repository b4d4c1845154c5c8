//! Terminal rendering for the Status24 CLI.

use status24_api_client::{Notification, Notifier};
use status24_core::models::{Service, ServiceStatus};
use status24_core::projection::{compare_names, IncidentView};
use status24_core::StatusPage;
use std::fmt::Write;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Headline for the overall status of a page.
pub fn headline(status: ServiceStatus) -> String {
    match status {
        ServiceStatus::Operational => "All systems operational".to_string(),
        other => format!("Some systems report {}", other.label()),
    }
}

fn service_line(service: &Service) -> String {
    let icon = service.service_type.icon().unwrap_or(" ");
    format!(
        "  {} {:<28} {}",
        icon,
        truncate_string(&service.name, 28),
        service.status.label()
    )
}

fn incident_block(out: &mut String, incident: &IncidentView) {
    let started = incident
        .datetime
        .or(incident.created_at)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown start".to_string());
    let _ = writeln!(
        out,
        "  [{}] {} ({})",
        incident.status.label(),
        incident.title,
        started
    );
    if !incident.description.is_empty() {
        let _ = writeln!(out, "      {}", truncate_string(&incident.description, 96));
    }
    if !incident.affected_services.is_empty() {
        let names: Vec<&str> = incident
            .affected_services
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        let _ = writeln!(out, "      affects: {}", names.join(", "));
    }
    for update in &incident.messages {
        let at = update
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "      - {} {}: {}", at, update.status.label(), update.message);
    }
}

/// Plain-text rendering of a public status page, in projection order.
pub fn render_status_page(page: &StatusPage) -> String {
    let mut out = String::new();
    let name = page.name.as_deref().unwrap_or(&page.organization_id);
    let _ = writeln!(out, "{}", name);
    let _ = writeln!(out, "{}", headline(page.overall_status));
    let _ = writeln!(out);

    let _ = writeln!(out, "Services");
    if page.services.is_empty() {
        let _ = writeln!(out, "  No services yet.");
    }
    for service in &page.services {
        let _ = writeln!(out, "{}", service_line(service));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Incidents");
    if page.incidents.is_empty() {
        let _ = writeln!(out, "  No incidents reported.");
    }
    for incident in &page.incidents {
        incident_block(&mut out, incident);
    }
    out
}

/// Services ordered by name, as offered when picking affected services.
pub fn service_picker(page: &StatusPage) -> Vec<&Service> {
    let mut services: Vec<&Service> = page.services.iter().collect();
    services.sort_by(|a, b| compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
    services
}

/// Prints notifications: successes to stdout, errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => println!("✔ {}", message),
            Notification::Error(message) => eprintln!("✘ {}", message),
        }
    }
}

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

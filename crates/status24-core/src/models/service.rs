use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Operational status of a service, ordered from healthiest to worst.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Operational,
    Degraded,
    PartialOutage,
    MajorOutage,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 4] = [
        ServiceStatus::Operational,
        ServiceStatus::Degraded,
        ServiceStatus::PartialOutage,
        ServiceStatus::MajorOutage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "operational",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::PartialOutage => "partial_outage",
            ServiceStatus::MajorOutage => "major_outage",
        }
    }

    /// Human label, underscores replaced by spaces.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "operational",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::PartialOutage => "partial outage",
            ServiceStatus::MajorOutage => "major outage",
        }
    }
}

impl Display for ServiceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown service status '{}', expected one of: operational, degraded, partial_outage, major_outage",
                    s
                )
            })
    }
}

/// Kind of service. The set is open: unrecognised kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Website,
    Api,
    Db,
    Other(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::Website => "website",
            ServiceType::Api => "api",
            ServiceType::Db => "db",
            ServiceType::Other(other) => other,
        }
    }

    /// Display glyph for known kinds; unrecognised kinds render without one.
    pub fn icon(&self) -> Option<&'static str> {
        match self {
            ServiceType::Website => Some("🌐"),
            ServiceType::Api => Some("⇄"),
            ServiceType::Db => Some("🗄"),
            ServiceType::Other(_) => None,
        }
    }
}

impl Default for ServiceType {
    fn default() -> Self {
        ServiceType::Other(String::new())
    }
}

impl From<String> for ServiceType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "website" => ServiceType::Website,
            "api" => ServiceType::Api,
            "db" => ServiceType::Db,
            _ => ServiceType::Other(value),
        }
    }
}

impl From<&str> for ServiceType {
    fn from(value: &str) -> Self {
        ServiceType::from(value.to_string())
    }
}

impl From<ServiceType> for String {
    fn from(value: ServiceType) -> Self {
        match value {
            ServiceType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for ServiceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A monitored component of an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Service {
    /// Explicit id; when absent the map key is used.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    #[schema(value_type = String, example = "website")]
    pub service_type: ServiceType,
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_keeps_unknown_kinds() {
        let kind: ServiceType = serde_json::from_str("\"sms\"").unwrap();
        assert_eq!(kind, ServiceType::Other("sms".to_string()));
        assert_eq!(kind.icon(), None);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"sms\"");
    }

    #[test]
    fn service_type_matches_known_kinds_case_insensitively() {
        assert_eq!(ServiceType::from("Website"), ServiceType::Website);
        assert_eq!(ServiceType::from("DB").icon(), Some("🗄"));
    }

    #[test]
    fn status_labels_and_ordering() {
        assert_eq!(ServiceStatus::PartialOutage.label(), "partial outage");
        assert!(ServiceStatus::MajorOutage > ServiceStatus::Degraded);
        assert_eq!(
            "major_outage".parse::<ServiceStatus>().unwrap(),
            ServiceStatus::MajorOutage
        );
        assert!("down".parse::<ServiceStatus>().is_err());
    }

    #[test]
    fn stored_service_without_timestamps_deserializes() {
        let json = r#"{"name":"API","type":"api","status":"degraded"}"#;
        let service: Service = serde_json::from_str(json).unwrap();
        assert!(service.id.is_empty());
        assert!(service.created_at.is_none());
        assert_eq!(service.service_type, ServiceType::Api);
    }
}

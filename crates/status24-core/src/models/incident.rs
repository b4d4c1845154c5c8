use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Lifecycle status of an incident.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 4] = [
        IncidentStatus::Investigating,
        IncidentStatus::Identified,
        IncidentStatus::Monitoring,
        IncidentStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Identified => "identified",
            IncidentStatus::Monitoring => "monitoring",
            IncidentStatus::Resolved => "resolved",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "Investigating",
            IncidentStatus::Identified => "Identified",
            IncidentStatus::Monitoring => "Monitoring",
            IncidentStatus::Resolved => "Resolved",
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, IncidentStatus::Resolved)
    }
}

impl Display for IncidentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown incident status '{}', expected one of: investigating, identified, monitoring, resolved",
                    s
                )
            })
    }
}

/// One entry of an incident's append-only update log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct IncidentUpdate {
    #[serde(default)]
    pub id: String,
    pub status: IncidentStatus,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A reported disruption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Incident {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: IncidentStatus,
    /// When the disruption started, as reported by the tenant.
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(rename = "affectedServices", default)]
    pub affected_services: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "resolvedAt", skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: BTreeMap<String, IncidentUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_accepts_camel_case_resolved_at() {
        let json = r#"{
            "title": "Outage",
            "status": "resolved",
            "resolvedAt": "2025-03-01T10:00:00Z"
        }"#;
        let incident: Incident = serde_json::from_str(json).unwrap();
        assert!(incident.resolved_at.is_some());
        assert!(incident.messages.is_empty());
        assert!(incident.affected_services.is_empty());
    }

    #[test]
    fn incident_serializes_stored_field_names() {
        let incident = Incident {
            id: "i1".to_string(),
            title: "Outage".to_string(),
            description: String::new(),
            status: IncidentStatus::Investigating,
            datetime: None,
            affected_services: vec!["s1".to_string()],
            created_at: None,
            updated_at: None,
            resolved_at: None,
            messages: BTreeMap::new(),
        };
        let value = serde_json::to_value(&incident).unwrap();
        assert!(value.get("affectedServices").is_some());
        assert!(value.get("resolved_at").is_none());
    }
}

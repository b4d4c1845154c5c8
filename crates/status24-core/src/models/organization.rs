use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::{Incident, Service};

/// Organization as known to the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Public details shown in a status page header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct OrganizationDetails {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl From<Organization> for OrganizationDetails {
    fn from(org: Organization) -> Self {
        OrganizationDetails {
            name: Some(org.name),
            image_url: org.image_url,
        }
    }
}

/// The stored document of one organization: keyed services and incidents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OrganizationDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
    #[serde(default)]
    pub incidents: BTreeMap<String, Incident>,
}

impl OrganizationDocument {
    pub fn new(id: impl Into<String>) -> Self {
        OrganizationDocument {
            id: id.into(),
            services: BTreeMap::new(),
            incidents: BTreeMap::new(),
        }
    }
}

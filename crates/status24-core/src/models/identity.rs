use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Organization;

/// A user's membership in one organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct OrganizationMembership {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub organization: Organization,
}

/// Identity of the caller, resolved from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub memberships: Vec<OrganizationMembership>,
}

impl UserIdentity {
    /// The organization a tenant acts for: the first membership.
    pub fn primary_organization(&self) -> Option<&Organization> {
        self.memberships.first().map(|m| &m.organization)
    }

    /// Whether any membership is in the organization with the given name.
    pub fn belongs_to_org_named(&self, name: &str) -> bool {
        self.memberships.iter().any(|m| m.organization.name == name)
    }
}

/// Splits a full name into first and last name: the first word, then the second (if any).
pub fn split_full_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.next().unwrap_or_default().to_string();
    (first, last)
}

use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use status24_core::ids::new_document_id;
use status24_core::models::{Organization, OrganizationMembership};

use super::{IdentityError, IdentityProvider, NewUser};

#[derive(Debug, Clone)]
struct MemoryUser {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
}

#[derive(Debug, Clone)]
struct MemoryMembership {
    id: String,
    user_id: String,
    org_id: String,
    role: String,
}

#[derive(Debug, Default)]
struct Directory {
    organizations: BTreeMap<String, Organization>,
    users: BTreeMap<String, MemoryUser>,
    memberships: Vec<MemoryMembership>,
}

impl Directory {
    fn user_by_email(&self, email: &str) -> Option<&MemoryUser> {
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    fn insert_user(&mut self, email: &str, first_name: &str, last_name: &str) -> MemoryUser {
        let user = MemoryUser {
            id: format!("user_{}", new_document_id()),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        self.users.insert(user.id.clone(), user.clone());
        user
    }
}

/// In-process identity provider.
///
/// Users, organizations and memberships are kept in memory; memberships are
/// returned in the order they were added.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    directory: RwLock<Directory>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(mut self, id: &str, name: &str) -> Self {
        self.directory.get_mut().organizations.insert(
            id.to_string(),
            Organization {
                id: id.to_string(),
                name: name.to_string(),
                image_url: None,
            },
        );
        self
    }

    /// Adds a membership for an existing user id; the user record is created
    /// when missing.
    pub fn with_membership(mut self, user_id: &str, org_id: &str) -> Self {
        let directory = self.directory.get_mut();
        directory
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| MemoryUser {
                id: user_id.to_string(),
                email: format!("{}@example.invalid", user_id),
                first_name: String::new(),
                last_name: String::new(),
            });
        directory.memberships.push(MemoryMembership {
            id: format!("orgmem_{}", new_document_id()),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
            role: "org:member".to_string(),
        });
        self
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn memberships(&self, user_id: &str) -> Result<Vec<OrganizationMembership>, IdentityError> {
        let directory = self.directory.read().await;
        Ok(directory
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                directory
                    .organizations
                    .get(&m.org_id)
                    .map(|org| OrganizationMembership {
                        id: Some(m.id.clone()),
                        role: Some(m.role.clone()),
                        organization: org.clone(),
                    })
            })
            .collect())
    }

    async fn organization(&self, org_id: &str) -> Result<Option<Organization>, IdentityError> {
        Ok(self.directory.read().await.organizations.get(org_id).cloned())
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, IdentityError> {
        Ok(self
            .directory
            .read()
            .await
            .organizations
            .values()
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: &NewUser) -> Result<serde_json::Value, IdentityError> {
        let mut directory = self.directory.write().await;
        if directory.user_by_email(&user.email).is_some() {
            return Err(IdentityError::Status {
                status: 422,
                body: "That email address is taken. Please try another.".to_string(),
            });
        }

        let created = directory.insert_user(&user.email, &user.first_name, &user.last_name);
        Ok(json!({
            "id": created.id,
            "email_addresses": [{ "email_address": created.email }],
            "first_name": created.first_name,
            "last_name": created.last_name,
            "public_metadata": user.public_metadata,
        }))
    }

    async fn create_organization(&self, name: &str) -> Result<serde_json::Value, IdentityError> {
        let org = Organization {
            id: format!("org_{}", new_document_id()),
            name: name.to_string(),
            image_url: None,
        };
        self.directory
            .write()
            .await
            .organizations
            .insert(org.id.clone(), org.clone());
        Ok(json!({ "id": org.id, "name": org.name }))
    }

    async fn add_member(
        &self,
        org_id: &str,
        email: &str,
        full_name: &str,
    ) -> Result<serde_json::Value, IdentityError> {
        let mut directory = self.directory.write().await;
        if !directory.organizations.contains_key(org_id) {
            return Err(IdentityError::NotFound(format!("Organization {}", org_id)));
        }

        let user_id = match directory.user_by_email(email) {
            Some(user) => user.id.clone(),
            None => {
                let (first, last) = status24_core::models::split_full_name(full_name);
                directory.insert_user(email, &first, &last).id
            }
        };

        let membership = MemoryMembership {
            id: format!("orgmem_{}", new_document_id()),
            user_id: user_id.clone(),
            org_id: org_id.to_string(),
            role: "org:member".to_string(),
        };
        directory.memberships.push(membership.clone());

        Ok(json!({
            "id": membership.id,
            "role": membership.role,
            "organization": { "id": org_id },
            "public_user_data": { "user_id": user_id },
            "public_metadata": { "full_name": full_name },
        }))
    }
}

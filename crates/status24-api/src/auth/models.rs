use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;

use status24_core::models::{OrganizationMembership, UserIdentity};
use status24_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Caller resolved by the auth middleware and stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub identity: UserIdentity,
    pub token: String,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Authorization header is missing".to_string(),
                ))
            })
    }
}

/// A caller acting for their first organization membership.
#[derive(Debug, Clone)]
pub struct MemberContext {
    pub user_id: String,
    pub membership: OrganizationMembership,
}

impl MemberContext {
    pub fn organization_id(&self) -> &str {
        &self.membership.organization.id
    }

    /// Fails with 403 unless `org_id` is the caller's organization.
    ///
    /// `action` completes "User is not authorized to ... this organization",
    /// e.g. `"add services to"`.
    pub fn authorize(&self, org_id: &str, action: &str) -> Result<(), AppError> {
        if self.organization_id() != org_id {
            tracing::debug!(
                user_id = %self.user_id,
                member_of = %self.organization_id(),
                requested = %org_id,
                "Organization mismatch"
            );
            return Err(AppError::Forbidden(format!(
                "User is not authorized to {} this organization",
                action
            )));
        }
        Ok(())
    }
}

impl<S> FromRequestParts<S> for MemberContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        let membership = user.identity.memberships.first().cloned().ok_or_else(|| {
            HttpAppError(AppError::Forbidden(
                "User is not a member of any organization".to_string(),
            ))
        })?;

        Ok(MemberContext {
            user_id: user.identity.user_id,
            membership,
        })
    }
}

/// A caller that belongs to the admin organization.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user_id: String,
}

impl FromRequestParts<Arc<AppState>> for AdminContext {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user
            .identity
            .belongs_to_org_named(&state.config.admin_org_name)
        {
            return Err(HttpAppError(AppError::Forbidden(
                "User is not authorized. Admin access required.".to_string(),
            )));
        }

        Ok(AdminContext {
            user_id: user.identity.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use status24_core::models::Organization;

    fn member_of(org_id: &str) -> MemberContext {
        MemberContext {
            user_id: "user_1".to_string(),
            membership: OrganizationMembership {
                id: None,
                role: None,
                organization: Organization {
                    id: org_id.to_string(),
                    name: "acme".to_string(),
                    image_url: None,
                },
            },
        }
    }

    #[test]
    fn authorize_accepts_own_organization() {
        assert!(member_of("org_1").authorize("org_1", "add services to").is_ok());
    }

    #[test]
    fn authorize_names_the_action() {
        let err = member_of("org_1")
            .authorize("org_2", "delete services in")
            .unwrap_err();
        match err {
            AppError::Forbidden(msg) => assert_eq!(
                msg,
                "User is not authorized to delete services in this organization"
            ),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use status24_core::models::UserIdentity;
use status24_core::AppError;
use status24_services::{IdentityError, IdentityProvider, TokenVerifier};

use super::bearer::parse_bearer;
use super::models::AuthenticatedUser;
use crate::error::HttpAppError;

/// Everything the auth middleware needs to resolve a caller.
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AuthState {
    /// Verifies the token and loads the caller's organization memberships.
    pub async fn authenticate(&self, token: &str) -> Result<UserIdentity, AppError> {
        let claims = self.verifier.verify(token).await?;
        let user_id = claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| AppError::Unauthorized("User ID not found in token".to_string()))?;

        let memberships = self
            .identity
            .memberships(&user_id)
            .await
            .map_err(|e| match e {
                IdentityError::Status { status, .. } => {
                    tracing::warn!(user_id = %user_id, status, "Membership lookup refused");
                    AppError::Forbidden(
                        "Failed to fetch user organization memberships".to_string(),
                    )
                }
                other => AppError::from(other),
            })?;

        Ok(UserIdentity {
            user_id,
            memberships,
        })
    }
}

/// Resolves the bearer token into an [`AuthenticatedUser`] request extension.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match parse_bearer(header) {
        Ok(token) => token.to_string(),
        Err(e) => return HttpAppError(e).into_response(),
    };

    let identity = match auth_state.authenticate(&token).await {
        Ok(identity) => identity,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(
        user_id = %identity.user_id,
        memberships = identity.memberships.len(),
        "Request authenticated"
    );

    request
        .extensions_mut()
        .insert(AuthenticatedUser { identity, token });

    next.run(request).await
}

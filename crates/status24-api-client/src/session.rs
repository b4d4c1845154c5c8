//! Session resolution against the API.
//!
//! Drives a [`SessionContext`] from `Loading` to `SignedIn` or `SignedOut`
//! using the client's bearer token and `GET /user/org`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use status24_core::{Session, SessionContext};

use crate::{ApiClient, Result};

#[derive(serde::Deserialize)]
struct Subject {
    sub: Option<String>,
}

/// Reads `sub` from a JWT payload without verifying it. The server verifies
/// every request; this only labels the local session.
pub fn token_subject(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<Subject>(&bytes).ok()?.sub
}

/// New session context for this client, carrying its publishable key.
pub fn session_context(client: &ApiClient, admin_org_name: &str) -> SessionContext {
    let context = SessionContext::new(admin_org_name);
    match client.publishable_key() {
        Some(key) => context.with_publishable_key(key),
        None => context,
    }
}

/// Signs the context in or out. A missing or rejected token signs out;
/// other failures sign out too and are returned.
pub async fn resolve_session(client: &ApiClient, context: &mut SessionContext) -> Result<()> {
    context.begin_loading();

    let Some(token) = client.token() else {
        context.sign_out();
        return Ok(());
    };

    match client.user_org().await {
        Ok(response) => {
            let user_id = token_subject(token).unwrap_or_default();
            let mut session = Session::new(user_id, token);
            if let Some(organization) = response.organization() {
                session = session.with_organization(organization);
            }
            tracing::debug!(user_id = %session.user_id, "Session resolved");
            context.sign_in(session);
            Ok(())
        }
        Err(err) if err.is_unauthorized() => {
            tracing::info!("Token rejected, signing out");
            context.sign_out();
            Ok(())
        }
        Err(err) => {
            context.sign_out();
            Err(err)
        }
    }
}

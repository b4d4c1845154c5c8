//! Store, identity provider and token verifier wiring.

use crate::auth::AuthState;
use crate::state::AppState;
use anyhow::{Context, Result};
use status24_core::Config;
use status24_db::{DocumentStore, MemoryDocumentStore, OrganizationRepository};
use status24_services::{build_identity_provider, build_token_verifier, IdentityProvider, TokenVerifier};
use std::sync::Arc;
use std::time::Duration;

/// Builds the application state from configuration.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let store: Arc<dyn DocumentStore> = match &config.store_seed_path {
        Some(path) => {
            let store = MemoryDocumentStore::from_seed_file(path)
                .with_context(|| format!("Failed to load store seed from {}", path))?;
            let count = store.list_ids().await?.len();
            tracing::info!(path = %path, documents = count, "Document store seeded");
            Arc::new(store)
        }
        None => {
            tracing::info!("Starting with an empty document store");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let identity = build_identity_provider(config)?;
    let verifier = build_token_verifier(
        &config.token_verification,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    Ok(assemble_state(config.clone(), store, identity, verifier))
}

/// Puts already-built components together.
pub fn assemble_state(
    config: Config,
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    verifier: Arc<dyn TokenVerifier>,
) -> Arc<AppState> {
    let auth = Arc::new(AuthState {
        verifier,
        identity: identity.clone(),
    });

    Arc::new(AppState {
        config,
        organizations: OrganizationRepository::new(store),
        identity,
        auth,
    })
}

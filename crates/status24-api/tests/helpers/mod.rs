//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in process: the in-memory document store, the in-memory
//! identity provider and HS256 tokens signed with [`TEST_JWT_SECRET`].

pub mod fixtures;

use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use status24_api::setup::routes::setup_routes;
use status24_api::setup::services::assemble_state;
use status24_api::AppState;
use status24_core::Config;
use status24_db::MemoryDocumentStore;
use status24_services::{MemoryIdentityProvider, SharedSecretVerifier, TokenClaims};
use std::sync::Arc;

pub const TEST_JWT_SECRET: &str = "status24-test-secret-with-32-plus-chars";

pub const ACME_ORG_ID: &str = "org_acme";
pub const GLOBEX_ORG_ID: &str = "org_globex";
pub const ADMIN_ORG_ID: &str = "org_status24";

/// Member of acme.
pub const ACME_USER: &str = "user_acme";
/// Member of globex.
pub const GLOBEX_USER: &str = "user_globex";
/// Member of the admin organization (and of nothing else).
pub const ADMIN_USER: &str = "user_admin";
/// Signed in, no membership.
pub const LONE_USER: &str = "user_lone";

/// Test application: server plus the state behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub router: Router,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Signs a token for `sub` that expires in ten minutes.
pub fn token_for(sub: &str) -> String {
    mint_token(Some(sub), 600)
}

pub fn mint_token(sub: Option<&str>, expires_in: i64) -> String {
    let claims = TokenClaims {
        sub: sub.map(str::to_string),
        exp: chrono::Utc::now().timestamp() + expires_in,
        iat: Some(chrono::Utc::now().timestamp()),
        sid: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

fn identity_provider() -> MemoryIdentityProvider {
    MemoryIdentityProvider::new()
        .with_organization(ACME_ORG_ID, "acme")
        .with_organization(GLOBEX_ORG_ID, "globex")
        .with_organization(ADMIN_ORG_ID, "status24")
        .with_membership(ACME_USER, ACME_ORG_ID)
        .with_membership(GLOBEX_USER, GLOBEX_ORG_ID)
        .with_membership(ADMIN_USER, ADMIN_ORG_ID)
}

/// Setup test app with an empty store.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_store(MemoryDocumentStore::new()).await
}

/// Setup test app on top of an existing store.
pub async fn setup_test_app_with_store(store: MemoryDocumentStore) -> TestApp {
    let config = Config::for_development(TEST_JWT_SECRET);
    let state = assemble_state(
        config.clone(),
        Arc::new(store),
        Arc::new(identity_provider()),
        Arc::new(SharedSecretVerifier::new(TEST_JWT_SECRET)),
    );

    let router = setup_routes(&config, state.clone()).expect("routes build");
    let server = TestServer::new(router.clone()).expect("test server starts");

    TestApp {
        server,
        state,
        router,
    }
}

//! Status24 Services Layer
//!
//! Integrations with the outside world that the API depends on: the identity
//! provider (users, organizations, memberships) and bearer-token verification.
//! Both sit behind traits so the API can run against in-memory doubles.

pub mod identity;
pub mod token;

pub use identity::{
    build_identity_provider, ClerkIdentityProvider, IdentityError, IdentityProvider,
    MemoryIdentityProvider, NewUser,
};
pub use token::{
    build_token_verifier, JwksTokenVerifier, SharedSecretVerifier, TokenClaims, TokenVerifier,
};

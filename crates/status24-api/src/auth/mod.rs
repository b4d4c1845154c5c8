//! Bearer authentication and organization gating.
//!
//! Protected routes run [`middleware::auth_middleware`], which verifies the
//! token and loads the caller's memberships. Handlers then pick the extractor
//! matching the access they need: [`AuthenticatedUser`], [`MemberContext`] or
//! [`AdminContext`].

pub mod bearer;
pub mod middleware;
pub mod models;

pub use middleware::{auth_middleware, AuthState};
pub use models::{AdminContext, AuthenticatedUser, MemberContext};

//! Session context and route gate.
//!
//! A small state machine deciding, for a route and the current session, whether
//! to show a loading state, redirect, or render a view. Session state lives in
//! an explicit [`SessionContext`] that callers own and pass around.

use crate::models::{Organization, UserIdentity};

/// The signed-in user as far as views are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    /// Bearer token used for authenticated requests.
    pub token: String,
    pub organization: Option<Organization>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Session {
            user_id: user_id.into(),
            token: token.into(),
            organization: None,
        }
    }

    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organization = Some(organization);
        self
    }

    /// Session for a resolved identity; the organization is the first membership.
    pub fn from_identity(identity: &UserIdentity, token: impl Into<String>) -> Self {
        Session {
            user_id: identity.user_id.clone(),
            token: token.into(),
            organization: identity.primary_organization().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Loading,
    SignedOut,
    SignedIn(Session),
}

/// Application routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    NotFound,
    /// Public status page of one organization, keyed by its id.
    PublicStatus(String),
}

impl Route {
    /// Maps a path to a route. Unknown nested paths map to [`Route::NotFound`].
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Route::Home;
        }

        let mut segments = trimmed.split('/');
        let first = segments.next().unwrap_or_default();
        match first {
            // the identity provider's sign-in flow nests its own pages
            "sign-in" => Route::SignIn,
            "not-found" => Route::NotFound,
            org_id if segments.next().is_none() => Route::PublicStatus(org_id.to_string()),
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::SignIn => "/sign-in".to_string(),
            Route::NotFound => "/not-found".to_string(),
            Route::PublicStatus(org_id) => format!("/{}", org_id),
        }
    }
}

/// What the home route renders for a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Admin,
    Tenant { organization: Organization },
    /// Signed in but not a member of any organization.
    Unaffiliated,
    SignIn,
    PublicStatus { org_id: String },
    NotFound,
}

/// Outcome of gating one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    ShowLoading,
    Redirect(Route),
    Render(View),
}

/// State of the existence check for a public organization route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicLookup {
    Pending,
    Found,
    Missing,
}

/// Process-wide session state, held explicitly.
///
/// Starts in `Loading`; `sign_in` and `sign_out` are the only transitions
/// out of it, and `begin_loading` puts it back (e.g. while a token refresh
/// is in progress).
#[derive(Debug, Clone)]
pub struct SessionContext {
    admin_org_name: String,
    publishable_key: Option<String>,
    state: SessionState,
}

impl SessionContext {
    pub fn new(admin_org_name: impl Into<String>) -> Self {
        SessionContext {
            admin_org_name: admin_org_name.into(),
            publishable_key: None,
            state: SessionState::Loading,
        }
    }

    pub fn with_publishable_key(mut self, key: impl Into<String>) -> Self {
        self.publishable_key = Some(key.into());
        self
    }

    pub fn publishable_key(&self) -> Option<&str> {
        self.publishable_key.as_deref()
    }

    pub fn admin_org_name(&self) -> &str {
        &self.admin_org_name
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn begin_loading(&mut self) {
        self.state = SessionState::Loading;
    }

    pub fn sign_in(&mut self, session: Session) {
        self.state = SessionState::SignedIn(session);
    }

    /// Drops the session and everything derived from it.
    pub fn sign_out(&mut self) {
        self.state = SessionState::SignedOut;
    }

    /// View for a signed-in session, branching on the organization name.
    pub fn view_for(&self, session: &Session) -> View {
        match &session.organization {
            Some(org) if org.name == self.admin_org_name => View::Admin,
            Some(org) => View::Tenant {
                organization: org.clone(),
            },
            None => View::Unaffiliated,
        }
    }

    /// Gates `route`. `lookup` is only consulted for public status routes,
    /// which do not depend on the session at all.
    pub fn resolve(&self, route: &Route, lookup: PublicLookup) -> Resolution {
        match route {
            Route::Home => match &self.state {
                SessionState::Loading => Resolution::ShowLoading,
                SessionState::SignedOut => Resolution::Redirect(Route::SignIn),
                SessionState::SignedIn(session) => Resolution::Render(self.view_for(session)),
            },
            Route::SignIn => match &self.state {
                SessionState::Loading => Resolution::ShowLoading,
                SessionState::SignedOut => Resolution::Render(View::SignIn),
                SessionState::SignedIn(_) => Resolution::Redirect(Route::Home),
            },
            Route::NotFound => Resolution::Render(View::NotFound),
            Route::PublicStatus(org_id) => match lookup {
                PublicLookup::Pending => Resolution::ShowLoading,
                PublicLookup::Missing => Resolution::Redirect(Route::NotFound),
                PublicLookup::Found => Resolution::Render(View::PublicStatus {
                    org_id: org_id.clone(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(name: &str) -> Organization {
        Organization {
            id: format!("org_{}", name),
            name: name.to_string(),
            image_url: None,
        }
    }

    #[test]
    fn parse_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/sign-in"), Route::SignIn);
        assert_eq!(Route::parse("/sign-in/factor-one"), Route::SignIn);
        assert_eq!(Route::parse("/not-found"), Route::NotFound);
        assert_eq!(
            Route::parse("/org_acme/"),
            Route::PublicStatus("org_acme".to_string())
        );
        assert_eq!(Route::parse("/org_acme/extra"), Route::NotFound);
        assert_eq!(Route::PublicStatus("x".to_string()).path(), "/x");
    }

    #[test]
    fn loading_shows_loading_on_gated_routes() {
        let ctx = SessionContext::new("status24");
        assert_eq!(ctx.resolve(&Route::Home, PublicLookup::Pending), Resolution::ShowLoading);
        assert_eq!(ctx.resolve(&Route::SignIn, PublicLookup::Pending), Resolution::ShowLoading);
    }

    #[test]
    fn signed_out_home_redirects_to_sign_in() {
        let mut ctx = SessionContext::new("status24");
        ctx.sign_out();
        assert_eq!(
            ctx.resolve(&Route::Home, PublicLookup::Pending),
            Resolution::Redirect(Route::SignIn)
        );
        assert_eq!(
            ctx.resolve(&Route::SignIn, PublicLookup::Pending),
            Resolution::Render(View::SignIn)
        );
    }

    #[test]
    fn signed_in_branches_on_organization_name() {
        let mut ctx = SessionContext::new("status24");

        ctx.sign_in(Session::new("u1", "t").with_organization(org("status24")));
        assert_eq!(
            ctx.resolve(&Route::Home, PublicLookup::Pending),
            Resolution::Render(View::Admin)
        );
        assert_eq!(
            ctx.resolve(&Route::SignIn, PublicLookup::Pending),
            Resolution::Redirect(Route::Home)
        );

        ctx.sign_in(Session::new("u2", "t").with_organization(org("acme")));
        assert_eq!(
            ctx.resolve(&Route::Home, PublicLookup::Pending),
            Resolution::Render(View::Tenant {
                organization: org("acme")
            })
        );

        ctx.sign_in(Session::new("u3", "t"));
        assert_eq!(
            ctx.resolve(&Route::Home, PublicLookup::Pending),
            Resolution::Render(View::Unaffiliated)
        );
    }

    #[test]
    fn admin_name_is_configurable() {
        let mut ctx = SessionContext::new("ops");
        ctx.sign_in(Session::new("u1", "t").with_organization(org("status24")));
        assert!(matches!(
            ctx.resolve(&Route::Home, PublicLookup::Pending),
            Resolution::Render(View::Tenant { .. })
        ));
    }

    #[test]
    fn public_route_follows_lookup() {
        let ctx = SessionContext::new("status24");
        let route = Route::PublicStatus("org_acme".to_string());
        assert_eq!(ctx.resolve(&route, PublicLookup::Pending), Resolution::ShowLoading);
        assert_eq!(
            ctx.resolve(&route, PublicLookup::Missing),
            Resolution::Redirect(Route::NotFound)
        );
        assert_eq!(
            ctx.resolve(&route, PublicLookup::Found),
            Resolution::Render(View::PublicStatus {
                org_id: "org_acme".to_string()
            })
        );
    }

    #[test]
    fn sign_out_clears_session() {
        let mut ctx = SessionContext::new("status24").with_publishable_key("pk_test");
        ctx.sign_in(Session::new("u1", "t"));
        assert!(ctx.session().is_some());
        ctx.sign_out();
        assert!(ctx.session().is_none());
        assert_eq!(ctx.state(), &SessionState::SignedOut);
        assert_eq!(ctx.publishable_key(), Some("pk_test"));
        ctx.begin_loading();
        assert_eq!(ctx.state(), &SessionState::Loading);
    }
}

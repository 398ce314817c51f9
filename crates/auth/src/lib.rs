//! `wemakit-auth` — session, route authorization and navigation policy.
//!
//! This crate is intentionally decoupled from HTTP. The identity service is
//! reached only through [`IdentityBackend`].

pub mod actor;
pub mod backend;
pub mod claims;
pub mod guard;
pub mod navigation;
pub mod resolver;
pub mod roles;
pub mod session;

pub use actor::Actor;
pub use backend::{AccessToken, IdentityBackend, IdentityError, InMemoryIdentityBackend};
pub use claims::{JwtIdentityBackend, SessionClaims, TokenValidationError, validate_claims};
pub use guard::{
    GuardDecision, GuardedRoute, LOGIN_PATH, LandingError, Redirect, RoleLandings, RouteGuard, RouteTable,
    dashboard_root,
};
pub use navigation::{DEFAULT_NAVIGATION, Icon, NavEntry, NavigationItem, filter_for_role, is_active, visible_entries};
pub use resolver::SessionResolver;
pub use roles::{Role, RoleSet};
pub use session::Session;

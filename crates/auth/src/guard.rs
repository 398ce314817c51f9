//! Route guard: decides whether a protected view renders or redirects.
//!
//! - No IO
//! - No panics
//! - Decisions are plain values; performing the navigation is the host's job.

use serde::Serialize;
use thiserror::Error;

use crate::{Role, RoleSet, Session};

/// Default login destination for unauthenticated sessions.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of evaluating a route guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session still resolving; show only a neutral loading indicator.
    Loading,
    Redirect(Redirect),
    /// Render the wrapped view unchanged.
    Render,
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardDecision::Redirect(r) => Some(&r.to),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GuardDecision::Loading => "loading",
            GuardDecision::Redirect(_) => "redirect",
            GuardDecision::Render => "render",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    /// Replace the current history entry instead of pushing one.
    pub replace: bool,
    /// Originally requested location, for the login flow to return to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// Per-role landing page, the redirect target for unauthorized access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLandings {
    client: String,
    designer: String,
    admin: String,
}

impl Default for RoleLandings {
    fn default() -> Self {
        Self {
            client: dashboard_root(Role::Client),
            designer: dashboard_root(Role::Designer),
            admin: dashboard_root(Role::Admin),
        }
    }
}

impl RoleLandings {
    pub fn with_landing(mut self, role: Role, path: impl Into<String>) -> Self {
        *self.slot_mut(role) = path.into();
        self
    }

    pub fn landing_for(&self, role: Role) -> &str {
        match role {
            Role::Client => &self.client,
            Role::Designer => &self.designer,
            Role::Admin => &self.admin,
        }
    }

    /// Check every role's landing is a route that admits that role, so an
    /// unauthorized redirect can never bounce back into another redirect.
    pub fn verify(&self, routes: &RouteTable) -> Result<(), LandingError> {
        for role in Role::ALL {
            let path = self.landing_for(role);
            let Some(route) = routes.lookup(path) else {
                return Err(LandingError::UnknownRoute {
                    role,
                    path: path.to_string(),
                });
            };
            if let Some(allowed) = route.allowed_roles {
                if !allowed.contains(role) {
                    return Err(LandingError::NotAdmitted {
                        role,
                        path: path.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, role: Role) -> &mut String {
        match role {
            Role::Client => &mut self.client,
            Role::Designer => &mut self.designer,
            Role::Admin => &mut self.admin,
        }
    }
}

/// `/dashboard/{role}`
pub fn dashboard_root(role: Role) -> String {
    format!("/dashboard/{}", role.as_str())
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LandingError {
    #[error("landing '{path}' for role {role} is not a known route")]
    UnknownRoute { role: Role, path: String },

    #[error("landing '{path}' does not admit role {role}")]
    NotAdmitted { role: Role, path: String },
}

/// Guard for one protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    allowed_roles: Option<RoleSet>,
    landings: RoleLandings,
    login_path: String,
}

impl RouteGuard {
    /// Guard admitting any authenticated role.
    pub fn authenticated() -> Self {
        Self {
            allowed_roles: None,
            landings: RoleLandings::default(),
            login_path: LOGIN_PATH.to_string(),
        }
    }

    /// Guard admitting only `roles`.
    pub fn roles(roles: RoleSet) -> Self {
        Self {
            allowed_roles: Some(roles),
            ..Self::authenticated()
        }
    }

    pub fn with_landings(mut self, landings: RoleLandings) -> Self {
        self.landings = landings;
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn allowed_roles(&self) -> Option<RoleSet> {
        self.allowed_roles
    }

    /// Evaluate the guard for `session` at `requested`.
    ///
    /// Loading wins over authentication, which wins over authorization.
    pub fn evaluate(&self, session: &Session, requested: &str) -> GuardDecision {
        let actor = match session {
            Session::Loading => return GuardDecision::Loading,
            Session::Unauthenticated => {
                return GuardDecision::Redirect(Redirect {
                    to: self.login_path.clone(),
                    replace: true,
                    from: Some(requested.to_string()),
                });
            }
            Session::Authenticated(actor) => actor,
        };

        match self.allowed_roles {
            Some(allowed) if !actor.may_access(&allowed) => GuardDecision::Redirect(Redirect {
                to: self.landings.landing_for(actor.role).to_string(),
                replace: true,
                from: None,
            }),
            _ => GuardDecision::Render,
        }
    }
}

/// A guarded route: exact path plus optional allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardedRoute {
    pub path: String,
    pub allowed_roles: Option<RoleSet>,
}

impl GuardedRoute {
    pub fn guard(&self) -> RouteGuard {
        match self.allowed_roles {
            Some(roles) => RouteGuard::roles(roles),
            None => RouteGuard::authenticated(),
        }
    }
}

/// Ordered list of guarded routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<GuardedRoute>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route; a later entry for the same path replaces the earlier one.
    pub fn route(mut self, path: impl Into<String>, allowed_roles: Option<RoleSet>) -> Self {
        let path = path.into();
        match self.routes.iter_mut().find(|r| r.path == path) {
            Some(existing) => existing.allowed_roles = allowed_roles,
            None => self.routes.push(GuardedRoute { path, allowed_roles }),
        }
        self
    }

    pub fn lookup(&self, path: &str) -> Option<&GuardedRoute> {
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GuardedRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Guard for `path` using this table's allow-list.
    pub fn guard_for(&self, path: &str) -> Option<RouteGuard> {
        self.lookup(path).map(GuardedRoute::guard)
    }

    /// Dashboard routes: one per navigation entry plus each role's landing.
    pub fn dashboard() -> Self {
        let landings = Role::ALL
            .into_iter()
            .fold(Self::new(), |table, role| table.route(dashboard_root(role), Some(RoleSet::only(role))));

        crate::navigation::DEFAULT_NAVIGATION
            .iter()
            .fold(landings, |table, item| table.route(item.path, Some(item.allowed_roles)))
    }
}

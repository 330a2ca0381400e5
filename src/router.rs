//! Route table and navigation guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! `before_each` is the pure guard: given a target location and whether the
//! session is authenticated, it either lets navigation proceed or names a
//! redirect. `Navigator` wraps it with the side effects: restoring the
//! session first and running the logout route's action.

use std::sync::Arc;

use url::form_urlencoded;

use crate::net::transport::Transport;
use crate::state::auth::AuthStore;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
pub const REDIRECT_PARAM: &str = "redirect";
const MAX_REDIRECTS: usize = 5;

// =============================================================================
// ROUTES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteName {
    Login,
    Logout,
    Dashboard,
    Users,
    NotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub public: bool,
    pub title: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub name: RouteName,
    pub path: &'static str,
    pub meta: RouteMeta,
}

pub const ROUTES: &[Route] = &[
    Route {
        name: RouteName::Login,
        path: LOGIN_PATH,
        meta: RouteMeta { requires_auth: false, public: true, title: "Sign in" },
    },
    Route {
        name: RouteName::Logout,
        path: "/logout",
        meta: RouteMeta { requires_auth: false, public: true, title: "Sign out" },
    },
    Route {
        name: RouteName::Dashboard,
        path: HOME_PATH,
        meta: RouteMeta { requires_auth: true, public: false, title: "Dashboard" },
    },
    Route {
        name: RouteName::Users,
        path: "/users",
        meta: RouteMeta { requires_auth: true, public: false, title: "Users" },
    },
];

const NOT_FOUND: Route = Route {
    name: RouteName::NotFound,
    path: "",
    meta: RouteMeta { requires_auth: false, public: true, title: "Page not found" },
};

/// Match a path (no query) against the route table.
#[must_use]
pub fn resolve(path: &str) -> Route {
    let trimmed = path.trim_end_matches('/');
    let normalized = if trimmed.is_empty() { HOME_PATH } else { trimmed };
    ROUTES.iter().copied().find(|r| r.path == normalized).unwrap_or(NOT_FOUND)
}

// =============================================================================
// LOCATION
// =============================================================================

/// A navigation target: path plus decoded query pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    #[must_use]
    pub fn parse(full_path: &str) -> Self {
        let (path, query) = full_path.split_once('?').unwrap_or((full_path, ""));
        let query = form_urlencoded::parse(query.as_bytes()).into_owned().collect();
        let path = if path.is_empty() { HOME_PATH.to_owned() } else { path.to_owned() };
        Self { path, query }
    }

    #[must_use]
    pub fn login_with_redirect(target: &str) -> Self {
        Self { path: LOGIN_PATH.to_owned(), query: vec![(REDIRECT_PARAM.to_owned(), target.to_owned())] }
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Path with the query re-encoded.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.query).finish();
        format!("{}?{query}", self.path)
    }
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed(Route),
    Redirect(Location),
}

/// Decide whether navigation to `to` may proceed.
#[must_use]
pub fn before_each(to: &Location, authenticated: bool) -> GuardDecision {
    let route = resolve(&to.path);

    if !route.meta.public && !authenticated {
        return GuardDecision::Redirect(Location::login_with_redirect(&to.full_path()));
    }

    if route.name == RouteName::Login && authenticated {
        // Only same-origin paths are honored as post-login targets.
        let target = to.query_value(REDIRECT_PARAM).filter(|r| r.starts_with('/') && !r.starts_with("//"));
        return GuardDecision::Redirect(Location::parse(target.unwrap_or(HOME_PATH)));
    }

    GuardDecision::Proceed(route)
}

// =============================================================================
// NAVIGATOR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("navigation to {from} exceeded {limit} redirects")]
    TooManyRedirects { from: String, limit: usize },
}

/// Where a navigation ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Landing {
    pub route: Route,
    pub location: Location,
    /// Every location visited before landing, in order.
    pub redirects: Vec<String>,
}

impl Landing {
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.route.meta.title
    }
}

pub struct Navigator<T> {
    auth: Arc<AuthStore<T>>,
}

impl<T: Transport> Navigator<T> {
    #[must_use]
    pub fn new(auth: Arc<AuthStore<T>>) -> Self {
        Self { auth }
    }

    /// Navigate to `full_path`, following guard redirects.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::TooManyRedirects`] if redirects loop.
    pub async fn navigate(&self, full_path: &str) -> Result<Landing, NavigationError> {
        self.auth.init();

        let mut location = Location::parse(full_path);
        let mut redirects = Vec::new();
        for _ in 0..=MAX_REDIRECTS {
            let next = match before_each(&location, self.auth.is_authenticated()) {
                GuardDecision::Proceed(route) if route.name == RouteName::Logout => {
                    self.auth.logout().await;
                    Location::parse(LOGIN_PATH)
                }
                GuardDecision::Proceed(route) => {
                    tracing::debug!(path = %location.path, title = route.meta.title, "navigated");
                    return Ok(Landing { route, location, redirects });
                }
                GuardDecision::Redirect(next) => next,
            };
            redirects.push(location.full_path());
            location = next;
        }
        Err(NavigationError::TooManyRedirects { from: full_path.to_owned(), limit: MAX_REDIRECTS })
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;

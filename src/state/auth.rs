//! Auth actions for the current user: login, refresh, logout, init.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the CLI and by the router's navigator. State lives in
//! `SessionStore`; this type only sequences endpoint calls and session
//! mutations.

use std::sync::Arc;

use crate::error::ApiError;
use crate::net::api;
use crate::net::http::HttpClient;
use crate::net::transport::Transport;
use crate::net::types::{Identity, LoginPayload, LoginResponse, RegisterPayload};
use crate::state::session::{Session, SessionStore};

pub struct AuthStore<T> {
    http: Arc<HttpClient<T>>,
}

impl<T: Transport> AuthStore<T> {
    #[must_use]
    pub fn new(http: Arc<HttpClient<T>>) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn http(&self) -> &Arc<HttpClient<T>> {
        &self.http
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        self.http.session()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    #[must_use]
    pub fn user(&self) -> Option<Identity> {
        self.session().user()
    }

    /// Restore the persisted session once; later calls are no-ops.
    pub fn init(&self) -> bool {
        self.session().init()
    }

    /// Sign in and install a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for blank credentials (no request is
    /// sent), the request error untouched, or [`ApiError::MalformedResponse`]
    /// when the payload matches no known shape.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, ApiError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation("username and password are required".to_owned()));
        }
        let payload = LoginPayload { username: username.to_owned(), password: password.to_owned() };
        let response = api::login(&self.http, &payload).await?;
        let session = session_from_login(response, username);
        let identity = session.user.clone().unwrap_or_else(|| fallback_identity(username));
        self.session().install(session);
        tracing::info!(username = %identity.username, role = %identity.userrole, "signed in");
        Ok(identity)
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for blank fields, or the request error.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<Identity, ApiError> {
        if [&payload.username, &payload.showname, &payload.password].iter().any(|f| f.trim().is_empty()) {
            return Err(ApiError::Validation("username, showname and password are required".to_owned()));
        }
        let response = api::register(&self.http, payload).await?;
        Ok(response.identity().unwrap_or_else(|| fallback_identity(&payload.username)))
    }

    /// Replace the access token using the refresh token. Joins an in-flight
    /// refresh if one is running.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RefreshFailed`]; the session has been cleared.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.http.refresh_session().await
    }

    /// Best-effort server logout, then an unconditional local clear.
    pub async fn logout(&self) {
        if let Err(e) = api::logout(&self.http).await {
            tracing::warn!(error = %e, "logout endpoint failed; clearing local session anyway");
        }
        self.session().reset();
        tracing::info!("signed out");
    }
}

/// Build the session a login response establishes.
///
/// A JWT response without a nested user gets an identity synthesized from
/// the submitted username, so a successful login is always authenticated.
#[must_use]
pub fn session_from_login(response: LoginResponse, username: &str) -> Session {
    match response {
        LoginResponse::Legacy(legacy) => {
            Session { access_token: String::new(), refresh_token: None, user: Some(Identity::from(legacy)) }
        }
        LoginResponse::Jwt(jwt) => Session {
            access_token: jwt.access_token,
            refresh_token: jwt.refresh_token.filter(|t| !t.is_empty()),
            user: Some(jwt.user.unwrap_or_else(|| fallback_identity(username))),
        },
    }
}

fn fallback_identity(username: &str) -> Identity {
    Identity { id: None, username: username.to_owned(), showname: username.to_owned(), userrole: String::new() }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

//! Composition root wiring session, pipeline, stores and router.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::net::http::HttpClient;
use crate::net::transport::{ReqwestTransport, Transport};
use crate::router::Navigator;
use crate::state::auth::AuthStore;
use crate::state::session::SessionStore;
use crate::state::storage::{FileStorage, SessionStorage};
use crate::state::users::UsersStore;

pub struct App<T> {
    pub http: Arc<HttpClient<T>>,
    pub auth: Arc<AuthStore<T>>,
    pub navigator: Navigator<T>,
}

impl App<ReqwestTransport> {
    /// Build the production app: reqwest transport plus file-backed session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config.base_url, config.timeouts)?;
        Ok(Self::new(transport, FileStorage::new(&config.session_file)))
    }
}

impl<T: Transport> App<T> {
    /// Wire the stores together and restore any persisted session.
    pub fn new(transport: T, storage: impl SessionStorage + 'static) -> Self {
        let session = Arc::new(SessionStore::new(storage));
        let http = Arc::new(HttpClient::new(transport, session));
        let auth = Arc::new(AuthStore::new(http.clone()));
        if auth.init() {
            tracing::debug!("restored persisted session");
        }
        let navigator = Navigator::new(auth.clone());
        Self { http, auth, navigator }
    }

    /// A fresh users store sharing this app's pipeline.
    #[must_use]
    pub fn users(&self) -> UsersStore<T> {
        UsersStore::new(self.http.clone())
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;

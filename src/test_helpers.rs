//! Scripted transport and fixtures shared by unit tests.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::ApiError;
use crate::net::http::HttpClient;
use crate::net::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::net::types::Identity;
use crate::state::session::{Session, SessionStore};
use crate::state::storage::MemoryStorage;

type Handler = dyn Fn(&ApiRequest, Option<&str>) -> Result<ApiResponse, ApiError> + Send + Sync;

/// One request as seen by the transport.
#[derive(Clone, Debug)]
pub struct Sent {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

/// Transport that answers from a closure and records every request.
///
/// Paths registered with `slow_path` yield to the runtime a few times before
/// answering, so concurrent callers get to park behind them.
pub struct MockTransport {
    handler: Box<Handler>,
    sent: Mutex<Vec<Sent>>,
    slow_paths: Vec<String>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest, Option<&str>) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    {
        Self { handler: Box::new(handler), sent: Mutex::new(Vec::new()), slow_paths: Vec::new() }
    }

    #[must_use]
    pub fn slow_path(mut self, path: &str) -> Self {
        self.slow_paths.push(path.to_owned());
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.sent.lock().unwrap().iter().filter(|s| s.path == path).count()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        self.sent.lock().unwrap().push(Sent {
            method: request.method.clone(),
            path: request.path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
            bearer: bearer.map(str::to_owned),
        });
        if self.slow_paths.iter().any(|p| *p == request.path) {
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
        }
        (self.handler)(request, bearer)
    }
}

pub fn json_response(status: u16, value: &Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::new(status, value.to_string()))
}

pub fn alice() -> Identity {
    Identity { id: Some(7), username: "alice".into(), showname: "Alice A".into(), userrole: "admin".into() }
}

/// A signed-in session holding an expired access token.
pub fn stale_session() -> Session {
    Session { access_token: "stale".into(), refresh_token: Some("r1".into()), user: Some(alice()) }
}

pub fn client_with(transport: MockTransport, session: Session) -> Arc<HttpClient<MockTransport>> {
    let store = Arc::new(SessionStore::new(MemoryStorage::new()));
    if session != Session::default() {
        store.install(session);
    }
    Arc::new(HttpClient::new(transport, store))
}

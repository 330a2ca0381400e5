//! Session state: tokens and identity for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by `HttpClient` for every request (bearer token) and by the router
//! guard (`is_authenticated`). Mutated only by the auth actions and by the
//! HTTP client's refresh protocol. Every mutation is written through to the
//! durable slot.
//!
//! TRADE-OFFS
//! ==========
//! The identity is the single authoritative "signed in" signal. Failure paths
//! always clear token and identity together, so the two cannot disagree.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::storage::{SessionStorage, load_json, save_json};
use crate::net::types::Identity;

/// Persisted credential state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<Identity>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

struct SessionInner {
    session: Session,
    initialized: bool,
    /// Set once anything writes the session; a later `init` must not clobber it.
    mutated: bool,
}

pub struct SessionStore {
    inner: Mutex<SessionInner>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            inner: Mutex::new(SessionInner { session: Session::default(), initialized: false, mutated: false }),
            storage: Box::new(storage),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore the session from durable storage. Only the first call reads
    /// the slot; it returns `true` if a stored session was applied.
    pub fn init(&self) -> bool {
        let mut inner = self.lock();
        if inner.initialized {
            return false;
        }
        inner.initialized = true;
        if inner.mutated {
            tracing::debug!("session already mutated; skipping stored session");
            return false;
        }
        match load_json::<Session>(self.storage.as_ref()) {
            Ok(Some(session)) => {
                inner.session = session;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "stored session unreadable; starting signed out");
                false
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().session.clone()
    }

    /// Current access token, `None` when empty.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        let inner = self.lock();
        (!inner.session.access_token.is_empty()).then(|| inner.session.access_token.clone())
    }

    /// Current refresh token, `None` when absent or empty.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.lock().session.refresh_token.clone().filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn user(&self) -> Option<Identity> {
        self.lock().session.user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_authenticated()
    }

    /// Replace the whole session.
    pub fn install(&self, session: Session) {
        self.mutate(|s| *s = session);
    }

    /// Replace only the access token; refresh token and identity stay.
    pub fn set_access_token(&self, token: String) {
        self.mutate(|s| s.access_token = token);
    }

    /// Clear every field back to the signed-out state.
    pub fn reset(&self) {
        self.mutate(|s| *s = Session::default());
    }

    fn mutate(&self, f: impl FnOnce(&mut Session)) {
        let mut inner = self.lock();
        f(&mut inner.session);
        inner.mutated = true;
        // Written under the lock so slot order matches mutation order.
        if let Err(e) = save_json(self.storage.as_ref(), &inner.session) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

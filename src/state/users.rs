//! User-directory state for the users view.
//!
//! DESIGN
//! ======
//! Errors are stored as display strings on the state instead of returned,
//! matching how the view renders them. The last search query is remembered
//! so a create can refresh the visible list when it would appear in it.

use std::sync::Arc;

use crate::error::ApiError;
use crate::net::api;
use crate::net::http::HttpClient;
use crate::net::transport::Transport;
use crate::net::types::{UserCreate, UserRecord};

const CONFLICT: u16 = 409;

pub const MSG_NAMES_REQUIRED: &str = "first and last name are both required";
pub const MSG_USER_EXISTS: &str = "user already exists";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsersState {
    pub list: Vec<UserRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_name_query: String,
}

impl UsersState {
    #[must_use]
    pub fn count(&self) -> usize {
        self.list.len()
    }

    #[must_use]
    pub fn full_names(&self) -> Vec<String> {
        self.list.iter().map(UserRecord::full_name).collect()
    }
}

pub struct UsersStore<T> {
    http: Arc<HttpClient<T>>,
    state: UsersState,
}

impl<T: Transport> UsersStore<T> {
    #[must_use]
    pub fn new(http: Arc<HttpClient<T>>) -> Self {
        Self { http, state: UsersState::default() }
    }

    #[must_use]
    pub fn state(&self) -> &UsersState {
        &self.state
    }

    pub async fn search_by_last_name(&mut self, last_name: &str) {
        self.state.loading = true;
        self.state.error = None;
        self.state.last_name_query = last_name.to_owned();

        match api::list_users_by_last_name(&self.http, last_name).await {
            Ok(list) => self.state.list = list,
            Err(e) => self.state.error = Some(error_message(&e)),
        }
        self.state.loading = false;
    }

    /// Create a user from trimmed names. Blank names never reach the server.
    pub async fn add_user(&mut self, payload: UserCreate) {
        let first_name = payload.first_name.trim();
        let last_name = payload.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            self.state.error = Some(MSG_NAMES_REQUIRED.to_owned());
            return;
        }

        self.state.loading = true;
        self.state.error = None;
        let body = UserCreate { first_name: first_name.to_owned(), last_name: last_name.to_owned() };
        match api::create_user(&self.http, &body).await {
            Ok(created) => {
                tracing::info!(id = created.id, "user created");
                let query = self.state.last_name_query.clone();
                if !query.is_empty() && query == created.last_name {
                    self.search_by_last_name(&query).await;
                } else {
                    self.state.list.insert(0, created);
                }
            }
            Err(e) if e.status() == Some(CONFLICT) => {
                self.state.error = Some(e.detail().unwrap_or(MSG_USER_EXISTS).to_owned());
            }
            Err(e) => self.state.error = Some(error_message(&e)),
        }
        self.state.loading = false;
    }
}

/// Server detail when present, otherwise the error's own message.
fn error_message(e: &ApiError) -> String {
    e.detail().map_or_else(|| e.to_string(), str::to_owned)
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;

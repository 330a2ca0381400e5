//! Shared request pipeline with bearer auth and single-flight refresh.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every API wrapper sends through `HttpClient::send`. The client attaches
//! the session's access token, and on a 401 either replays (someone already
//! refreshed), refreshes through the `RefreshGate`, or forces a logout
//! when no refresh credential exists. Refresh and logout calls themselves
//! go through `send_direct`, which never intercepts.
//!
//! ERROR HANDLING
//! ==============
//! Callers never see a raw 401 from an intercepted request. They get the
//! replayed response, `RefreshFailed` (session cleared), or `Unauthorized`
//! (no refresh token, or the replay was rejected too).

use std::sync::Arc;

use super::api;
use super::refresh::{Admission, RefreshGate, RefreshState};
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::ApiError;
use crate::net::types::error_detail;
use crate::state::session::SessionStore;

const UNAUTHORIZED: u16 = 401;

pub struct HttpClient<T> {
    transport: T,
    session: Arc<SessionStore>,
    gate: RefreshGate,
}

impl<T: Transport> HttpClient<T> {
    #[must_use]
    pub fn new(transport: T, session: Arc<SessionStore>) -> Self {
        Self { transport, session, gate: RefreshGate::new() }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn refresh_state(&self) -> RefreshState {
        self.gate.state()
    }

    /// Send one request through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when no response arrives, and the
    /// refresh-protocol errors described in the module docs. Non-401 error
    /// statuses are returned as `Ok` responses for the caller to map.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let (response, sent_token) = self.dispatch(&request).await?;
        if response.status != UNAUTHORIZED || !request.intercept_unauthorized {
            return Ok(response);
        }

        // Someone refreshed while this request was in flight.
        if let Some(current) = self.session.access_token() {
            if sent_token.as_deref() != Some(current.as_str()) {
                tracing::debug!(request_id = %request.id, "token rotated in flight; replaying");
                return self.replay(&request).await;
            }
        }

        if self.session.refresh_token().is_none() {
            tracing::warn!(request_id = %request.id, path = %request.path, "401 without refresh token; forcing logout");
            self.force_logout().await;
            return Err(ApiError::Unauthorized(non_empty_detail(&response.body)));
        }

        self.refresh_gated(sent_token.as_deref()).await?;
        self.replay(&request).await
    }

    /// Send without 401 interception. The refresh protocol's own calls go
    /// through here so they can never re-enter it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when no response arrives.
    pub async fn send_direct(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let (response, _) = self.dispatch(&request).await?;
        Ok(response)
    }

    /// Refresh the access token, joining an in-flight refresh if one is
    /// running. A failed refresh clears the session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RefreshFailed`] if the refresh endpoint failed or
    /// no refresh token is available.
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        self.refresh_gated(None).await
    }

    /// `rejected` is the token a 401'd request carried. A leader that finds
    /// the session already holding a different token settles without
    /// calling the refresh endpoint.
    async fn refresh_gated(&self, rejected: Option<&str>) -> Result<(), ApiError> {
        match self.gate.admit() {
            Admission::Leader(guard) => {
                if let Some(rejected) = rejected {
                    if self.session.access_token().as_deref() != Some(rejected) {
                        let resolved = guard.settle(Ok(()));
                        tracing::debug!(replays = resolved, "token already rotated; skipping refresh");
                        return Ok(());
                    }
                }
                tracing::info!("refreshing access token");
                match self.perform_refresh().await {
                    Ok(()) => {
                        let resolved = guard.settle(Ok(()));
                        tracing::info!(replays = resolved, "access token refreshed");
                        Ok(())
                    }
                    Err(e) => {
                        let message = e.to_string();
                        tracing::warn!(error = %message, "refresh failed; forcing logout");
                        self.force_logout().await;
                        guard.settle(Err(message.clone()));
                        Err(ApiError::RefreshFailed(message))
                    }
                }
            }
            Admission::Follower(follower) => follower.wait().await.map_err(ApiError::RefreshFailed),
        }
    }

    async fn perform_refresh(&self) -> Result<(), ApiError> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or_else(|| ApiError::Unauthorized("no refresh token".to_owned()))?;
        let resp = api::refresh(self, &refresh_token).await?;
        self.session.set_access_token(resp.access_token);
        Ok(())
    }

    async fn force_logout(&self) {
        if let Err(e) = api::logout(self).await {
            tracing::debug!(error = %e, "logout call failed during forced logout");
        }
        self.session.reset();
    }

    async fn replay(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let (response, _) = self.dispatch(request).await?;
        if response.status == UNAUTHORIZED {
            return Err(ApiError::Unauthorized(non_empty_detail(&response.body)));
        }
        Ok(response)
    }

    /// Send with whatever token is current; returns the token that was used.
    async fn dispatch(&self, request: &ApiRequest) -> Result<(ApiResponse, Option<String>), ApiError> {
        let token = self.session.access_token();
        tracing::debug!(request_id = %request.id, method = %request.method, path = %request.path, "sending request");
        let response = self.transport.send(request, token.as_deref()).await?;
        Ok((response, token))
    }
}

fn non_empty_detail(body: &str) -> String {
    let detail = error_detail(body);
    if detail.is_empty() { "credentials rejected".to_owned() } else { detail }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

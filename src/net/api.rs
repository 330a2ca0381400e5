//! REST API wrappers for the back office endpoints.
//!
//! Each function translates a typed input into an `ApiRequest` and decodes
//! the payload. No retry, caching or validation beyond the transport.
//!
//! The auth endpoints opt out of 401 interception: a rejected login or a
//! rejected refresh must surface as-is instead of triggering a refresh.
//! Refresh and logout run inside the refresh protocol itself, so they go
//! through `send_direct` and never reach the interceptor.

use serde_json::Value;

use super::http::HttpClient;
use super::transport::{ApiRequest, Transport};
use super::types::{LoginPayload, LoginResponse, RefreshPayload, RefreshResponse, RegisterPayload, UserCreate, UserRecord};
use crate::error::ApiError;

pub const LOGIN_PATH: &str = "/login/auth";
pub const REGISTER_PATH: &str = "/login/create";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const USERS_PATH: &str = "/users";

/// `POST /login/auth`.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for a rejected login and
/// [`ApiError::MalformedResponse`] for an unrecognized payload shape.
pub async fn login<T: Transport>(http: &HttpClient<T>, payload: &LoginPayload) -> Result<LoginResponse, ApiError> {
    let req = ApiRequest::post(LOGIN_PATH).json(payload)?.without_refresh();
    let raw: Value = http.send(req).await?.json()?;
    LoginResponse::classify(raw)
}

/// `POST /login/create`.
///
/// # Errors
///
/// Returns [`ApiError::Status`] (409 when the username is taken).
pub async fn register<T: Transport>(http: &HttpClient<T>, payload: &RegisterPayload) -> Result<LoginResponse, ApiError> {
    let req = ApiRequest::post(REGISTER_PATH).json(payload)?.without_refresh();
    let raw: Value = http.send(req).await?.json()?;
    LoginResponse::classify(raw)
}

/// `POST /auth/refresh`.
///
/// # Errors
///
/// Returns [`ApiError::Status`] when the refresh token is rejected.
pub async fn refresh<T: Transport>(http: &HttpClient<T>, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
    let payload = RefreshPayload { refresh_token: refresh_token.to_owned() };
    let req = ApiRequest::post(REFRESH_PATH).json(&payload)?.without_refresh();
    http.send_direct(req).await?.json()
}

/// `POST /auth/logout`. The response body is ignored.
///
/// # Errors
///
/// Returns the transport or status error; callers usually discard it.
pub async fn logout<T: Transport>(http: &HttpClient<T>) -> Result<(), ApiError> {
    let req = ApiRequest::post(LOGOUT_PATH).without_refresh();
    http.send_direct(req).await?.error_for_status()?;
    Ok(())
}

/// `POST /users`.
///
/// # Errors
///
/// Returns [`ApiError::Status`] with status 409 when the user already exists.
pub async fn create_user<T: Transport>(http: &HttpClient<T>, body: &UserCreate) -> Result<UserRecord, ApiError> {
    let req = ApiRequest::post(USERS_PATH).json(body)?;
    http.send(req).await?.json()
}

/// `GET /users?last_name=...`, in server order.
///
/// # Errors
///
/// Returns the transport or status error.
pub async fn list_users_by_last_name<T: Transport>(
    http: &HttpClient<T>,
    last_name: &str,
) -> Result<Vec<UserRecord>, ApiError> {
    let req = ApiRequest::get(USERS_PATH).query("last_name", last_name);
    http.send(req).await?.json()
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

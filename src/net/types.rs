//! Wire types for the back office REST API.
//!
//! DESIGN
//! ======
//! The login endpoint has two historical response shapes that carry no
//! version field. `LoginResponse` is the sum type over both, and
//! `LoginResponse::classify` is the only place that probes raw fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

// =============================================================================
// IDENTITY
// =============================================================================

/// The signed-in user's identity, normalized from either login shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    pub showname: String,
    pub userrole: String,
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterPayload {
    pub username: String,
    pub showname: String,
    pub userrole: String,
    pub password: String,
}

/// Flat identity with no token. Sessions are tracked server-side.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LegacyLoginResponse {
    pub username: String,
    pub showname: String,
    pub userrole: String,
    #[serde(default)]
    pub id: Option<i64>,
}

/// Token-bearing response with an optional nested identity.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct JwtLoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<Identity>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginResponse {
    Legacy(LegacyLoginResponse),
    Jwt(JwtLoginResponse),
}

/// A payload is JWT-shaped when it carries `access_token`.
#[must_use]
pub fn is_jwt_payload(value: &Value) -> bool {
    value.get("access_token").is_some()
}

/// A payload is legacy-shaped when it carries `username` and `userrole`
/// and no `access_token`.
#[must_use]
pub fn is_legacy_payload(value: &Value) -> bool {
    !is_jwt_payload(value) && value.get("username").is_some() && value.get("userrole").is_some()
}

impl LoginResponse {
    /// Classify a raw login payload into one of the known shapes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] when the payload matches
    /// neither shape or a recognized shape fails to decode.
    pub fn classify(value: Value) -> Result<Self, ApiError> {
        if is_jwt_payload(&value) {
            let resp = serde_json::from_value(value)
                .map_err(|e| ApiError::MalformedResponse(format!("jwt login response: {e}")))?;
            return Ok(Self::Jwt(resp));
        }
        if is_legacy_payload(&value) {
            let resp = serde_json::from_value(value)
                .map_err(|e| ApiError::MalformedResponse(format!("legacy login response: {e}")))?;
            return Ok(Self::Legacy(resp));
        }
        Err(ApiError::MalformedResponse(
            "login response has neither access_token nor username/userrole".to_owned(),
        ))
    }

    /// Identity carried by the response, if the shape includes one.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Legacy(r) => Some(Identity::from(r.clone())),
            Self::Jwt(r) => r.user.clone(),
        }
    }
}

impl From<LegacyLoginResponse> for Identity {
    fn from(r: LegacyLoginResponse) -> Self {
        Self { id: r.id, username: r.username, showname: r.showname, userrole: r.userrole }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// =============================================================================
// USERS
// =============================================================================

/// A user record as returned by `/users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl UserRecord {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreate {
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body shape used by the server (`{"detail": ...}`).
///
/// `detail` is a string for handled errors and a list of objects for
/// request validation failures.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Value,
}

/// Extract a human-readable detail string from an error response body.
#[must_use]
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { detail: Value::String(s) }) => s,
        Ok(ErrorBody { detail: Value::Null }) => String::new(),
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

//! Client error type shared by the transport, API wrappers and stores.
//!
//! ERROR HANDLING
//! ==============
//! `ApiError` is `Clone` so a single refresh failure can be handed to every
//! request that was parked behind it. Authorization failures never reach
//! callers raw: the HTTP client either resolves them through a refresh or
//! converts them into `RefreshFailed` / `Unauthorized`.

/// Errors produced by API requests and session actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("transport failure: {0}")]
    Transport(String),

    /// A 401 that could not be resolved by a refresh.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The refresh endpoint itself failed; the session has been cleared.
    #[error("session refresh failed: {0}")]
    RefreshFailed(String),

    /// The response body did not match any known shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Client-side input check failed; no request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Unauthorized(_) => "E_UNAUTHORIZED",
            Self::RefreshFailed(_) => "E_REFRESH_FAILED",
            Self::MalformedResponse(_) => "E_MALFORMED_RESPONSE",
            Self::Validation(_) => "E_VALIDATION",
            Self::Status { .. } => "E_STATUS",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }

    /// HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    /// Server-provided detail string, if the server sent one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

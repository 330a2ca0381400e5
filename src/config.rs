//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SESSION_FILE: &str = ".erpdesk/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `ERP_API_BASE_URL`: default `http://127.0.0.1:8000`
    /// - `ERP_SESSION_FILE`: default `.erpdesk/session.json`
    /// - `ERP_REQUEST_TIMEOUT_SECS`: default 10
    /// - `ERP_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if a string variable is set but blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(None, None)
    }

    /// Like [`ClientConfig::from_env`], but explicit values replace the
    /// matching variables before anything is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if the winning value is blank.
    pub fn from_env_with(base_url: Option<&str>, session_file: Option<&str>) -> Result<Self, ConfigError> {
        let base_url = base_url.map_or_else(
            || std::env::var("ERP_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            str::to_owned,
        );
        let session_file = session_file.map_or_else(
            || std::env::var("ERP_SESSION_FILE").unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string()),
            str::to_owned,
        );
        let timeouts = Timeouts {
            request_secs: env_parse_u64("ERP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("ERP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self::new(&base_url, &session_file, timeouts)
    }

    /// Build config from explicit values, normalizing the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] for a blank base URL or session path.
    pub fn new(base_url: &str, session_file: &str, timeouts: Timeouts) -> Result<Self, ConfigError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::Empty { var: "ERP_API_BASE_URL" });
        }
        if session_file.trim().is_empty() {
            return Err(ConfigError::Empty { var: "ERP_SESSION_FILE" });
        }
        Ok(Self { base_url, session_file: PathBuf::from(session_file), timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

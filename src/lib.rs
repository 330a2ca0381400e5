//! Native client for the ERP back office API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` is the composition root: it owns the session store, the shared
//! HTTP pipeline, the auth actions and the navigator. The CLI builds one
//! from `ClientConfig`; tests build one over a scripted transport.

pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod router;
pub mod state;

#[cfg(test)]
pub mod test_helpers;

pub use app::App;
pub use config::ClientConfig;
pub use error::ApiError;

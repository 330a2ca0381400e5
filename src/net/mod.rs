//! Networking: transport seam, refresh gate, request pipeline and endpoint
//! wrappers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` sends raw requests, `refresh` coordinates single-flight token
//! refresh, `http` is the pipeline every call goes through, `api` holds the
//! typed endpoint wrappers and `types` the wire schema.

pub mod api;
pub mod http;
pub mod refresh;
pub mod transport;
pub mod types;

//! Client-side state: persisted session, auth actions and the users list.
//!
//! DESIGN
//! ======
//! `session` owns the credential fields and their durable slot (`storage`).
//! `auth` and `users` are action layers that sequence API calls against it.

pub mod auth;
pub mod session;
pub mod storage;
pub mod users;

//! Execsuite client library - session management and API access for the
//! AI Executive Team application.
//!
//! The crate is organized around a single [`SessionClient`](api::SessionClient)
//! that owns the outbound HTTP policy: bearer-token injection, bounded
//! retry with exponential backoff for the identity-check endpoint, and a
//! debounced redirect to the sign-in screen when the session is rejected.
//!
//! Session state (token, cached profile, pending return path) lives behind
//! the [`SessionStore`](auth::SessionStore) trait so embedding UIs and tests
//! can supply their own storage.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiError, SessionClient};
pub use auth::{FileStore, MemoryStore, Navigator, SessionStore};
pub use config::Config;

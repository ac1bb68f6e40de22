//! REST API client module for the AI Executive Team backend.
//!
//! This module provides the `SessionClient` for communicating with the
//! backend API: authentication, users, documents, conversations, and
//! AI executives.
//!
//! The API uses JWT bearer token authentication obtained through the
//! form-encoded token login endpoint; the client re-reads the token from
//! the session store on every attempt.

pub mod client;
pub mod error;

pub use client::{Payload, RequestOptions, SessionClient};
pub use error::ApiError;

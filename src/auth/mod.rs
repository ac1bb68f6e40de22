//! Authentication module: session state storage and redirect handling.
//!
//! This module provides:
//! - `SessionStore`: storage for the bearer token, cached profile, and
//!   pending return path, with in-memory and file-backed implementations
//! - `Navigator` / `RedirectGuard`: the seam through which the client
//!   forces navigation to the sign-in screen, debounced by a cooldown
//!
//! The token and cached profile are cleared together whenever the server
//! rejects the session.

pub mod guard;
pub mod store;

pub use guard::{Navigator, RedirectGuard, StaticNavigator};
pub use store::{FileStore, MemoryStore, SessionStore, PROFILE_KEY, TOKEN_KEY};

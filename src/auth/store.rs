//! Session state storage.
//!
//! The client keeps three pieces of session state: the bearer token, a
//! cached copy of the signed-in user's profile, and the path to return to
//! after a forced re-authentication. Storage sits behind the
//! [`SessionStore`] trait so embedding UIs and tests can supply their own
//! backing.
//!
//! Accessors are infallible on purpose: storage failures are logged and
//! degrade to "no value", the same way browser storage behaves. A request
//! must never fail because the token file was momentarily unreadable.

use std::path::PathBuf;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::models::UserProfile;

/// Storage key (and file name) for the bearer token
pub const TOKEN_KEY: &str = "access_token";

/// Storage key (and file name) for the cached user profile
pub const PROFILE_KEY: &str = "user_profile";

pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn clear_token(&self);

    fn profile(&self) -> Option<UserProfile>;
    fn set_profile(&self, profile: &UserProfile);
    fn clear_profile(&self);

    /// Drop the token and the cached profile together. A rejected token
    /// means the cached identity is no longer trustworthy either.
    fn clear_session(&self);

    fn return_path(&self) -> Option<String>;
    fn set_return_path(&self, path: &str);
    /// Read and clear the pending return path in one step; it is consumed
    /// exactly once, after a successful sign-in.
    fn take_return_path(&self) -> Option<String>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store for tests and UIs that manage persistence themselves.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    token: Option<String>,
    profile: Option<UserProfile>,
    return_path: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn token(&self) -> Option<String> {
        self.state.lock().token.clone()
    }

    fn set_token(&self, token: &str) {
        self.state.lock().token = Some(token.to_string());
    }

    fn clear_token(&self) {
        self.state.lock().token = None;
    }

    fn profile(&self) -> Option<UserProfile> {
        self.state.lock().profile.clone()
    }

    fn set_profile(&self, profile: &UserProfile) {
        self.state.lock().profile = Some(profile.clone());
    }

    fn clear_profile(&self) {
        self.state.lock().profile = None;
    }

    fn clear_session(&self) {
        let mut state = self.state.lock();
        state.token = None;
        state.profile = None;
    }

    fn return_path(&self) -> Option<String> {
        self.state.lock().return_path.clone()
    }

    fn set_return_path(&self, path: &str) {
        self.state.lock().return_path = Some(path.to_string());
    }

    fn take_return_path(&self) -> Option<String> {
        self.state.lock().return_path.take()
    }
}

// ============================================================================
// FileStore
// ============================================================================

/// Store persisting the token and profile as JSON files in a directory.
///
/// The return path is deliberately NOT persisted: it only makes sense
/// within one run of the application, like session-scoped browser storage.
pub struct FileStore {
    dir: PathBuf,
    // Serializes file access so clear_session removes both keys before any
    // concurrent reader sees a half-cleared session.
    fs_lock: Mutex<()>,
    return_path: Mutex<Option<String>>,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            fs_lock: Mutex::new(()),
            return_path: Mutex::new(None),
        })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.key_path(key);
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session state");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Failed to parse session state");
                None
            }
        }
    }

    fn write_key<T: Serialize>(&self, key: &str, value: &T) {
        let path = self.key_path(key);
        let contents = match serde_json::to_string_pretty(value) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize session state");
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, contents) {
            warn!(key, error = %e, "Failed to write session state");
        }
    }

    fn remove_key(&self, key: &str) {
        let path = self.key_path(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(key, error = %e, "Failed to remove session state");
            }
        }
    }
}

impl SessionStore for FileStore {
    fn token(&self) -> Option<String> {
        let _guard = self.fs_lock.lock();
        self.read_key::<String>(TOKEN_KEY)
    }

    fn set_token(&self, token: &str) {
        let _guard = self.fs_lock.lock();
        self.write_key(TOKEN_KEY, &token);
    }

    fn clear_token(&self) {
        let _guard = self.fs_lock.lock();
        self.remove_key(TOKEN_KEY);
    }

    fn profile(&self) -> Option<UserProfile> {
        let _guard = self.fs_lock.lock();
        self.read_key(PROFILE_KEY)
    }

    fn set_profile(&self, profile: &UserProfile) {
        let _guard = self.fs_lock.lock();
        self.write_key(PROFILE_KEY, profile);
    }

    fn clear_profile(&self) {
        let _guard = self.fs_lock.lock();
        self.remove_key(PROFILE_KEY);
    }

    fn clear_session(&self) {
        let _guard = self.fs_lock.lock();
        self.remove_key(TOKEN_KEY);
        self.remove_key(PROFILE_KEY);
    }

    fn return_path(&self) -> Option<String> {
        self.return_path.lock().clone()
    }

    fn set_return_path(&self, path: &str) {
        *self.return_path.lock() = Some(path.to_string());
    }

    fn take_return_path(&self) -> Option<String> {
        self.return_path.lock().take()
    }
}

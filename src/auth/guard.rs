//! Redirect guard and navigation seam.
//!
//! When the server rejects the session, the client may force the user back
//! to the sign-in screen. What "navigate" means depends on the embedding
//! (a webview swaps location, a TUI swaps screens), so navigation sits
//! behind the [`Navigator`] trait. The [`RedirectGuard`] debounces those
//! forced navigations: several in-flight requests failing with 401 at the
//! same moment must produce at most one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::info;

/// Where the user currently is, whether they are looking, and how to move
/// them. Implemented by the embedding UI layer.
pub trait Navigator: Send + Sync {
    /// Current path plus query string, e.g. `/documents/42?page=2`.
    fn current_path(&self) -> String;

    /// Whether the application is in the foreground. A forced navigation
    /// while the user is away would greet them with a surprise login
    /// screen on return.
    fn is_visible(&self) -> bool;

    /// Perform the forced navigation.
    fn navigate(&self, target: &str);
}

// ============================================================================
// StaticNavigator
// ============================================================================

/// A [`Navigator`] backed by plain shared state.
///
/// Used by the CLI (which has no real navigation) and by tests, which
/// inspect [`navigations`](StaticNavigator::navigations) to assert what the
/// client tried to do.
pub struct StaticNavigator {
    path: Mutex<String>,
    visible: AtomicBool,
    navigations: Mutex<Vec<String>>,
}

impl Default for StaticNavigator {
    fn default() -> Self {
        Self {
            path: Mutex::new("/".to_string()),
            visible: AtomicBool::new(true),
            navigations: Mutex::new(Vec::new()),
        }
    }
}

impl StaticNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current_path(&self, path: &str) {
        *self.path.lock() = path.to_string();
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    /// Every target passed to [`Navigator::navigate`], oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }
}

impl Navigator for StaticNavigator {
    fn current_path(&self) -> String {
        self.path.lock().clone()
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn navigate(&self, target: &str) {
        info!(to = target, "Navigation requested");
        self.navigations.lock().push(target.to_string());
    }
}

// ============================================================================
// RedirectGuard
// ============================================================================

/// Debounces forced navigations: at most one per cooldown window.
pub struct RedirectGuard {
    cooldown: Duration,
    last: Mutex<Option<Instant>>,
}

impl RedirectGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: Mutex::new(None),
        }
    }

    /// Returns true (and records the navigation) when the cooldown window
    /// since the last forced navigation has elapsed. The timestamp is only
    /// advanced on success, so suppressed attempts don't extend the window.
    pub fn try_acquire(&self) -> bool {
        let mut last = self.last.lock();
        let allowed = last.map_or(true, |t| t.elapsed() >= self.cooldown);
        if allowed {
            *last = Some(Instant::now());
        }
        allowed
    }

    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_allows_first_then_suppresses() {
        let guard = RedirectGuard::new(Duration::from_secs(3));
        assert!(guard.try_acquire());
        assert!(!guard.try_acquire());
    }

    #[test]
    fn test_guard_reset_reopens_window() {
        let guard = RedirectGuard::new(Duration::from_secs(3));
        assert!(guard.try_acquire());
        guard.reset();
        assert!(guard.try_acquire());
    }

    #[test]
    fn test_zero_cooldown_never_suppresses() {
        let guard = RedirectGuard::new(Duration::ZERO);
        assert!(guard.try_acquire());
        assert!(guard.try_acquire());
    }

    #[test]
    fn test_static_navigator_records_targets() {
        let nav = StaticNavigator::new();
        nav.set_current_path("/documents/42");
        assert_eq!(nav.current_path(), "/documents/42");
        assert!(nav.is_visible());

        nav.navigate("/login?redirect=%2Fdocuments%2F42");
        nav.set_visible(false);
        assert!(!nav.is_visible());
        assert_eq!(nav.navigations(), vec!["/login?redirect=%2Fdocuments%2F42"]);
    }
}

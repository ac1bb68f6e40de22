//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the API
//! base address plus every policy threshold the session client applies
//! (timeout, retry backoff, redirect cooldown). The thresholds are
//! parameters rather than constants so deployments can tune them without a
//! rebuild.
//!
//! Configuration is stored at `~/.config/execsuite/config.json`. The
//! `EXECSUITE_API_BASE` environment variable overrides the base address.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "execsuite";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base address
pub const BASE_URL_ENV: &str = "EXECSUITE_API_BASE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API base address including the version prefix, no trailing slash.
    /// Request paths are appended verbatim.
    pub base_url: String,
    /// Default request timeout in seconds.
    /// 15s covers slow document-processing responses while failing fast
    /// enough that a stuck call doesn't look like a hang.
    pub timeout_secs: u64,
    pub retry: RetryConfig,
    pub redirect: RedirectConfig,
    /// Treat the session as still valid when the identity probe fails with
    /// anything other than a 401 (network error, timeout). Optimistic so a
    /// flaky connection doesn't sign the user out.
    pub keep_session_on_network_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt, so 3 attempts total.
    pub max_retries: u32,
    /// First backoff delay; doubles on each subsequent retry.
    pub initial_backoff_ms: u64,
    /// Paths eligible for retry. Only idempotent, session-critical
    /// endpoints belong here.
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Minimum gap between forced navigations to the sign-in screen.
    /// Absorbs bursts of 401s when several background polls fail at once.
    pub cooldown_ms: u64,
    /// Methods whose failures never force navigation. GET failures are
    /// passive data refreshes; yanking the user away for one is hostile.
    pub exempt_methods: Vec<String>,
    /// Path of the sign-in screen.
    pub login_screen: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout_secs: 15,
            retry: RetryConfig::default(),
            redirect: RedirectConfig::default(),
            keep_session_on_network_error: true,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 1000,
            endpoints: vec!["/users/me".to_string()],
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 3000,
            exempt_methods: vec!["GET".to_string()],
            login_screen: "/login".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            config.base_url = base;
        }
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Trim trailing slashes from the base address. Paths are appended
    /// verbatim, so a trailing slash here would produce double slashes on
    /// every request.
    pub(crate) fn normalize(&mut self) {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.initial_backoff_ms, 1000);
        assert_eq!(config.retry.endpoints, vec!["/users/me"]);
        assert_eq!(config.redirect.cooldown_ms, 3000);
        assert_eq!(config.redirect.exempt_methods, vec!["GET"]);
        assert_eq!(config.redirect.login_screen, "/login");
        assert!(config.keep_session_on_network_error);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"base_url": "https://api.example.com/api/v1"}"#)
                .expect("partial config should parse");
        assert_eq!(config.base_url, "https://api.example.com/api/v1");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.redirect.cooldown_ms, 3000);
    }

    #[test]
    fn test_normalize_trims_trailing_slashes() {
        let mut config = Config {
            base_url: "https://api.example.com/api/v1//".to_string(),
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.base_url, "https://api.example.com/api/v1");
    }
}

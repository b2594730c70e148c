use crate::address::ban::BAN_BASE_URL;
use crate::publish::RestBackendConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, read from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ban_url: String,
    pub search_limit: usize,
    pub debounce_ms: u64,
    pub backend_url: String,
    pub backend_key: String,
    pub access_token: Option<String>,
    pub bucket: String,
    pub owner_id: Option<String>,
    pub state_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ban_url: BAN_BASE_URL.to_string(),
            search_limit: 8,
            debounce_ms: 250,
            backend_url: String::new(),
            backend_key: String::new(),
            access_token: None,
            bucket: "properties".to_string(),
            owner_id: None,
            state_dir: default_state_dir(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("listing-wizard")
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset or unparsable values keep their default
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            ban_url: get("LISTING_BAN_URL").unwrap_or(defaults.ban_url),
            search_limit: get("LISTING_SEARCH_LIMIT")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.search_limit),
            debounce_ms: get("LISTING_DEBOUNCE_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.debounce_ms),
            backend_url: get("SUPABASE_URL").unwrap_or(defaults.backend_url),
            backend_key: get("SUPABASE_ANON_KEY").unwrap_or(defaults.backend_key),
            access_token: get("SUPABASE_ACCESS_TOKEN"),
            bucket: get("LISTING_BUCKET").unwrap_or(defaults.bucket),
            owner_id: get("LISTING_OWNER_ID"),
            state_dir: get("LISTING_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_dir),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Both the backend URL and its public key are set
    pub fn is_backend_configured(&self) -> bool {
        !self.backend_url.is_empty() && !self.backend_key.is_empty()
    }

    pub fn backend(&self) -> RestBackendConfig {
        RestBackendConfig {
            base_url: self.backend_url.clone(),
            api_key: self.backend_key.clone(),
            access_token: self.access_token.clone(),
            bucket: self.bucket.clone(),
        }
    }
}

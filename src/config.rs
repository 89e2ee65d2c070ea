// Client configuration
// Defaults, then <config_dir>/socialnetwork/config.json, then environment variables.
// Command-line flags are applied on top by the binary.

use anyhow::{anyhow, Result};
use log::{info, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poll::PollConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const ENV_BASE_URL: &str = "SOCIALNETWORK_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "SOCIALNETWORK_POLL_INTERVAL_MS";

const APP_DIR: &str = "socialnetwork";
const CONFIG_FILE: &str = "config.json";

static CONFIG_DIR_OVERRIDE: OnceCell<PathBuf> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub discard_stale_responses: bool,
    pub remember_me: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: 1000,
            discard_stale_responses: true,
            remember_me: true,
        }
    }
}

impl ClientConfig {
    /// Load the config file from the config directory (if any) and apply env overrides
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join(CONFIG_FILE);
        let mut config = Self::load_from(&path)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read one config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from an environment lookup (injected so tests don't touch the process env)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => self.poll_interval_ms = ms,
                Err(e) => warn!("Ignoring {}={:?}: {}", ENV_POLL_INTERVAL_MS, raw, e),
            }
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            discard_stale: self.discard_stale_responses,
        }
    }
}

/// Redirect the config directory (config and saved credentials); first call wins
pub fn set_config_dir_override(dir: PathBuf) {
    if CONFIG_DIR_OVERRIDE.set(dir).is_err() {
        warn!("Config directory override already set, ignoring");
    }
}

/// Directory holding config.json and credentials.json, created if missing
pub fn config_dir() -> Result<PathBuf> {
    let dir = match CONFIG_DIR_OVERRIDE.get() {
        Some(dir) => dir.clone(),
        None => dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?
            .join(APP_DIR),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

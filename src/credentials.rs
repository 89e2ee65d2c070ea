use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;

use socialnetwork::config::config_dir;

// Saved login for the backend: which server, which user, and the session token the
// server handed out. The password itself is never written to disk.

#[derive(Serialize, Deserialize, Clone)]
pub struct Credentials {
    pub server: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Credentials {
    pub fn new(server: &str, username: &str, token: &str) -> Self {
        Credentials {
            server: server.to_string(),
            username: username.to_string(),
            token: Some(BASE64.encode(token)),
        }
    }

    pub fn get_token(&self) -> Option<String> {
        let encoded = self.token.as_ref()?;
        match BASE64.decode(encoded).map(String::from_utf8) {
            Ok(Ok(token)) => Some(token),
            _ => {
                warn!("Saved token for {} is unreadable, ignoring it", self.username);
                None
            }
        }
    }
}

fn credentials_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("credentials.json"))
}

pub fn save_credentials(credentials: &Credentials) -> Result<()> {
    let file = File::create(credentials_path()?)?;
    serde_json::to_writer_pretty(file, credentials)?;

    info!("Credentials saved for {}", credentials.username);
    Ok(())
}

pub fn load_credentials() -> Result<Option<Credentials>> {
    let path = credentials_path()?;
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)?;
    let credentials: Credentials = serde_json::from_str(&contents)?;
    info!("Loaded credentials for {} from {}", credentials.username, path.display());

    Ok(Some(credentials))
}

/// Forget a saved session (e.g. after the server rejected its token)
pub fn clear_credentials() -> Result<()> {
    let path = credentials_path()?;
    if path.exists() {
        fs::remove_file(&path)?;
        info!("Removed saved credentials at {}", path.display());
    }
    Ok(())
}

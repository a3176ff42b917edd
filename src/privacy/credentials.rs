//! Reading the cached Gemini OAuth credentials.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Overrides the Gemini config directory (defaults to `~/.gemini`).
pub const GEMINI_DIR_ENV: &str = "GEMINI_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub access_token: String,
    /// Expiry in epoch milliseconds, as written by the Gemini CLI.
    pub expires_at: Option<i64>,
}

impl OAuthCredentials {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now_millis)
    }
}

/// Reads Gemini credentials from `~/.gemini/oauth_creds.json`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_gemini_credentials() -> Result<Option<OAuthCredentials>> {
    read_credentials_file(&gemini_credentials_path()?)
}

fn read_credentials_file(path: &Path) -> Result<Option<OAuthCredentials>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).context("Failed to read Gemini credentials")?;
    let json: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse Gemini credentials")?;

    let access_token = json["access_token"]
        .as_str()
        .filter(|token| !token.is_empty())
        .context("Missing access_token")?
        .to_string();
    let expires_at = json["expiry_date"].as_i64();

    Ok(Some(OAuthCredentials {
        access_token,
        expires_at,
    }))
}

fn gemini_credentials_path() -> Result<PathBuf> {
    let config_dir = std::env::var(GEMINI_DIR_ENV)
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|h| h.join(".gemini")))
        .context("Cannot determine Gemini config directory")?;
    Ok(config_dir.join("oauth_creds.json"))
}

//! Home-based storage paths for consent-sync.
//!
//! Everything lives under `~/.consent-sync/`:
//! - `config.yaml` - Optional user configuration
//! - `logs/consent-sync.log` - Tracing output

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// The name of the consent-sync directory.
const CONSENT_SYNC_DIR: &str = ".consent-sync";

/// Environment variable that relocates the home directory (used by tests).
pub const HOME_OVERRIDE_ENV: &str = "CONSENT_SYNC_HOME";

/// Returns the home-based consent-sync directory: `~/.consent-sync/`
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn consent_sync_home_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(HOME_OVERRIDE_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .context("Could not determine home directory")?
            .join(CONSENT_SYNC_DIR),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the default config path: `~/.consent-sync/config.yaml`
pub fn config_path() -> Result<PathBuf> {
    Ok(consent_sync_home_dir()?.join("config.yaml"))
}

/// Returns the logs directory: `~/.consent-sync/logs/`
///
/// Creates the directory if it doesn't exist.
pub fn logs_dir() -> Result<PathBuf> {
    let dir = consent_sync_home_dir()?.join("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the tracing log path: `~/.consent-sync/logs/consent-sync.log`
pub fn log_file_path() -> Result<PathBuf> {
    Ok(logs_dir()?.join("consent-sync.log"))
}

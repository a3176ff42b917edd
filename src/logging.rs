//! Tracing setup.
//!
//! The terminal belongs to the TUI, so all diagnostics go to
//! `~/.consent-sync/logs/consent-sync.log`.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber writing to the default log file.
///
/// `RUST_LOG` takes precedence over `level` when present.
pub fn init(level: &str) -> Result<PathBuf> {
    let path = crate::paths::log_file_path()?;
    init_with_path(level, &path)?;
    Ok(path)
}

fn init_with_path(level: &str, path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level: {}", level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Overrides `endpoint` when set.
pub const ENDPOINT_ENV: &str = "CODE_ASSIST_ENDPOINT";
/// Overrides `project_id` when set.
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// User configuration for the Code Assist connection.
/// All fields have defaults so an empty or missing file is valid.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the Code Assist service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API version segment used in method URLs.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Cloud project the consent setting is scoped to.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Global per-request timeout applied by the HTTP transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            project_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://cloudcode-pa.googleapis.com".to_string()
}

fn default_api_version() -> String {
    "v1internal".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Loads the config from `path`, falling back to defaults when the file
    /// does not exist, then applies environment overrides.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        // serde_yaml rejects an empty document for a struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(endpoint) = non_empty_env(ENDPOINT_ENV) {
            self.endpoint = endpoint;
        }
        if let Some(project) = non_empty_env(PROJECT_ENV) {
            self.project_id = Some(project);
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            anyhow::bail!("endpoint must not be empty");
        }
        if self.api_version.trim().is_empty() {
            anyhow::bail!("api_version must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the URL for a Code Assist method, e.g. `.../v1internal:loadCodeAssist`.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/{}:{}",
            self.endpoint.trim_end_matches('/'),
            self.api_version,
            method
        )
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

//! Data types for consent synchronization and the Code Assist wire format.

use serde::{Deserialize, Serialize};

/// Account tier reported by `loadCodeAssist`.
///
/// Only `Free` gates data-collection consent; every other tier is treated
/// the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountTier {
    Free,
    Legacy,
    Standard,
    /// Identifier this client does not know about.
    Other(String),
}

impl AccountTier {
    pub fn id(&self) -> &str {
        match self {
            AccountTier::Free => "free-tier",
            AccountTier::Legacy => "legacy-tier",
            AccountTier::Standard => "standard-tier",
            AccountTier::Other(id) => id,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, AccountTier::Free)
    }
}

impl From<String> for AccountTier {
    fn from(id: String) -> Self {
        match id.as_str() {
            "free-tier" => AccountTier::Free,
            "legacy-tier" => AccountTier::Legacy,
            "standard-tier" => AccountTier::Standard,
            _ => AccountTier::Other(id),
        }
    }
}

impl From<AccountTier> for String {
    fn from(tier: AccountTier) -> Self {
        tier.id().to_string()
    }
}

impl std::fmt::Display for AccountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Tri-state consent: `None` is unknown or not applicable.
pub type ConsentPreference = Option<bool>;

/// Reactive status published to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_free_tier: bool,
    pub data_collection_opt_in: ConsentPreference,
    /// RFC 3339 time of the last committed server value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<String>,
}

/// Fetch lifecycle of the controller. Updates never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Fetching,
    Ready,
    Failed,
}

/// Client descriptor sent with `loadCodeAssist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    pub ide_type: String,
    pub platform: String,
    pub plugin_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duet_project: Option<String>,
}

impl ClientMetadata {
    /// Fixed IDE-agnostic descriptor; not configurable.
    pub fn for_project(project_id: &str) -> Self {
        Self {
            ide_type: "IDE_UNSPECIFIED".to_string(),
            platform: "PLATFORM_UNSPECIFIED".to_string(),
            plugin_type: "GEMINI".to_string(),
            duet_project: Some(project_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCodeAssistRequest {
    pub cloudaicompanion_project: Option<String>,
    pub metadata: ClientMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCodeAssistResponse {
    #[serde(default)]
    pub current_tier: Option<UserTier>,
    #[serde(default)]
    pub cloudaicompanion_project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTier {
    pub id: AccountTier,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UserTier {
    pub fn new(id: AccountTier) -> Self {
        Self {
            id,
            name: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetGlobalUserSettingRequest {
    pub cloudaicompanion_project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGlobalUserSettingRequest {
    pub cloudaicompanion_project: Option<String>,
    pub free_tier_data_collection_optin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalUserSettingResponse {
    #[serde(default)]
    pub cloudaicompanion_project: Option<String>,
    pub free_tier_data_collection_optin: bool,
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;

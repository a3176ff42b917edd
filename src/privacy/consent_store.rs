//! Remote storage of the free-tier data collection opt-in.

use super::errors::ConsentError;
use super::service::{require_project_id, CodeAssistService};
use super::types::{GetGlobalUserSettingRequest, SetGlobalUserSettingRequest};

/// Reads the opt-in flag.
///
/// A not-found response means the user never stored a preference, which
/// counts as opted in.
pub async fn get_opt_in(handle: &dyn CodeAssistService) -> Result<bool, ConsentError> {
    let request = GetGlobalUserSettingRequest {
        cloudaicompanion_project: Some(require_project_id(handle)?),
    };

    match handle.get_global_user_setting(&request).await {
        Ok(response) => Ok(response.free_tier_data_collection_optin),
        Err(e) if e.is_not_found() => {
            tracing::debug!("No stored opt-in setting, defaulting to opted in");
            Ok(true)
        }
        Err(e) => Err(e),
    }
}

/// Writes the opt-in flag and returns the value the server reports back.
///
/// The returned value is authoritative and may differ from `desired`.
pub async fn set_opt_in(
    handle: &dyn CodeAssistService,
    desired: bool,
) -> Result<bool, ConsentError> {
    let request = SetGlobalUserSettingRequest {
        cloudaicompanion_project: Some(require_project_id(handle)?),
        free_tier_data_collection_optin: desired,
    };

    let response = handle.set_global_user_setting(&request).await?;
    if response.free_tier_data_collection_optin != desired {
        tracing::warn!(
            desired,
            stored = response.free_tier_data_collection_optin,
            "Server stored a different opt-in value than requested"
        );
    }
    Ok(response.free_tier_data_collection_optin)
}

#[cfg(test)]
#[path = "tests/consent_store_tests.rs"]
mod tests;

//! Account tier resolution.

use super::errors::{ConsentError, NO_CURRENT_TIER};
use super::service::{require_project_id, CodeAssistService};
use super::types::{AccountTier, ClientMetadata, LoadCodeAssistRequest};

/// Resolves the caller's account tier with a single `loadCodeAssist` call.
///
/// Fails before any network call when the handle has no project identity,
/// and with a precondition error when the response carries no current tier.
pub async fn resolve_tier(handle: &dyn CodeAssistService) -> Result<AccountTier, ConsentError> {
    let project_id = require_project_id(handle)?;

    let request = LoadCodeAssistRequest {
        metadata: ClientMetadata::for_project(&project_id),
        cloudaicompanion_project: Some(project_id),
    };
    let response = handle.load_code_assist(&request).await?;

    let tier = response
        .current_tier
        .ok_or_else(|| ConsentError::precondition(NO_CURRENT_TIER))?;
    tracing::debug!(tier = %tier.id, "Resolved account tier");
    Ok(tier.id)
}

#[cfg(test)]
#[path = "tests/tier_tests.rs"]
mod tests;

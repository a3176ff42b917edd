//! Service seam for the remote Code Assist operations.
//!
//! Tier resolution and the consent store only talk to the service through
//! this trait, so tests substitute an in-memory double.

use super::errors::{ConsentError, NOT_AUTHENTICATED};
use super::types::{
    GetGlobalUserSettingRequest, GlobalUserSettingResponse, LoadCodeAssistRequest,
    LoadCodeAssistResponse, SetGlobalUserSettingRequest,
};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CodeAssistService: Send + Sync {
    /// Cloud project the handle is authenticated for, if any.
    fn project_id(&self) -> Option<&str>;

    async fn load_code_assist(
        &self,
        request: &LoadCodeAssistRequest,
    ) -> Result<LoadCodeAssistResponse, ConsentError>;

    async fn get_global_user_setting(
        &self,
        request: &GetGlobalUserSettingRequest,
    ) -> Result<GlobalUserSettingResponse, ConsentError>;

    async fn set_global_user_setting(
        &self,
        request: &SetGlobalUserSettingRequest,
    ) -> Result<GlobalUserSettingResponse, ConsentError>;
}

/// Shared, read-only service handle.
pub type ServiceHandle = Arc<dyn CodeAssistService>;

/// Returns the handle's project id, or the precondition error when the
/// handle was not set up through the OAuth flow.
pub fn require_project_id(handle: &dyn CodeAssistService) -> Result<String, ConsentError> {
    match handle.project_id() {
        Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => Err(ConsentError::precondition(NOT_AUTHENTICATED)),
    }
}

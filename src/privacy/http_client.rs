//! HTTPS implementation of [`CodeAssistService`].
//!
//! ureq is blocking, so each call runs on tokio's blocking pool and the
//! controller's task only suspends while it waits.

use super::credentials::{read_gemini_credentials, OAuthCredentials};
use super::errors::ConsentError;
use super::service::CodeAssistService;
use super::types::{
    GetGlobalUserSettingRequest, GlobalUserSettingResponse, LoadCodeAssistRequest,
    LoadCodeAssistResponse, SetGlobalUserSettingRequest,
};
use crate::config::AppConfig;
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

const LOAD_CODE_ASSIST: &str = "loadCodeAssist";
const GET_USER_SETTING: &str = "getCodeAssistGlobalUserSetting";
const SET_USER_SETTING: &str = "setCodeAssistGlobalUserSetting";

enum Request {
    Get { query: Vec<(&'static str, String)> },
    Post { body: String },
}

pub struct CodeAssistHttpClient {
    agent: ureq::Agent,
    config: AppConfig,
    access_token: String,
}

impl CodeAssistHttpClient {
    pub fn new(config: AppConfig, credentials: OAuthCredentials) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build()
            .into();
        Self {
            agent,
            config,
            access_token: credentials.access_token,
        }
    }

    /// Builds a client from the cached Gemini OAuth login.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let credentials = read_gemini_credentials()?
            .context("No Gemini OAuth credentials found; sign in with the Gemini CLI first")?;
        if credentials.is_expired(chrono::Utc::now().timestamp_millis()) {
            tracing::warn!("Cached Gemini access token has expired; requests may be rejected");
        }
        if config.project_id.is_none() {
            tracing::warn!("No project configured; consent cannot be resolved");
        }
        Ok(Self::new(config, credentials))
    }

    async fn call<T>(&self, method: &'static str, request: Request) -> Result<T, ConsentError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = self.config.method_url(method);
        let authorization = format!("Bearer {}", self.access_token);
        tracing::debug!(%url, "Calling Code Assist");

        tokio::task::spawn_blocking(move || {
            let response = match request {
                Request::Get { query } => {
                    let mut builder = agent.get(&url).header("Authorization", &authorization);
                    for (key, value) in &query {
                        builder = builder.query(*key, value);
                    }
                    builder.call()
                }
                Request::Post { body } => agent
                    .post(&url)
                    .header("Authorization", &authorization)
                    .header("Content-Type", "application/json")
                    .send(body),
            };

            let body = response
                .map_err(|e| map_error(method, e))?
                .body_mut()
                .read_to_string()
                .map_err(|e| {
                    ConsentError::transport(format!("{}: failed to read response: {}", method, e))
                })?;
            serde_json::from_str::<T>(&body).map_err(|e| {
                ConsentError::transport(format!("{}: invalid response: {}", method, e))
            })
        })
        .await
        .map_err(|e| ConsentError::transport(format!("{}: request task failed: {}", method, e)))?
    }

    async fn post<Req, T>(&self, method: &'static str, request: &Req) -> Result<T, ConsentError>
    where
        Req: Serialize + Sync,
        T: DeserializeOwned + Send + 'static,
    {
        let body = serde_json::to_string(request).map_err(|e| {
            ConsentError::transport(format!("{}: failed to serialize request: {}", method, e))
        })?;
        self.call(method, Request::Post { body }).await
    }
}

fn map_error(method: &str, error: ureq::Error) -> ConsentError {
    match error {
        ureq::Error::StatusCode(status) => ConsentError::http_status(
            status,
            format!("{} failed with HTTP status {}", method, status),
        ),
        other => ConsentError::transport(format!("{} failed: {}", method, other)),
    }
}

#[async_trait]
impl CodeAssistService for CodeAssistHttpClient {
    fn project_id(&self) -> Option<&str> {
        self.config.project_id.as_deref()
    }

    async fn load_code_assist(
        &self,
        request: &LoadCodeAssistRequest,
    ) -> Result<LoadCodeAssistResponse, ConsentError> {
        self.post(LOAD_CODE_ASSIST, request).await
    }

    async fn get_global_user_setting(
        &self,
        request: &GetGlobalUserSettingRequest,
    ) -> Result<GlobalUserSettingResponse, ConsentError> {
        let query = request
            .cloudaicompanion_project
            .iter()
            .map(|project| ("cloudaicompanionProject", project.clone()))
            .collect();
        self.call(GET_USER_SETTING, Request::Get { query }).await
    }

    async fn set_global_user_setting(
        &self,
        request: &SetGlobalUserSettingRequest,
    ) -> Result<GlobalUserSettingResponse, ConsentError> {
        self.post(SET_USER_SETTING, request).await
    }
}

#[cfg(test)]
#[path = "tests/http_client_tests.rs"]
mod tests;

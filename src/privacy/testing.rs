//! Scripted in-memory `CodeAssistService` for tests.
//!
//! Each remote method pops the next scripted reply. A reply can be gated:
//! the call signals `entered` once it is in flight and then waits until the
//! test releases it, which lets tests interleave overlapping operations.

use super::errors::ConsentError;
use super::service::CodeAssistService;
use super::types::{
    AccountTier, GetGlobalUserSettingRequest, GlobalUserSettingResponse, LoadCodeAssistRequest,
    LoadCodeAssistResponse, SetGlobalUserSettingRequest, UserTier,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

struct Scripted<T> {
    result: Result<T, ConsentError>,
    entered: Option<oneshot::Sender<()>>,
    release: Option<oneshot::Receiver<()>>,
}

/// Handles for a gated reply.
pub struct Gate {
    /// Fires when the call is waiting on the gate.
    pub entered: oneshot::Receiver<()>,
    /// Send (or drop) to let the call return.
    pub release: oneshot::Sender<()>,
}

impl Gate {
    /// Waits until the gated call is in flight.
    pub async fn wait_entered(&mut self) {
        (&mut self.entered).await.expect("gated call never started");
    }

    pub fn open(self) {
        let _ = self.release.send(());
    }
}

#[derive(Default)]
pub struct FakeCodeAssistService {
    project_id: Option<String>,
    loads: Mutex<VecDeque<Scripted<LoadCodeAssistResponse>>>,
    gets: Mutex<VecDeque<Scripted<GlobalUserSettingResponse>>>,
    sets: Mutex<VecDeque<Scripted<GlobalUserSettingResponse>>>,
    load_requests: Mutex<Vec<LoadCodeAssistRequest>>,
    get_requests: Mutex<Vec<GetGlobalUserSettingRequest>>,
    set_requests: Mutex<Vec<SetGlobalUserSettingRequest>>,
}

pub fn tier_response(tier: AccountTier) -> LoadCodeAssistResponse {
    LoadCodeAssistResponse {
        current_tier: Some(UserTier::new(tier)),
        cloudaicompanion_project: None,
    }
}

pub fn setting(opt_in: bool) -> GlobalUserSettingResponse {
    GlobalUserSettingResponse {
        cloudaicompanion_project: None,
        free_tier_data_collection_optin: opt_in,
    }
}

fn scripted<T>(result: Result<T, ConsentError>) -> Scripted<T> {
    Scripted {
        result,
        entered: None,
        release: None,
    }
}

fn gated<T>(result: Result<T, ConsentError>) -> (Scripted<T>, Gate) {
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    let reply = Scripted {
        result,
        entered: Some(entered_tx),
        release: Some(release_rx),
    };
    (
        reply,
        Gate {
            entered: entered_rx,
            release: release_tx,
        },
    )
}

async fn play<T>(queue: &Mutex<VecDeque<Scripted<T>>>, method: &str) -> Result<T, ConsentError> {
    let next = queue.lock().unwrap().pop_front();
    let Some(reply) = next else {
        panic!("unexpected {} call: nothing scripted", method);
    };
    if let Some(entered) = reply.entered {
        let _ = entered.send(());
    }
    if let Some(release) = reply.release {
        let _ = release.await;
    }
    reply.result
}

impl FakeCodeAssistService {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: Some(project_id.to_string()),
            ..Self::default()
        }
    }

    pub fn without_project() -> Self {
        Self::default()
    }

    pub fn push_load(&self, result: Result<LoadCodeAssistResponse, ConsentError>) -> &Self {
        self.loads.lock().unwrap().push_back(scripted(result));
        self
    }

    pub fn push_tier(&self, tier: AccountTier) -> &Self {
        self.push_load(Ok(tier_response(tier)))
    }

    pub fn push_get(&self, result: Result<GlobalUserSettingResponse, ConsentError>) -> &Self {
        self.gets.lock().unwrap().push_back(scripted(result));
        self
    }

    pub fn push_set(&self, result: Result<GlobalUserSettingResponse, ConsentError>) -> &Self {
        self.sets.lock().unwrap().push_back(scripted(result));
        self
    }

    pub fn push_load_gated(&self, result: Result<LoadCodeAssistResponse, ConsentError>) -> Gate {
        let (reply, gate) = gated(result);
        self.loads.lock().unwrap().push_back(reply);
        gate
    }

    pub fn push_set_gated(&self, result: Result<GlobalUserSettingResponse, ConsentError>) -> Gate {
        let (reply, gate) = gated(result);
        self.sets.lock().unwrap().push_back(reply);
        gate
    }

    pub fn load_requests(&self) -> Vec<LoadCodeAssistRequest> {
        self.load_requests.lock().unwrap().clone()
    }

    pub fn get_requests(&self) -> Vec<GetGlobalUserSettingRequest> {
        self.get_requests.lock().unwrap().clone()
    }

    pub fn set_requests(&self) -> Vec<SetGlobalUserSettingRequest> {
        self.set_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeAssistService for FakeCodeAssistService {
    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    async fn load_code_assist(
        &self,
        request: &LoadCodeAssistRequest,
    ) -> Result<LoadCodeAssistResponse, ConsentError> {
        self.load_requests.lock().unwrap().push(request.clone());
        play(&self.loads, "load_code_assist").await
    }

    async fn get_global_user_setting(
        &self,
        request: &GetGlobalUserSettingRequest,
    ) -> Result<GlobalUserSettingResponse, ConsentError> {
        self.get_requests.lock().unwrap().push(request.clone());
        play(&self.gets, "get_global_user_setting").await
    }

    async fn set_global_user_setting(
        &self,
        request: &SetGlobalUserSettingRequest,
    ) -> Result<GlobalUserSettingResponse, ConsentError> {
        self.set_requests.lock().unwrap().push(request.clone());
        play(&self.sets, "set_global_user_setting").await
    }
}

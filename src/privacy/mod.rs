//! Data-collection consent for the Code Assist free tier.
//!
//! [`tier::resolve_tier`] and [`consent_store`] are thin calls against a
//! [`service::CodeAssistService`] handle; [`controller::ConsentSyncController`]
//! combines them into an observable [`types::SyncStatus`].

pub mod consent_store;
pub mod controller;
pub mod credentials;
pub mod errors;
pub mod http_client;
pub mod service;
#[cfg(test)]
pub mod testing;
pub mod tier;
pub mod types;

pub use controller::ConsentSyncController;
pub use errors::ConsentError;
pub use service::{CodeAssistService, ServiceHandle};
pub use types::{AccountTier, FetchPhase, SyncStatus};

//! Consent synchronization controller.
//!
//! Owns the fetch/update lifecycle and publishes a [`SyncStatus`] through a
//! watch channel. Failures never escape: they end up in `SyncStatus::error`.
//!
//! Overlapping refreshes are ordered by a generation token. Each refresh
//! captures the token on entry and only commits while it is still current,
//! so a slow, superseded response is dropped instead of overwriting newer
//! state.

use super::consent_store;
use super::errors::{ConsentError, OPT_IN_NOT_APPLICABLE};
use super::service::{CodeAssistService, ServiceHandle};
use super::tier;
use super::types::{AccountTier, FetchPhase, SyncStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use tokio::sync::watch;

/// Result of one fetch lifecycle before it is committed.
enum FetchOutcome {
    TierFailed(ConsentError),
    NotFree(AccountTier),
    Free(Result<bool, ConsentError>),
}

pub struct ConsentSyncController {
    handle: RwLock<ServiceHandle>,
    status_tx: watch::Sender<SyncStatus>,
    phase_tx: watch::Sender<FetchPhase>,
    generation: AtomicU64,
    /// Tier from the last committed fetch; `None` until one resolves.
    tier: Mutex<Option<AccountTier>>,
}

impl ConsentSyncController {
    /// Creates an idle controller. Call [`refresh`](Self::refresh) to load.
    pub fn new(handle: ServiceHandle) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::default());
        let (phase_tx, _) = watch::channel(FetchPhase::Idle);
        Self {
            handle: RwLock::new(handle),
            status_tx,
            phase_tx,
            generation: AtomicU64::new(0),
            tier: Mutex::new(None),
        }
    }

    /// Subscribes to status snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        self.status_tx.borrow().clone()
    }

    pub fn phase(&self) -> FetchPhase {
        *self.phase_tx.borrow()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn handle(&self) -> ServiceHandle {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Last resolved tier, or `None` when no fetch has resolved one.
    pub fn tier(&self) -> Option<AccountTier> {
        self.tier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_tier(&self, tier: Option<AccountTier>) {
        *self.tier.lock().unwrap_or_else(PoisonError::into_inner) = tier;
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Initial load; same lifecycle as [`refresh`](Self::refresh).
    pub async fn initialize(&self) {
        self.refresh().await;
    }

    /// Swaps the service handle (e.g. after re-authentication) and reloads.
    pub async fn replace_handle(&self, handle: ServiceHandle) {
        *self.handle.write().unwrap_or_else(PoisonError::into_inner) = handle;
        tracing::debug!("Service handle replaced");
        self.refresh().await;
    }

    /// Resolves the tier and, for free tier, the remote opt-in.
    pub async fn refresh(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = self.handle();

        self.phase_tx.send_replace(FetchPhase::Fetching);
        self.status_tx.send_modify(|status| {
            status.is_loading = true;
            status.error = None;
        });
        tracing::debug!(generation, "Refreshing consent status");

        let _loading = LoadingGuard {
            controller: self,
            generation,
        };
        let outcome = fetch(handle.as_ref()).await;

        if !self.is_current(generation) {
            tracing::warn!(
                generation,
                current = self.generation(),
                "Discarding superseded consent fetch"
            );
            return;
        }
        self.commit(outcome);
    }

    fn commit(&self, outcome: FetchOutcome) {
        let synced_at = chrono::Utc::now().to_rfc3339();
        let phase = match &outcome {
            FetchOutcome::TierFailed(_) | FetchOutcome::Free(Err(_)) => FetchPhase::Failed,
            FetchOutcome::NotFree(_) | FetchOutcome::Free(Ok(_)) => FetchPhase::Ready,
        };
        self.set_tier(match &outcome {
            FetchOutcome::TierFailed(_) => None,
            FetchOutcome::NotFree(tier) => Some(tier.clone()),
            FetchOutcome::Free(_) => Some(AccountTier::Free),
        });

        self.status_tx.send_modify(|status| {
            match outcome {
                FetchOutcome::TierFailed(e) => {
                    tracing::warn!(error = %e, "Tier resolution failed");
                    status.error = Some(e.to_string());
                }
                FetchOutcome::NotFree(tier) => {
                    tracing::debug!(%tier, "Opt-in not applicable for tier");
                    status.is_free_tier = false;
                    status.data_collection_opt_in = None;
                    status.last_synced_at = Some(synced_at);
                }
                FetchOutcome::Free(Ok(opt_in)) => {
                    status.is_free_tier = true;
                    status.data_collection_opt_in = Some(opt_in);
                    status.last_synced_at = Some(synced_at);
                }
                FetchOutcome::Free(Err(e)) => {
                    tracing::warn!(error = %e, "Fetching opt-in failed");
                    status.is_free_tier = true;
                    status.error = Some(e.to_string());
                }
            }
            status.is_loading = false;
        });
        self.phase_tx.send_replace(phase);
    }

    /// Writes the opt-in and adopts the value the server returns.
    ///
    /// Leaves the fetch lifecycle alone. On failure the previous preference
    /// is kept and only `error` changes.
    ///
    /// Refused without a remote call only when the resolved tier is known
    /// to be non-free. With no resolved tier the write still goes out, but
    /// the stored value is only adopted once a fetch reports free tier.
    pub async fn update_opt_in(&self, desired: bool) {
        if let Some(tier) = self.tier().filter(|tier| !tier.is_free()) {
            tracing::debug!(%tier, "Refusing opt-in update for non-free tier");
            self.status_tx.send_modify(|status| {
                status.error = Some(OPT_IN_NOT_APPLICABLE.to_string());
            });
            return;
        }

        let handle = self.handle();
        let result = consent_store::set_opt_in(handle.as_ref(), desired).await;
        let synced_at = chrono::Utc::now().to_rfc3339();
        let is_free = self.tier().is_some_and(|tier| tier.is_free());

        self.status_tx.send_modify(|status| match result {
            Ok(stored) if is_free => {
                status.data_collection_opt_in = Some(stored);
                status.last_synced_at = Some(synced_at);
            }
            Ok(stored) => {
                tracing::warn!(
                    stored,
                    "Tier not free or not resolved after opt-in update, not adopting stored value"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, desired, "Updating opt-in failed");
                status.error = Some(e.to_string());
            }
        });
    }
}

async fn fetch(handle: &dyn CodeAssistService) -> FetchOutcome {
    let tier = match tier::resolve_tier(handle).await {
        Ok(tier) => tier,
        Err(e) => return FetchOutcome::TierFailed(e),
    };
    if !tier.is_free() {
        // Non-free tiers settle data collection outside this flow.
        return FetchOutcome::NotFree(tier);
    }
    FetchOutcome::Free(consent_store::get_opt_in(handle).await)
}

/// Clears `is_loading` when a refresh ends, including when its future is
/// dropped mid-flight. Superseded refreshes leave the flag to the newer one.
struct LoadingGuard<'a> {
    controller: &'a ConsentSyncController,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.controller.is_current(self.generation) {
            return;
        }
        self.controller.status_tx.send_if_modified(|status| {
            let was_loading = status.is_loading;
            status.is_loading = false;
            was_loading
        });
        self.controller.phase_tx.send_if_modified(|phase| {
            if *phase == FetchPhase::Fetching {
                *phase = FetchPhase::Idle;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

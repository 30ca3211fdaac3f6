// src/flows/mod.rs
//
// The three user-initiated transaction flows. Each follows the same
// protocol: validate local preconditions, submit, await confirmation,
// re-fetch only the affected fields, then update the view model. A busy
// flag is held from submission until completion so the triggering control
// can be disabled, and it is cleared on every path so the user can retry.
pub mod claim;
pub mod contribute;
pub mod create;

pub use claim::ClaimFlow;
pub use contribute::ContributeFlow;
pub use create::{CreateCampaignInput, CreateFlow};

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::error::ClientResult;

/// Shared in-flight/error bookkeeping for one flow.
pub(crate) struct FlowState {
    busy: AtomicBool,
    last_error: RwLock<Option<String>>,
}

impl FlowState {
    pub(crate) fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            last_error: RwLock::new(None),
        }
    }

    /// Take the busy flag; false means another submission is in flight.
    pub(crate) fn try_begin(&self) -> bool {
        !self.busy.swap(true, Ordering::SeqCst)
    }

    /// Record the outcome and release the busy flag.
    pub(crate) async fn finish(&self, result: &ClientResult<()>) {
        let mut last_error = self.last_error.write().await;
        *last_error = result.as_ref().err().map(|e| e.user_message());
        drop(last_error);
        self.busy.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub(crate) async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }
}

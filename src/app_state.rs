// =============================================================================
// Central Application State — Stock Tracker
// =============================================================================
//
// The single owner of the view state. The input controller and the fetch
// orchestrator mutate it only through the transition methods below; the
// presenter reads cloned snapshots.
//
// Thread safety:
//   - Atomic counters for lock-free version and request-sequence tracking.
//   - parking_lot::RwLock around the one `ViewState` record, replaced as a
//     whole under a single write lock per transition.
//   - Request sequence numbers are reserved, and checked against a resolving
//     response, only while that write lock is held.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tracing::debug;

use crate::runtime_config::RacePolicy;
use crate::types::{FetchStatus, ViewState};

/// Shown when a submission is made with an empty symbol.
pub const EMPTY_SYMBOL_MESSAGE: &str = "Please enter a stock symbol";

/// Central application state shared across tasks via `Arc<AppState>`.
pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Monotonically increasing version counter. Incremented on every
    /// mutation; the render loop compares it to decide when to redraw.
    pub state_version: AtomicU64,

    /// Sequence number of the most recently dispatched request.
    request_seq: AtomicU64,

    // ── View ────────────────────────────────────────────────────────────
    view: RwLock<ViewState>,

    // ── In-flight fetch ─────────────────────────────────────────────────
    in_flight: Mutex<Option<AbortHandle>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Empty symbol, no error, no rows.
    pub fn new() -> Self {
        Self {
            state_version: AtomicU64::new(1),
            request_seq: AtomicU64::new(0),
            view: RwLock::new(ViewState::default()),
            in_flight: Mutex::new(None),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Request Sequence ────────────────────────────────────────────────

    /// Reserve the next request sequence number (first is 1). Callers hold
    /// the view write lock.
    fn next_request_seq(&self) -> u64 {
        self.request_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_request_seq(&self) -> u64 {
        self.request_seq.load(Ordering::SeqCst)
    }

    /// Track `handle` as the in-flight fetch, returning the one it replaces.
    pub fn replace_in_flight(&self, handle: AbortHandle) -> Option<AbortHandle> {
        self.in_flight.lock().replace(handle)
    }

    /// Stop tracking the in-flight fetch, returning it.
    pub fn take_in_flight(&self) -> Option<AbortHandle> {
        self.in_flight.lock().take()
    }

    // ── Snapshot ────────────────────────────────────────────────────────

    /// Clone of the current view. Datasets are shared, not copied.
    pub fn snapshot(&self) -> ViewState {
        self.view.read().clone()
    }

    pub fn symbol(&self) -> String {
        self.view.read().symbol.clone()
    }

    // ── Transitions ─────────────────────────────────────────────────────

    fn transition<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let out = {
            let mut view = self.view.write();
            f(&mut view)
        };
        self.increment_version();
        out
    }

    /// Replace the symbol text. Nothing else changes.
    pub fn set_symbol(&self, text: String) {
        self.transition(|view| view.symbol = text);
    }

    /// Open a new request: reserve its sequence number and drop the active
    /// error under the same write lock.
    pub fn begin_request(&self) -> u64 {
        self.transition(|view| {
            view.status = std::mem::take(&mut view.status).clear_error();
            self.next_request_seq()
        })
    }

    /// Surface `message` as the active error, as a user action newer than any
    /// request in flight. The dataset is kept.
    pub fn supersede_with_error(&self, message: impl Into<String>) -> u64 {
        let message = message.into();
        self.transition(|view| {
            view.status = std::mem::take(&mut view.status).fail(message);
            self.next_request_seq()
        })
    }

    /// Whether a response to request `seq` may still touch the view.
    fn accepts(&self, seq: u64, policy: RacePolicy) -> bool {
        match policy {
            RacePolicy::LastResolved => true,
            RacePolicy::LatestRequest | RacePolicy::CancelSuperseded => {
                let latest = self.latest_request_seq();
                if seq != latest {
                    debug!(seq, latest, "discarding superseded response");
                }
                seq == latest
            }
        }
    }

    /// Apply `f` as the outcome of request `seq` if `policy` still accepts
    /// it. Sequence numbers are only reserved under the view write lock, so
    /// no newer request can open between the check and the write. Returns
    /// whether `f` ran.
    pub fn apply_if_current(
        &self,
        seq: u64,
        policy: RacePolicy,
        f: impl FnOnce(&mut FetchStatus),
    ) -> bool {
        {
            let mut view = self.view.write();
            if !self.accepts(seq, policy) {
                return false;
            }
            f(&mut view.status);
        }
        self.increment_version();
        true
    }
}

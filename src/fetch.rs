// =============================================================================
// Fetch Orchestrator — one request per submission
// =============================================================================
//
// `dispatch` clears the active error synchronously, then spawns a task that
// issues exactly one request and applies its classified outcome. `reject`
// surfaces a validation error without a request. How
// overlapping requests interact is decided by the configured `RacePolicy`:
//
//   last_resolved      every outcome is applied on arrival
//   latest_request     outcomes of superseded requests are discarded
//   cancel_superseded  superseded tasks are also aborted
// =============================================================================

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::runtime_config::RacePolicy;
use crate::service::{FetchFailure, IndicatorClient};

#[derive(Clone)]
pub struct FetchOrchestrator {
    state: Arc<AppState>,
    client: IndicatorClient,
    policy: RacePolicy,
}

impl FetchOrchestrator {
    pub fn new(state: Arc<AppState>, client: IndicatorClient, policy: RacePolicy) -> Self {
        Self {
            state,
            client,
            policy,
        }
    }

    /// Start fetching `symbol`. The caller guarantees it is non-empty.
    ///
    /// The returned handle resolves once the outcome has been applied or
    /// discarded. Under `CancelSuperseded` it may instead resolve as
    /// cancelled when a later submission aborts it.
    pub fn dispatch(&self, symbol: String) -> JoinHandle<()> {
        debug_assert!(!symbol.is_empty(), "empty symbols are rejected upstream");

        let seq = self.state.begin_request();
        info!(symbol = %symbol, seq, policy = %self.policy, "fetch dispatched");

        let state = self.state.clone();
        let client = self.client.clone();
        let policy = self.policy;

        let handle = tokio::spawn(async move {
            let outcome = client.fetch_stocks(&symbol).await;

            match outcome {
                Ok(rows) => {
                    let count = rows.len();
                    let applied = state.apply_if_current(seq, policy, |status| {
                        *status = std::mem::take(status).replace_rows(rows);
                    });
                    if applied {
                        info!(symbol = %symbol, seq, rows = count, "fetch succeeded");
                    }
                }
                Err(e) => {
                    let applied = state.apply_if_current(seq, policy, |status| {
                        *status = std::mem::take(status).fail(e.user_message());
                    });
                    if !applied {
                        return;
                    }
                    match &e {
                        FetchFailure::Transport(_) => {
                            warn!(symbol = %symbol, seq, error = %e, "fetch failed in transport")
                        }
                        FetchFailure::Service { status, .. } => {
                            warn!(symbol = %symbol, seq, status = %status, error = %e, "service reported an error")
                        }
                    }
                }
            }
        });

        if self.policy == RacePolicy::CancelSuperseded {
            if let Some(previous) = self.state.replace_in_flight(handle.abort_handle()) {
                previous.abort();
            }
        }

        handle
    }

    /// Show `message` without making a request. The rejection is newer than
    /// any request in flight: under `LatestRequest` and `CancelSuperseded`
    /// their responses are discarded, and under `CancelSuperseded` the task
    /// is aborted. Under `LastResolved` a late success only swaps the rows
    /// kept behind the message.
    pub fn reject(&self, message: &str) {
        let seq = self.state.supersede_with_error(message);
        debug!(seq, policy = %self.policy, message, "submission rejected");

        if self.policy == RacePolicy::CancelSuperseded {
            if let Some(in_flight) = self.state.take_in_flight() {
                in_flight.abort();
            }
        }
    }
}

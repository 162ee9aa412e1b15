// =============================================================================
// Input Controller — symbol text and submissions
// =============================================================================

use std::sync::Arc;

use tokio::task::JoinHandle;
use crate::app_state::{AppState, EMPTY_SYMBOL_MESSAGE};
use crate::fetch::FetchOrchestrator;

/// What a submission turned into.
#[derive(Debug)]
pub enum Submission {
    /// The symbol was empty; the validation error is showing and no request
    /// was made.
    Rejected,
    /// A request is in flight.
    Dispatched(JoinHandle<()>),
}

#[derive(Clone)]
pub struct InputController {
    state: Arc<AppState>,
    orchestrator: FetchOrchestrator,
}

impl InputController {
    pub fn new(state: Arc<AppState>, orchestrator: FetchOrchestrator) -> Self {
        Self {
            state,
            orchestrator,
        }
    }

    /// Replace the symbol with `text`, verbatim.
    pub fn on_change(&self, text: impl Into<String>) {
        self.state.set_symbol(text.into());
    }

    /// Submit the current symbol. The empty check runs before any
    /// asynchronous work, and an earlier request still in flight cannot
    /// clear the validation error it raises.
    pub fn on_submit(&self) -> Submission {
        let symbol = self.state.symbol();
        if symbol.is_empty() {
            self.orchestrator.reject(EMPTY_SYMBOL_MESSAGE);
            return Submission::Rejected;
        }
        Submission::Dispatched(self.orchestrator.dispatch(symbol))
    }
}

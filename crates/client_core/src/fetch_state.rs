//! Request lifecycle shared by every console view.

use std::future::Future;

use shared::protocol::ViewKind;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    /// Display string of whatever failed.
    Error(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Owns the state of one view and publishes every transition.
///
/// Renderers either take a snapshot with [`FetchController::state`] or
/// subscribe to observe `Loading` while a request is in flight.
pub struct FetchController<T> {
    view: ViewKind,
    state: watch::Sender<FetchState<T>>,
}

impl<T: Clone> FetchController<T> {
    pub fn new(view: ViewKind) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self { view, state }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    /// Applies `f` to the current result without cloning it.
    pub fn map_result<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.state.borrow().result().map(f)
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

    /// Whether the trigger control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.state.borrow().is_loading()
    }

    pub fn reset(&self) {
        self.state.send_replace(FetchState::Idle);
    }

    /// Settles into an error without issuing a request.
    pub fn reject(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(view = %self.view, %message, "request rejected before dispatch");
        self.state.send_replace(FetchState::Error(message));
    }

    /// Drops any previous result or error and marks the view as loading.
    pub fn begin(&self) {
        if self.state.borrow().is_loading() {
            warn!(view = %self.view, "request started while another is in flight");
        }
        debug!(view = %self.view, "request started");
        self.state.send_replace(FetchState::Loading);
    }

    pub fn settle(&self, outcome: Result<T, ClientError>) {
        let next = match outcome {
            Ok(value) => {
                debug!(view = %self.view, "request succeeded");
                FetchState::Success(value)
            }
            Err(err) => {
                warn!(view = %self.view, error = %err, status = ?err.status(), "request failed");
                FetchState::Error(err.to_string())
            }
        };
        self.state.send_replace(next);
    }

    pub async fn run<F>(&self, request: F)
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.begin();
        let outcome = request.await;
        self.settle(outcome);
    }
}

#[cfg(test)]
#[path = "tests/fetch_state_tests.rs"]
mod tests;

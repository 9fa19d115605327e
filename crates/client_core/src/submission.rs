//! Request lifecycle for one prediction: validate, mark busy, call the scorer, settle.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::{domain::NormalizedVector, error::SubmissionError};
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use crate::{form::FormModel, RiskScorer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Busy,
    Succeeded(String),
    Failed(String),
}

impl SubmissionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Busy)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_)
        )
    }
}

pub struct SubmissionController {
    scorer: Arc<dyn RiskScorer>,
    timeout: Option<Duration>,
    state: watch::Sender<SubmissionState>,
    generation: AtomicU64,
    abort: Notify,
}

impl SubmissionController {
    pub fn new(scorer: Arc<dyn RiskScorer>) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            scorer,
            timeout: None,
            state,
            generation: AtomicU64::new(0),
            abort: Notify::new(),
        }
    }

    /// `None` lets a scorer call run until the transport itself gives up.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Ends every scorer call currently in flight with `Failed("Request cancelled.")`.
    pub fn abort(&self) {
        self.abort.notify_waiters();
    }

    /// Runs one attempt to completion and returns its terminal state.
    ///
    /// `Busy` is published before the form is validated or the scorer is called. The terminal
    /// state is published only if no newer `submit` started in the meantime; a superseded
    /// attempt still returns its own outcome to the caller.
    pub async fn submit(&self, form: &FormModel) -> SubmissionState {
        let aborted = self.abort.notified();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // Busy replaces whatever result or error the previous attempt left behind.
        self.state.send_replace(SubmissionState::Busy);
        debug!(generation, "submission started");

        let outcome = match form.validate_and_normalize() {
            Ok(vector) => {
                tokio::select! {
                    outcome = self.score(vector) => outcome,
                    _ = aborted => Err(SubmissionError::Cancelled),
                }
            }
            Err(err) => {
                debug!(generation, error = %err, "form rejected before scoring");
                Err(err.into())
            }
        };

        self.settle(generation, outcome)
    }

    async fn score(&self, vector: NormalizedVector) -> Result<String, SubmissionError> {
        let call = self.scorer.score(&vector);
        let reply = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| SubmissionError::TimedOut)?,
            None => call.await,
        };
        let reply = reply.map_err(|err| SubmissionError::Transport {
            detail: err.to_string(),
        })?;
        reply.into_outcome().map_err(SubmissionError::ScorerReported)
    }

    fn settle(
        &self,
        generation: u64,
        outcome: Result<String, SubmissionError>,
    ) -> SubmissionState {
        let terminal = match outcome {
            Ok(text) => {
                info!(generation, result = %text, "submission succeeded");
                SubmissionState::Succeeded(text)
            }
            Err(err) => {
                match &err {
                    SubmissionError::Transport { detail } => {
                        warn!(generation, %detail, "scorer unreachable")
                    }
                    other => warn!(generation, error = ?other, "submission failed"),
                }
                SubmissionState::Failed(err.to_string())
            }
        };

        let published = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = terminal.clone();
            true
        });
        if !published {
            debug!(generation, "dropped outcome of superseded submission");
        }
        terminal
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;

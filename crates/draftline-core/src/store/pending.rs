//! Acknowledgement tracking for fire-and-forget store commands.

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, warn};

use super::command::StoreError;

/// An issued command whose outcome has not been observed yet.
#[derive(Debug)]
#[must_use = "call `detach` or `wait` to observe the command outcome"]
pub struct Pending {
    command: &'static str,
    subject: String,
    tolerate_missing: bool,
    rx: oneshot::Receiver<Result<(), StoreError>>,
}

impl Pending {
    pub(crate) fn new(
        command: &'static str,
        subject: String,
        rx: oneshot::Receiver<Result<(), StoreError>>,
    ) -> Self {
        Self {
            command,
            subject,
            tolerate_missing: false,
            rx,
        }
    }

    /// Treat `NotFound` as an expected outcome (logged at debug level).
    pub fn tolerate_missing(mut self) -> Self {
        self.tolerate_missing = true;
        self
    }

    /// Wait for the store's answer.
    ///
    /// A store that drops the acknowledgement without answering is taken
    /// as a silent success.
    ///
    /// # Errors
    ///
    /// Returns the error the store reported.
    pub async fn wait(self) -> Result<(), StoreError> {
        self.rx.await.unwrap_or(Ok(()))
    }

    /// Stop caring about the outcome; failures are logged, never returned.
    ///
    /// Answers already available are logged immediately. Otherwise a task
    /// is spawned on the current tokio runtime to watch for the answer.
    pub fn detach(mut self) {
        match self.rx.try_recv() {
            Ok(outcome) => report(self.command, &self.subject, self.tolerate_missing, outcome),
            Err(TryRecvError::Closed) => {}
            Err(TryRecvError::Empty) => match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        let outcome = self.rx.await.unwrap_or(Ok(()));
                        report(self.command, &self.subject, self.tolerate_missing, outcome);
                    });
                }
                Err(_) => debug!(
                    command = self.command,
                    subject = %self.subject,
                    "No runtime to watch store acknowledgement"
                ),
            },
        }
    }
}

fn report(
    command: &'static str,
    subject: &str,
    tolerate_missing: bool,
    outcome: Result<(), StoreError>,
) {
    match outcome {
        Ok(()) => debug!(command, subject, "Store command completed"),
        Err(StoreError::AlreadyExists(_)) => {
            debug!(command, subject, "Store target already exists");
        }
        Err(StoreError::NotFound(_)) if tolerate_missing => {
            debug!(command, subject, "Store target not found");
        }
        Err(e) => warn!(command, subject, error = %e, "Store command failed"),
    }
}

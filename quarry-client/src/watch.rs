//! Cancellable run watching
//!
//! [`RunWatch`] polls a run at a fixed interval until it reaches a terminal
//! status. The watch can be stopped early without affecting the run itself.

use std::time::Duration;

use quarry_core::domain::PipelineRun;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{ClientError, PipelineClient, Result};

/// How a watch ended
#[derive(Debug)]
pub enum WatchOutcome {
    /// The run reached a terminal status
    Finished(PipelineRun),
    /// The watch was stopped before the run finished
    Stopped,
}

/// Handle to a background polling task
///
/// Dropping the handle without calling [`RunWatch::wait`] detaches the task;
/// it keeps polling until the run finishes or the process exits.
pub struct RunWatch {
    stop: watch::Sender<bool>,
    handle: JoinHandle<Result<WatchOutcome>>,
}

impl RunWatch {
    /// Signal the watch to stop at the next poll boundary
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Wait for the watch to finish
    pub async fn wait(self) -> Result<WatchOutcome> {
        self.handle
            .await
            .map_err(|e| ClientError::InternalError(format!("Watch task panicked: {e}")))?
    }

    /// Stop the watch and wait for it to wind down
    pub async fn stop_and_wait(self) -> Result<WatchOutcome> {
        self.stop();
        self.wait().await
    }
}

impl PipelineClient {
    /// Watch a run until it reaches a terminal status
    ///
    /// Spawns a background task that polls `GET /jobs/{id}` every `interval`.
    /// Transient failures (connection errors, 5xx responses) are retried at
    /// the next tick; other errors end the watch.
    pub fn watch_run(&self, id: Uuid, interval: Duration) -> RunWatch {
        let client = self.clone();
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately, so the run is checked
            // once before any waiting.
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match client.get_run(id).await {
                            Ok(run) if run.status.is_terminal() => {
                                debug!(run_id = %id, status = ?run.status, "Run reached terminal status");
                                return Ok(WatchOutcome::Finished(run));
                            }
                            Ok(run) => {
                                debug!(run_id = %id, status = ?run.status, "Run still active");
                            }
                            Err(e) if e.is_transient() => {
                                warn!(run_id = %id, error = %e, "Transient error while polling, retrying");
                            }
                            Err(e) => return Err(e),
                        }
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            debug!(run_id = %id, "Watch stopped");
                            return Ok(WatchOutcome::Stopped);
                        }
                    }
                }
            }
        });

        RunWatch {
            stop: stop_tx,
            handle,
        }
    }
}

//! Fixed-interval job status polling.
//!
//! A [`JobPoller`] owns one background task that hits `GET /job/{id}`
//! on a fixed cadence and forwards every snapshot over a channel. The
//! task polls immediately on spawn, then once per interval, and exits
//! on its own after the job completes or the first poll error. There
//! is deliberately no retry and no backoff.

use std::sync::Arc;
use std::time::Duration;

use scoutapi::{AnalysisApi, JobStatusResponse};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Events emitted by a [`JobPoller`].
#[derive(Debug)]
pub enum PollEvent {
    /// Fresh status snapshot from the backend.
    Status(JobStatusResponse),
    /// A poll failed and polling has stopped.
    Failed(String),
}

/// Handle to a background polling task. Dropping it stops the polling.
pub struct JobPoller {
    rx: mpsc::Receiver<PollEvent>,
    handle: JoinHandle<()>,
}

impl JobPoller {
    pub fn spawn(api: Arc<dyn AnalysisApi>, job_id: String, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(async move {
            debug!(%job_id, ?interval, "JobPoller: started");
            // First tick fires immediately, matching the interval start
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match api.job_status(&job_id).await {
                    Ok(status) => {
                        let completed = status.completed;
                        if tx.send(PollEvent::Status(status)).await.is_err() {
                            debug!(%job_id, "JobPoller: receiver dropped");
                            break;
                        }
                        if completed {
                            debug!(%job_id, "JobPoller: job completed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(%job_id, error = %e, "JobPoller: poll failed");
                        let _ = tx.send(PollEvent::Failed(e.to_string())).await;
                        break;
                    }
                }
            }
        });
        Self { rx, handle }
    }

    /// Next event, or `None` once the task has finished and the channel
    /// drained.
    pub async fn recv(&mut self) -> Option<PollEvent> {
        self.rx.recv().await
    }

    /// Non-blocking receive for tick-driven draining.
    pub fn try_recv(&mut self) -> Option<PollEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

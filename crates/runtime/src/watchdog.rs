//! Fails requests stuck in `running` past the watchdog timeout.
//!
//! A worker that dies mid-handler leaves its request `running` and its
//! resource locked. The sweep moves such requests to `failed` with class
//! `timeout` and frees the lock so queued work on the resource proceeds.
//! If the handler later returns, the dispatcher finds the request terminal
//! and discards the result.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use geocat_execution::{ExecutionRequest, RequestStatus};
use geocat_ports::ExecutionRepo;
use geocat_telemetry::{EventBus, ExecutionEvent, MetricsRegistry};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;
use crate::locks::ResourceLocks;

/// Periodic sweep over `running` requests.
pub struct Watchdog {
    repo: Arc<dyn ExecutionRepo>,
    locks: Arc<ResourceLocks>,
    events: Arc<EventBus<ExecutionEvent>>,
    metrics: Arc<MetricsRegistry>,
    timeout: Duration,
    interval: Duration,
}

impl Watchdog {
    /// Create a watchdog failing requests running longer than `timeout`,
    /// checked every `interval`.
    pub fn new(
        repo: Arc<dyn ExecutionRepo>,
        locks: Arc<ResourceLocks>,
        events: Arc<EventBus<ExecutionEvent>>,
        metrics: Arc<MetricsRegistry>,
        timeout: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            repo,
            locks,
            events,
            metrics,
            timeout,
            interval,
        }
    }

    /// One pass. Returns the requests that were failed.
    pub async fn sweep(&self) -> Result<Vec<ExecutionRequest>, ServiceError> {
        let now = Utc::now();
        let mut expired = Vec::new();

        for mut request in self.repo.list_by_status(RequestStatus::Running).await? {
            let Some(started) = request.started else {
                continue;
            };
            let running_for = (now - started).to_std().unwrap_or_default();
            if running_for < self.timeout {
                continue;
            }

            let exec_id = request.exec_id;
            let expected = request.version;
            request.fail(
                "timeout",
                format!("no result after {running_for:?}, watchdog limit is {:?}", self.timeout),
            )?;
            // A lost race means the worker just wrote its result.
            if !self.repo.update(&request, expected).await? {
                continue;
            }

            if let Some(key) = request.lock_key() {
                self.locks.release(key, exec_id);
            }
            self.metrics.counter("executions_timed_out_total").inc();
            self.events.emit(ExecutionEvent::TimedOut {
                execution_id: exec_id,
            });
            tracing::warn!(execution_id = %exec_id, ?running_for, "execution timed out");
            expired.push(request);
        }
        Ok(expired)
    }

    /// Run [`sweep`](Self::sweep) every `interval` until `shutdown` fires.
    pub fn spawn(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(self.interval) => {}
                    () = shutdown.cancelled() => break,
                }
                match self.sweep().await {
                    Ok(expired) if !expired.is_empty() => {
                        tracing::info!(count = expired.len(), "watchdog failed stuck requests");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = %err, "watchdog sweep failed"),
                }
            }
            tracing::debug!("watchdog stopped");
        })
    }
}

impl std::fmt::Debug for Watchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watchdog")
            .field("timeout", &self.timeout)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

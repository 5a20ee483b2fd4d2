//! The dispatcher: queue → lock → handler → terminal state.
//!
//! # Flow
//!
//! 1. [`dispatch`](Dispatcher::dispatch) admits the request to its
//!    resource's line and enqueues `{exec_id, resource}`
//! 2. A worker dequeues the task and loads the request; anything no longer
//!    `ready` is acknowledged and dropped
//! 3. A busy resource lock re-queues the task with doubling backoff
//! 4. `ready → running` is a compare-and-swap on the request version, so
//!    exactly one handler invocation happens per request
//! 5. The handler runs under `watchdog_timeout`; its result is written with
//!    another compare-and-swap against a freshly loaded record, which
//!    discards late results for requests the watchdog already failed

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use geocat_core::{ExecutionId, ResourceKey};
use geocat_execution::{ExecutionRequest, RequestStatus};
use geocat_operations::{OperationContext, StepRecorder};
use geocat_ports::{ExecutionRepo, TaskQueue};
use geocat_telemetry::{EventBus, ExecutionEvent, MetricsRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RuntimeConfig;
use crate::error::ServiceError;
use crate::locks::ResourceLocks;
use crate::registry::HandlerRegistry;

/// Attempts at a contended compare-and-swap before giving up.
const MAX_CAS_ATTEMPTS: usize = 8;

/// Queue payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Task {
    exec_id: ExecutionId,
    #[serde(default)]
    resource: Option<ResourceKey>,
}

enum Outcome {
    Finished(Value),
    Failed { class: &'static str, message: String },
}

/// Moves requests from `ready` to a terminal state.
pub struct Dispatcher {
    repo: Arc<dyn ExecutionRepo>,
    queue: Arc<dyn TaskQueue>,
    registry: Arc<HandlerRegistry>,
    locks: Arc<ResourceLocks>,
    events: Arc<EventBus<ExecutionEvent>>,
    metrics: Arc<MetricsRegistry>,
    config: RuntimeConfig,
    attempts: DashMap<ExecutionId, u32>,
}

impl Dispatcher {
    /// Wire a dispatcher.
    pub fn new(
        repo: Arc<dyn ExecutionRepo>,
        queue: Arc<dyn TaskQueue>,
        registry: Arc<HandlerRegistry>,
        locks: Arc<ResourceLocks>,
        events: Arc<EventBus<ExecutionEvent>>,
        metrics: Arc<MetricsRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            repo,
            queue,
            registry,
            locks,
            events,
            metrics,
            config,
            attempts: DashMap::new(),
        }
    }

    /// The lock table.
    #[must_use]
    pub fn locks(&self) -> &Arc<ResourceLocks> {
        &self.locks
    }

    /// Hand a freshly created request to the workers. Call once per request.
    pub async fn dispatch(&self, exec_id: ExecutionId) -> Result<(), ServiceError> {
        let request = self
            .repo
            .get(exec_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("execution request", exec_id.to_string()))?;
        let resource = request.lock_key().cloned();
        if let Some(key) = &resource {
            self.locks.admit(key, exec_id);
        }
        let payload = serde_json::to_value(Task {
            exec_id,
            resource: resource.clone(),
        })
        .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        if let Err(err) = self.queue.enqueue(payload).await {
            if let Some(key) = &resource {
                self.locks.forget(key, exec_id);
            }
            return Err(err.into());
        }
        tracing::debug!(execution_id = %exec_id, "execution request dispatched");
        Ok(())
    }

    /// Take one task off the queue and process it. Returns `false` if the
    /// queue stayed empty for `dequeue_timeout`.
    pub async fn run_once(&self) -> Result<bool, ServiceError> {
        let Some((task_id, payload)) = self.queue.dequeue(self.config.dequeue_timeout()).await?
        else {
            return Ok(false);
        };
        self.process(&task_id, payload).await?;
        Ok(true)
    }

    /// Process queued work until the queue is idle, including tasks waiting
    /// out a lock backoff. Returns how many tasks were handled.
    pub async fn drain(&self) -> Result<usize, ServiceError> {
        let mut handled = 0;
        while !self.queue.is_empty().await? {
            if self.run_once().await? {
                handled += 1;
            }
        }
        Ok(handled)
    }

    /// Start `workers` tasks consuming the queue until `shutdown` fires.
    /// A worker finishes the request in hand before exiting.
    pub fn spawn_workers(self: &Arc<Self>, shutdown: &CancellationToken) -> Vec<JoinHandle<()>> {
        (0..self.config.workers.max(1))
            .map(|worker| {
                let dispatcher = Arc::clone(self);
                let shutdown = shutdown.clone();
                tokio::spawn(async move { dispatcher.worker_loop(worker, shutdown).await })
            })
            .collect()
    }

    async fn worker_loop(&self, worker: usize, shutdown: CancellationToken) {
        tracing::debug!(worker, "worker started");
        loop {
            let next = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                next = self.queue.dequeue(self.config.dequeue_timeout()) => next,
            };
            match next {
                Ok(Some((task_id, payload))) => {
                    if let Err(err) = self.process(&task_id, payload).await {
                        tracing::error!(worker, task_id = %task_id, error = %err, "task processing failed");
                        // The task may already be acked; a missing task is fine.
                        let _ = self.queue.nack(&task_id, self.config.lock_backoff(1)).await;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(worker, error = %err, "dequeue failed");
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(self.config.dequeue_timeout()) => {}
                    }
                }
            }
        }
        tracing::debug!(worker, "worker stopped");
    }

    async fn process(&self, task_id: &str, payload: Value) -> Result<(), ServiceError> {
        let task: Task = match serde_json::from_value(payload) {
            Ok(task) => task,
            Err(err) => {
                tracing::warn!(task_id, error = %err, "dropping malformed task");
                self.queue.ack(task_id).await?;
                return Ok(());
            }
        };
        let exec_id = task.exec_id;

        let Some(mut request) = self.repo.get(exec_id).await? else {
            tracing::debug!(execution_id = %exec_id, "request vanished before it ran");
            self.drop_task(task_id, &task).await?;
            return Ok(());
        };
        if request.status != RequestStatus::Ready {
            tracing::debug!(execution_id = %exec_id, status = %request.status, "duplicate delivery");
            self.drop_task(task_id, &task).await?;
            return Ok(());
        }

        let lock = request.lock_key().cloned();
        if let Some(key) = &lock {
            if !self.locks.try_acquire(key, exec_id) {
                return self.requeue(task_id, exec_id).await;
            }
        }

        let expected = request.version;
        request.start()?;
        let started = match self.repo.update(&request, expected).await {
            Ok(started) => started,
            Err(err) => {
                self.release(lock.as_ref(), exec_id);
                return Err(err.into());
            }
        };
        if !started {
            return self.lost_start(task_id, &task, lock.as_ref()).await;
        }
        self.attempts.remove(&exec_id);

        let clock = Instant::now();
        self.metrics.counter("executions_started_total").inc();
        let in_flight = self.metrics.gauge("executions_in_flight");
        in_flight.inc();
        self.events.emit(ExecutionEvent::Started {
            execution_id: exec_id,
            func_name: request.func_name.to_string(),
            resource: request.resource.clone(),
        });
        tracing::info!(execution_id = %exec_id, func = %request.func_name, "execution started");

        let outcome = self.invoke(&request).await;
        let elapsed = clock.elapsed();
        let result = self.complete(exec_id, &outcome).await;
        in_flight.dec();

        self.release(lock.as_ref(), exec_id);
        self.queue.ack(task_id).await?;
        let stored = result?;
        self.metrics
            .histogram("execution_duration_seconds")
            .observe(elapsed.as_secs_f64());

        if stored.is_none() {
            return Ok(());
        }
        match outcome {
            Outcome::Finished(_) => {
                self.metrics.counter("executions_finished_total").inc();
                self.events.emit(ExecutionEvent::Finished {
                    execution_id: exec_id,
                    duration: elapsed,
                });
                tracing::info!(execution_id = %exec_id, ?elapsed, "execution finished");
            }
            Outcome::Failed { class, message } => {
                self.metrics.counter("executions_failed_total").inc();
                if class == "timeout" {
                    self.events.emit(ExecutionEvent::TimedOut {
                        execution_id: exec_id,
                    });
                }
                self.events.emit(ExecutionEvent::Failed {
                    execution_id: exec_id,
                    class: class.to_owned(),
                    error: message.clone(),
                });
                tracing::warn!(execution_id = %exec_id, class, error = %message, "execution failed");
            }
        }
        Ok(())
    }

    async fn invoke(&self, request: &ExecutionRequest) -> Outcome {
        let handler = match self.registry.get(request.func_name) {
            Ok(handler) => handler,
            Err(err) => {
                return Outcome::Failed {
                    class: "internal",
                    message: err.to_string(),
                };
            }
        };
        let recorder: Arc<dyn StepRecorder> = Arc::new(RepoStepRecorder {
            repo: Arc::clone(&self.repo),
        });
        let ctx = OperationContext::new(request.exec_id, request.user.clone(), recorder);
        let timeout = self.config.watchdog_timeout();
        let run = handler.execute(request.input_params.clone(), &ctx);

        match tokio::time::timeout(timeout, run).await {
            Ok(Ok(output)) => Outcome::Finished(output),
            Ok(Err(err)) => Outcome::Failed {
                class: err.class().as_str(),
                message: err.to_string(),
            },
            Err(_) => Outcome::Failed {
                class: "timeout",
                message: format!("handler did not finish within {timeout:?}"),
            },
        }
    }

    /// Write the terminal state. `None` means the result was discarded
    /// because the request was deleted or already failed by the watchdog.
    async fn complete(
        &self,
        exec_id: ExecutionId,
        outcome: &Outcome,
    ) -> Result<Option<ExecutionRequest>, ServiceError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let Some(mut request) = self.repo.get(exec_id).await? else {
                tracing::warn!(execution_id = %exec_id, "request deleted while running");
                return Ok(None);
            };
            if request.status != RequestStatus::Running {
                tracing::warn!(
                    execution_id = %exec_id,
                    status = %request.status,
                    "discarding late result"
                );
                return Ok(None);
            }
            let expected = request.version;
            match outcome {
                Outcome::Finished(output) => request.finish(output.clone())?,
                Outcome::Failed { class, message } => request.fail(class, message.clone())?,
            }
            if self.repo.update(&request, expected).await? {
                return Ok(Some(request));
            }
        }
        Err(ServiceError::InternalError(format!(
            "could not record the result of {exec_id}: version contention"
        )))
    }

    async fn requeue(&self, task_id: &str, exec_id: ExecutionId) -> Result<(), ServiceError> {
        let attempt = {
            let mut entry = self.attempts.entry(exec_id).or_insert(0);
            *entry += 1;
            *entry
        };
        let delay = self.config.lock_backoff(attempt);
        self.queue.nack(task_id, delay).await?;
        self.metrics.counter("executions_requeued_total").inc();
        self.events.emit(ExecutionEvent::Requeued {
            execution_id: exec_id,
            attempt,
            delay,
        });
        tracing::debug!(execution_id = %exec_id, attempt, ?delay, "resource busy, requeued");
        Ok(())
    }

    async fn drop_task(&self, task_id: &str, task: &Task) -> Result<(), ServiceError> {
        if let Some(key) = &task.resource {
            self.locks.forget(key, task.exec_id);
        }
        self.attempts.remove(&task.exec_id);
        self.queue.ack(task_id).await?;
        Ok(())
    }

    /// Another delivery of the same request won the `ready → running` swap.
    /// The lock is ours to give back only when nobody is running the request.
    async fn lost_start(
        &self,
        task_id: &str,
        task: &Task,
        lock: Option<&ResourceKey>,
    ) -> Result<(), ServiceError> {
        let exec_id = task.exec_id;
        let current = self.repo.get(exec_id).await?;
        match current.as_ref().map(|request| request.status) {
            Some(RequestStatus::Running) => {
                tracing::debug!(execution_id = %exec_id, "lost the race to start");
                self.attempts.remove(&exec_id);
                self.queue.ack(task_id).await?;
                Ok(())
            }
            Some(RequestStatus::Ready) => {
                tracing::debug!(execution_id = %exec_id, "request changed before start, retrying");
                self.requeue(task_id, exec_id).await
            }
            status => {
                tracing::debug!(execution_id = %exec_id, ?status, "request settled elsewhere, releasing lock");
                self.release(lock, exec_id);
                self.drop_task(task_id, task).await
            }
        }
    }

    fn release(&self, lock: Option<&ResourceKey>, exec_id: ExecutionId) {
        if let Some(key) = lock {
            self.locks.release(key, exec_id);
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Persists handler progress markers on the request record.
struct RepoStepRecorder {
    repo: Arc<dyn ExecutionRepo>,
}

#[async_trait]
impl StepRecorder for RepoStepRecorder {
    async fn record(&self, exec_id: ExecutionId, step: &str) {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let mut request = match self.repo.get(exec_id).await {
                Ok(Some(request)) if request.status == RequestStatus::Running => request,
                Ok(_) => return,
                Err(err) => {
                    tracing::warn!(execution_id = %exec_id, error = %err, "could not record step");
                    return;
                }
            };
            let expected = request.version;
            request.set_step(step);
            match self.repo.update(&request, expected).await {
                Ok(true) => return,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(execution_id = %exec_id, error = %err, "could not record step");
                    return;
                }
            }
        }
    }
}

//! The runtime facade: request store, dispatcher and watchdog wired over
//! one repository and one queue.

use std::sync::Arc;

use geocat_execution::{ExecutionRequest, FuncName};
use geocat_ports::{ExecutionRepo, TaskQueue};
use geocat_telemetry::{EventBus, ExecutionEvent, MetricsRegistry};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RuntimeConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ServiceError;
use crate::locks::ResourceLocks;
use crate::registry::HandlerRegistry;
use crate::store::RequestStore;
use crate::watchdog::Watchdog;

/// Entry point for submitting operations and running workers.
pub struct Runtime {
    store: RequestStore,
    dispatcher: Arc<Dispatcher>,
    watchdog: Arc<Watchdog>,
    events: Arc<EventBus<ExecutionEvent>>,
    metrics: Arc<MetricsRegistry>,
    config: RuntimeConfig,
}

impl Runtime {
    /// Wire a runtime.
    pub fn new(
        repo: Arc<dyn ExecutionRepo>,
        queue: Arc<dyn TaskQueue>,
        registry: Arc<HandlerRegistry>,
        events: Arc<EventBus<ExecutionEvent>>,
        metrics: Arc<MetricsRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        let locks = Arc::new(ResourceLocks::new());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&repo),
            queue,
            registry,
            Arc::clone(&locks),
            Arc::clone(&events),
            Arc::clone(&metrics),
            config.clone(),
        ));
        let watchdog = Arc::new(Watchdog::new(
            Arc::clone(&repo),
            locks,
            Arc::clone(&events),
            Arc::clone(&metrics),
            config.watchdog_timeout(),
            config.watchdog_interval(),
        ));
        Self {
            store: RequestStore::new(repo),
            dispatcher,
            watchdog,
            events,
            metrics,
            config,
        }
    }

    /// Validate and persist a request, then queue it. Returns the request
    /// as persisted, still `ready`.
    ///
    /// Validation failures create nothing. If queueing fails the request is
    /// deleted again so no orphan stays `ready` forever.
    pub async fn submit(
        &self,
        user: &str,
        func_name: FuncName,
        input: &Value,
    ) -> Result<ExecutionRequest, ServiceError> {
        let exec_id = self.store.create(user, func_name, input).await?;
        let request = self.store.get(exec_id).await?;
        if let Err(err) = self.dispatcher.dispatch(exec_id).await {
            tracing::error!(execution_id = %exec_id, error = %err, "dispatch failed, dropping request");
            if let Err(cleanup) = self.store.delete(user, exec_id).await {
                tracing::warn!(execution_id = %exec_id, error = %cleanup, "could not drop undispatched request");
            }
            return Err(err);
        }
        self.metrics.counter("executions_submitted_total").inc();
        Ok(request)
    }

    /// Start the workers and the watchdog. Everything stops when `shutdown`
    /// is cancelled; await the handles to wait for in-flight work.
    pub fn start(&self, shutdown: &CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = self.dispatcher.spawn_workers(shutdown);
        handles.push(Arc::clone(&self.watchdog).spawn(shutdown.clone()));
        tracing::info!(workers = self.config.workers, "runtime started");
        handles
    }

    /// The request store.
    #[must_use]
    pub fn store(&self) -> &RequestStore {
        &self.store
    }

    /// The dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The watchdog.
    #[must_use]
    pub fn watchdog(&self) -> &Arc<Watchdog> {
        &self.watchdog
    }

    /// Dispatcher lifecycle events.
    #[must_use]
    pub fn events(&self) -> &Arc<EventBus<ExecutionEvent>> {
        &self.events
    }

    /// Runtime metrics.
    #[must_use]
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

//! Shared fixtures: a runtime over the in-memory drivers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use geocat_catalog::{PermissionDefaults, ResourceManager};
use geocat_core::{ExecutionId, Principal, ResourceKey};
use geocat_execution::{ExecutionRequest, RequestStatus};
use geocat_ports::ExecutionRepo;
use geocat_queue_memory::MemoryQueue;
use geocat_runtime::{HandlerRegistry, Runtime, RuntimeConfig};
use geocat_storage_memory::{MemoryDirectory, MemoryExecutionRepo, MemoryResourceRepo};
use geocat_telemetry::{EventBus, ExecutionEvent, MetricsRegistry};
use serde_json::json;

pub struct Harness {
    pub runtime: Runtime,
    pub manager: Arc<ResourceManager>,
    pub registry: Arc<HandlerRegistry>,
    pub repo: Arc<MemoryExecutionRepo>,
    pub events: Arc<EventBus<ExecutionEvent>>,
}

pub fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        workers: 2,
        dequeue_timeout_ms: 10,
        lock_backoff_ms: 5,
        max_lock_backoff_ms: 40,
        ..RuntimeConfig::default()
    }
}

pub fn harness(config: RuntimeConfig) -> Harness {
    harness_over(config, |repo| -> Arc<dyn ExecutionRepo> { repo })
}

/// Like [`harness`], but the runtime talks to the execution repo through
/// `wrap`. `Harness::repo` stays the underlying in-memory repo.
pub fn harness_over(
    config: RuntimeConfig,
    wrap: impl FnOnce(Arc<MemoryExecutionRepo>) -> Arc<dyn ExecutionRepo>,
) -> Harness {
    let directory = MemoryDirectory::new()
        .with_user(Principal::superuser("root"))
        .with_user(Principal::user("alice").with_add_resource())
        .with_user(Principal::user("bob"));
    let manager = Arc::new(ResourceManager::new(
        Arc::new(MemoryResourceRepo::new()),
        Arc::new(directory),
        Arc::new(EventBus::new(64)),
        PermissionDefaults::default(),
    ));
    let registry = Arc::new(HandlerRegistry::with_defaults(&manager));
    let repo = Arc::new(MemoryExecutionRepo::new());
    let events = Arc::new(EventBus::new(256));
    let runtime = Runtime::new(
        wrap(Arc::clone(&repo)),
        Arc::new(MemoryQueue::new(config.queue_capacity)),
        Arc::clone(&registry),
        Arc::clone(&events),
        Arc::new(MetricsRegistry::new()),
        config,
    );
    Harness {
        runtime,
        manager,
        registry,
        repo,
        events,
    }
}

pub fn key(raw: &str) -> ResourceKey {
    ResourceKey::new(raw).unwrap()
}

impl Harness {
    /// Create `uuid` owned by alice and run the request to completion.
    pub async fn seed(&self, uuid: &str, resource_type: &str) {
        self.runtime
            .submit(
                "alice",
                geocat_execution::FuncName::Create,
                &json!({"uuid": uuid, "resource_type": resource_type, "defaults": {"owner": "alice"}}),
            )
            .await
            .unwrap();
        self.runtime.dispatcher().drain().await.unwrap();
        assert!(self.manager.find(&key(uuid)).await.unwrap().is_some());
    }

    pub async fn request(&self, exec_id: ExecutionId) -> ExecutionRequest {
        self.runtime.store().get(exec_id).await.unwrap()
    }

    /// Poll until the request reaches `status`, failing after two seconds.
    pub async fn wait_for(&self, exec_id: ExecutionId, status: RequestStatus) -> ExecutionRequest {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let request = self.request(exec_id).await;
            if request.status == status {
                return request;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "{exec_id} stuck in {} waiting for {status}",
                request.status
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

//! Stuck `running` requests and the results that arrive after the sweep.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::{fast_config, harness, key};
use geocat_core::ExecutionId;
use geocat_execution::{ExecutionRequest, FuncName, RequestStatus};
use geocat_operations::{OperationContext, OperationError, OperationHandler};
use geocat_ports::ExecutionRepo;
use geocat_runtime::{ResourceLocks, Watchdog};
use geocat_storage_memory::MemoryExecutionRepo;
use geocat_telemetry::{EventBus, ExecutionEvent, MetricsRegistry};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

fn running_since(seconds_ago: i64) -> ExecutionRequest {
    let mut request = ExecutionRequest::new(
        "alice",
        FuncName::Update,
        json!({"uuid": "r1"}),
        Some(key("r1")),
    );
    request.start().unwrap();
    request.started = Some(Utc::now() - chrono::Duration::seconds(seconds_ago));
    request
}

struct Fixture {
    repo: Arc<MemoryExecutionRepo>,
    locks: Arc<ResourceLocks>,
    events: Arc<EventBus<ExecutionEvent>>,
    watchdog: Watchdog,
}

fn fixture(timeout: Duration) -> Fixture {
    let repo = Arc::new(MemoryExecutionRepo::new());
    let locks = Arc::new(ResourceLocks::new());
    let events = Arc::new(EventBus::new(16));
    let watchdog = Watchdog::new(
        repo.clone(),
        Arc::clone(&locks),
        Arc::clone(&events),
        Arc::new(MetricsRegistry::new()),
        timeout,
        Duration::from_millis(10),
    );
    Fixture {
        repo,
        locks,
        events,
        watchdog,
    }
}

fn hold(locks: &ResourceLocks, id: ExecutionId) {
    locks.admit(&key("r1"), id);
    assert!(locks.try_acquire(&key("r1"), id));
}

#[tokio::test]
async fn sweep_fails_expired_requests_and_frees_their_lock() {
    let f = fixture(Duration::from_secs(60));
    let stuck = running_since(120);
    f.repo.insert(&stuck).await.unwrap();
    hold(&f.locks, stuck.exec_id);
    let mut events = f.events.subscribe();

    let expired = f.watchdog.sweep().await.unwrap();

    assert_eq!(expired.len(), 1);
    let stored = f.repo.get(stuck.exec_id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Failed);
    assert_eq!(stored.log.last().unwrap().class.as_deref(), Some("timeout"));
    assert!(f.locks.holder(&key("r1")).is_none());
    assert_eq!(
        events.drain(),
        vec![ExecutionEvent::TimedOut {
            execution_id: stuck.exec_id
        }]
    );
}

#[tokio::test]
async fn sweep_leaves_recent_and_idle_requests_alone() {
    let f = fixture(Duration::from_secs(60));
    let recent = running_since(5);
    let ready = ExecutionRequest::new("alice", FuncName::Delete, json!({"uuid": "r2"}), Some(key("r2")));
    f.repo.insert(&recent).await.unwrap();
    f.repo.insert(&ready).await.unwrap();
    hold(&f.locks, recent.exec_id);

    assert!(f.watchdog.sweep().await.unwrap().is_empty());
    assert_eq!(
        f.repo.get(recent.exec_id).await.unwrap().unwrap().status,
        RequestStatus::Running
    );
    assert_eq!(f.locks.holder(&key("r1")), Some(recent.exec_id));
}

#[tokio::test]
async fn spawned_watchdog_stops_on_shutdown() {
    let f = fixture(Duration::from_secs(60));
    let stuck = running_since(600);
    f.repo.insert(&stuck).await.unwrap();

    let shutdown = CancellationToken::new();
    let handle = Arc::new(f.watchdog).spawn(shutdown.clone());
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();
    handle.await.unwrap();

    assert_eq!(
        f.repo.get(stuck.exec_id).await.unwrap().unwrap().status,
        RequestStatus::Failed
    );
}

/// Waits for a permit, then reports success.
struct Gated(Arc<Semaphore>);

#[async_trait]
impl OperationHandler for Gated {
    fn func(&self) -> FuncName {
        FuncName::Update
    }

    async fn execute(&self, _input: Value, _ctx: &OperationContext) -> Result<Value, OperationError> {
        self.0
            .acquire()
            .await
            .map_err(|e| OperationError::Internal(e.to_string()))?
            .forget();
        Ok(json!("late"))
    }
}

#[tokio::test]
async fn late_results_are_discarded() {
    let h = harness(fast_config());
    let gate = Arc::new(Semaphore::new(0));
    h.registry.register(Arc::new(Gated(Arc::clone(&gate))));
    let shutdown = CancellationToken::new();
    let handles = h.runtime.dispatcher().spawn_workers(&shutdown);

    let exec_id = h
        .runtime
        .submit("alice", FuncName::Update, &json!({"uuid": "r1"}))
        .await
        .unwrap()
        .exec_id;
    h.wait_for(exec_id, RequestStatus::Running).await;

    // Same repository and locks as the workers, zero tolerance.
    let impatient = Watchdog::new(
        h.repo.clone(),
        Arc::clone(h.runtime.dispatcher().locks()),
        Arc::clone(&h.events),
        Arc::new(MetricsRegistry::new()),
        Duration::ZERO,
        Duration::from_secs(1),
    );
    assert_eq!(impatient.sweep().await.unwrap().len(), 1);
    let failed = h.request(exec_id).await;

    gate.add_permits(1);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let after = h.request(exec_id).await;
    assert_eq!(after.status, RequestStatus::Failed);
    assert_eq!(after.output_params, json!({}));
    assert_eq!(after, failed);

    shutdown.cancel();
    for handle in handles {
        handle.await.unwrap();
    }
    assert!(h.runtime.dispatcher().locks().is_empty());
}

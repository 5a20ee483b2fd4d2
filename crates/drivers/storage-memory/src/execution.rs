//! In-memory execution request store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use geocat_core::ExecutionId;
use geocat_execution::{ExecutionRequest, RequestStatus};
use geocat_ports::{ExecutionRepo, PortsError};

/// Execution requests keyed by id. Each record carries its insertion
/// sequence so per-user listings come back in creation order.
#[derive(Debug, Default)]
pub struct MemoryExecutionRepo {
    requests: DashMap<ExecutionId, (u64, ExecutionRequest)>,
    sequence: AtomicU64,
}

impl MemoryExecutionRepo {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn collect(&self, keep: impl Fn(&ExecutionRequest) -> bool) -> Vec<ExecutionRequest> {
        let mut found: Vec<(u64, ExecutionRequest)> = self
            .requests
            .iter()
            .filter(|entry| keep(&entry.value().1))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|(seq, _)| *seq);
        found.into_iter().map(|(_, request)| request).collect()
    }
}

#[async_trait]
impl ExecutionRepo for MemoryExecutionRepo {
    async fn insert(&self, request: &ExecutionRequest) -> Result<(), PortsError> {
        match self.requests.entry(request.exec_id) {
            Entry::Occupied(_) => Err(PortsError::already_exists(
                "ExecutionRequest",
                request.exec_id.to_string(),
            )),
            Entry::Vacant(slot) => {
                let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, request.clone()));
                Ok(())
            }
        }
    }

    async fn get(&self, id: ExecutionId) -> Result<Option<ExecutionRequest>, PortsError> {
        Ok(self.requests.get(&id).map(|entry| entry.value().1.clone()))
    }

    async fn update(
        &self,
        request: &ExecutionRequest,
        expected_version: u64,
    ) -> Result<bool, PortsError> {
        match self.requests.entry(request.exec_id) {
            Entry::Occupied(mut slot) => {
                let (seq, stored) = slot.get();
                if stored.version != expected_version {
                    return Ok(false);
                }
                let seq = *seq;
                slot.insert((seq, request.clone()));
                Ok(true)
            }
            Entry::Vacant(_) => Err(PortsError::not_found(
                "ExecutionRequest",
                request.exec_id.to_string(),
            )),
        }
    }

    async fn delete(&self, id: ExecutionId) -> Result<bool, PortsError> {
        Ok(self.requests.remove(&id).is_some())
    }

    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<ExecutionRequest>, PortsError> {
        Ok(self.collect(|request| request.status == status))
    }

    async fn list_for_user(&self, user: &str) -> Result<Vec<ExecutionRequest>, PortsError> {
        Ok(self.collect(|request| request.is_owned_by(user)))
    }
}

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Queue Memory Driver
//!
//! In-memory bounded task queue implementing the [`TaskQueue`] port.
//!
//! Uses `tokio::sync::mpsc` for the main queue channel and a map of
//! in-flight tasks for ack/nack semantics. A delayed nack parks the task on
//! a timer task and feeds it back into the channel when the delay elapses.
//!
//! Suitable for single-process deployments and tests where durability is
//! not required.
//!
//! # Examples
//!
//! ```rust,no_run
//! use geocat_queue_memory::MemoryQueue;
//! use geocat_ports::TaskQueue;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = MemoryQueue::new(1024);
//! queue.enqueue(serde_json::json!({"exec_id": "..."})).await?;
//! if let Some((id, _payload)) = queue.dequeue(Duration::from_secs(1)).await? {
//!     queue.ack(&id).await?;
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use geocat_ports::TaskQueue;
use geocat_ports::error::PortsError;
use tokio::sync::{Mutex, mpsc};

/// An item in the queue: task ID + payload.
#[derive(Debug, Clone)]
struct QueueItem {
    id: String,
    payload: serde_json::Value,
}

/// In-memory bounded task queue.
///
/// Tasks flow through four states:
/// 1. **Queued** -- sitting in the mpsc channel
/// 2. **In-flight** -- dequeued, awaiting ack/nack
/// 3. **Delayed** -- nacked with a delay, waiting on a timer
/// 4. **Done** -- acked (removed)
pub struct MemoryQueue {
    sender: mpsc::Sender<QueueItem>,
    receiver: Mutex<mpsc::Receiver<QueueItem>>,
    in_flight: Mutex<HashMap<String, QueueItem>>,
    queued: Arc<AtomicUsize>,
    delayed: Arc<AtomicUsize>,
}

impl MemoryQueue {
    /// Create a new memory queue with the given capacity.
    ///
    /// Enqueue fails with `PortsError::Internal` when the channel is full.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: Mutex::new(receiver),
            in_flight: Mutex::new(HashMap::new()),
            queued: Arc::new(AtomicUsize::new(0)),
            delayed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Tasks dequeued but not yet acked or nacked.
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    fn requeue_later(&self, item: QueueItem, delay: Duration) {
        let sender = self.sender.clone();
        let queued = Arc::clone(&self.queued);
        let delayed = Arc::clone(&self.delayed);
        delayed.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let id = item.id.clone();
            // Count as queued before leaving the delayed set so `len` never
            // dips to zero in between.
            queued.fetch_add(1, Ordering::SeqCst);
            delayed.fetch_sub(1, Ordering::SeqCst);
            if sender.send(item).await.is_err() {
                queued.fetch_sub(1, Ordering::SeqCst);
                tracing::warn!(task_id = %id, "queue closed, dropping delayed task");
            }
        });
    }
}

impl std::fmt::Debug for MemoryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryQueue")
            .field("queued", &self.queued.load(Ordering::Relaxed))
            .field("delayed", &self.delayed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TaskQueue for MemoryQueue {
    async fn enqueue(&self, payload: serde_json::Value) -> Result<String, PortsError> {
        let id = uuid::Uuid::new_v4().to_string();
        let item = QueueItem {
            id: id.clone(),
            payload,
        };
        self.sender
            .try_send(item)
            .map_err(|e| PortsError::Internal(format!("queue full or closed: {e}")))?;
        self.queued.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn dequeue(
        &self,
        timeout: Duration,
    ) -> Result<Option<(String, serde_json::Value)>, PortsError> {
        let mut rx = self.receiver.lock().await;
        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(item)) => {
                let id = item.id.clone();
                let payload = item.payload.clone();
                // In flight before leaving the queued count, same reason as
                // in `requeue_later`.
                self.in_flight.lock().await.insert(id.clone(), item);
                self.queued.fetch_sub(1, Ordering::SeqCst);
                Ok(Some((id, payload)))
            }
            // Closed channel or timeout.
            Ok(None) | Err(_) => Ok(None),
        }
    }

    async fn ack(&self, task_id: &str) -> Result<(), PortsError> {
        let removed = self.in_flight.lock().await.remove(task_id);
        if removed.is_none() {
            return Err(PortsError::not_found("Task", task_id));
        }
        Ok(())
    }

    async fn nack(&self, task_id: &str, delay: Duration) -> Result<(), PortsError> {
        let mut in_flight = self.in_flight.lock().await;
        let Some(item) = in_flight.remove(task_id) else {
            return Err(PortsError::not_found("Task", task_id));
        };
        if delay.is_zero() {
            if let Err(e) = self.sender.try_send(item) {
                return Err(PortsError::Internal(format!("requeue failed: {e}")));
            }
            self.queued.fetch_add(1, Ordering::SeqCst);
        } else {
            self.requeue_later(item, delay);
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize, PortsError> {
        let in_flight = self.in_flight.lock().await.len();
        Ok(self.queued.load(Ordering::SeqCst) + self.delayed.load(Ordering::SeqCst) + in_flight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn enqueue_and_dequeue() {
        let q = MemoryQueue::new(16);
        let payload = json!({"exec_id": "e1"});
        let task_id = q.enqueue(payload.clone()).await.unwrap();
        assert!(!task_id.is_empty());

        let (id, p) = q.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(id, task_id);
        assert_eq!(p, payload);
    }

    #[tokio::test]
    async fn dequeue_returns_none_on_timeout() {
        let q = MemoryQueue::new(16);
        let item = q.dequeue(Duration::from_millis(20)).await.unwrap();
        assert!(item.is_none());
    }

    #[tokio::test]
    async fn double_ack_is_not_found() {
        let q = MemoryQueue::new(16);
        q.enqueue(json!("e1")).await.unwrap();
        let (id, _) = q.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();

        q.ack(&id).await.unwrap();
        assert!(matches!(q.ack(&id).await, Err(PortsError::NotFound { .. })));
    }

    #[tokio::test]
    async fn immediate_nack_requeues() {
        let q = MemoryQueue::new(16);
        let task_id = q.enqueue(json!({"retry": true})).await.unwrap();
        let (id, _) = q.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();

        q.nack(&id, Duration::ZERO).await.unwrap();

        let (again, payload) = q.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(again, task_id);
        assert_eq!(payload, json!({"retry": true}));
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_nack_waits_out_the_delay() {
        let q = MemoryQueue::new(16);
        q.enqueue(json!("e1")).await.unwrap();
        let (id, _) = q.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();

        q.nack(&id, Duration::from_secs(5)).await.unwrap();
        assert_eq!(q.len().await.unwrap(), 1);
        assert!(q.dequeue(Duration::from_secs(1)).await.unwrap().is_none());

        let (again, _) = q.dequeue(Duration::from_secs(10)).await.unwrap().unwrap();
        assert_eq!(again, id);
    }

    #[tokio::test]
    async fn len_counts_queued_and_in_flight() {
        let q = MemoryQueue::new(16);
        assert!(q.is_empty().await.unwrap());

        q.enqueue(json!(1)).await.unwrap();
        q.enqueue(json!(2)).await.unwrap();
        assert_eq!(q.len().await.unwrap(), 2);

        let (id, _) = q.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(q.len().await.unwrap(), 2);
        assert_eq!(q.in_flight().await, 1);

        q.ack(&id).await.unwrap();
        assert_eq!(q.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn enqueue_fails_when_full() {
        let q = MemoryQueue::new(1);
        q.enqueue(json!("first")).await.unwrap();
        assert!(q.enqueue(json!("second")).await.is_err());
    }

    #[tokio::test]
    async fn nack_unknown_task_returns_not_found() {
        let q = MemoryQueue::new(16);
        assert!(q.nack("nonexistent", Duration::ZERO).await.is_err());
    }

    #[tokio::test]
    async fn fifo_ordering() {
        let q = MemoryQueue::new(16);
        for n in 1..=3 {
            q.enqueue(json!(n)).await.unwrap();
        }
        for n in 1..=3 {
            let (id, p) = q.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
            assert_eq!(p, json!(n));
            q.ack(&id).await.unwrap();
        }
    }
}

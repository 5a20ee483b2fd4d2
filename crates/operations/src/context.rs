//! What a handler sees of the request it runs for.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use geocat_core::ExecutionId;

/// Persists progress markers reported by handlers.
///
/// Implemented by the runtime; failures are logged and otherwise ignored
/// since the step is advisory.
#[async_trait]
pub trait StepRecorder: Send + Sync {
    /// Record `step` as the current progress marker of `exec_id`.
    async fn record(&self, exec_id: ExecutionId, step: &str);
}

/// Discards every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

#[async_trait]
impl StepRecorder for NoopRecorder {
    async fn record(&self, _exec_id: ExecutionId, _step: &str) {}
}

/// Per-invocation context handed to an operation.
#[derive(Clone)]
pub struct OperationContext {
    exec_id: ExecutionId,
    user: String,
    recorder: Arc<dyn StepRecorder>,
}

impl OperationContext {
    /// Context for `exec_id` requested by `user`.
    pub fn new(exec_id: ExecutionId, user: impl Into<String>, recorder: Arc<dyn StepRecorder>) -> Self {
        Self {
            exec_id,
            user: user.into(),
            recorder,
        }
    }

    /// A context that records nothing.
    pub fn detached(exec_id: ExecutionId, user: impl Into<String>) -> Self {
        Self::new(exec_id, user, Arc::new(NoopRecorder))
    }

    /// The request being run.
    #[must_use]
    pub fn exec_id(&self) -> ExecutionId {
        self.exec_id
    }

    /// Who asked for it.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Report progress.
    pub async fn set_step(&self, step: &str) {
        tracing::debug!(execution_id = %self.exec_id, step, "operation step");
        self.recorder.record(self.exec_id, step).await;
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("exec_id", &self.exec_id)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

//! Dispatcher tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The `runtime` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Worker tasks consuming the queue.
    pub workers: usize,
    /// Capacity of the task queue.
    pub queue_capacity: usize,
    /// How long an idle worker waits on the queue before polling again.
    pub dequeue_timeout_ms: u64,
    /// First re-queue delay when a resource lock is busy.
    pub lock_backoff_ms: u64,
    /// Cap of the doubling re-queue delay.
    pub max_lock_backoff_ms: u64,
    /// Bound on one handler invocation and on time spent `running`.
    pub watchdog_timeout_secs: u64,
    /// Period of the stuck-request sweep.
    pub watchdog_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
            dequeue_timeout_ms: 250,
            lock_backoff_ms: 50,
            max_lock_backoff_ms: 2_000,
            watchdog_timeout_secs: 600,
            watchdog_interval_secs: 30,
        }
    }
}

impl RuntimeConfig {
    /// Idle queue wait.
    #[must_use]
    pub fn dequeue_timeout(&self) -> Duration {
        Duration::from_millis(self.dequeue_timeout_ms)
    }

    /// Handler and watchdog bound.
    #[must_use]
    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_secs(self.watchdog_timeout_secs)
    }

    /// Watchdog period.
    #[must_use]
    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_secs(self.watchdog_interval_secs)
    }

    /// Re-queue delay for the `attempt`-th busy lock (1-based): doubles per
    /// attempt up to `max_lock_backoff_ms`.
    #[must_use]
    pub fn lock_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(20);
        let ms = self
            .lock_backoff_ms
            .saturating_mul(factor)
            .min(self.max_lock_backoff_ms);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 50)]
    #[case(2, 100)]
    #[case(3, 200)]
    #[case(7, 2_000)]
    #[case(60, 2_000)]
    fn backoff_doubles_then_caps(#[case] attempt: u32, #[case] ms: u64) {
        assert_eq!(
            RuntimeConfig::default().lock_backoff(attempt),
            Duration::from_millis(ms)
        );
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let config: RuntimeConfig = serde_json::from_str(r#"{"workers": 8}"#).unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.lock_backoff_ms, 50);
    }
}

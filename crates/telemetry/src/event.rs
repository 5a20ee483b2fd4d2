//! Execution and resource events.
//!
//! Events are **projections**, not the source of truth: the execution
//! repository and the resource repository are.

use std::time::Duration;

use geocat_core::{ExecutionId, ResourceKey, ResourceType};
use serde::{Deserialize, Serialize};

/// Dispatcher lifecycle events for execution requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// A worker moved the request to `running`.
    Started {
        /// The request.
        execution_id: ExecutionId,
        /// Verb being run.
        func_name: String,
        /// Locked resource, if any.
        resource: Option<ResourceKey>,
    },
    /// The handler succeeded.
    Finished {
        /// The request.
        execution_id: ExecutionId,
        /// Time spent running.
        duration: Duration,
    },
    /// The handler failed.
    Failed {
        /// The request.
        execution_id: ExecutionId,
        /// Failure class (`user`, `transient`, `internal`).
        class: String,
        /// Error description.
        error: String,
    },
    /// The resource was busy; the request goes back to the queue.
    Requeued {
        /// The request.
        execution_id: ExecutionId,
        /// How many times it has been requeued so far.
        attempt: u32,
        /// How long before it is offered again.
        delay: Duration,
    },
    /// The request exceeded the watchdog timeout.
    TimedOut {
        /// The request.
        execution_id: ExecutionId,
    },
}

impl ExecutionEvent {
    /// The request the event is about.
    #[must_use]
    pub fn execution_id(&self) -> ExecutionId {
        match self {
            Self::Started { execution_id, .. }
            | Self::Finished { execution_id, .. }
            | Self::Failed { execution_id, .. }
            | Self::Requeued { execution_id, .. }
            | Self::TimedOut { execution_id } => *execution_id,
        }
    }
}

/// Resource side effects, emitted after the repository write commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ResourceEvent {
    /// A resource was created or ingested for the first time.
    Created {
        /// New resource.
        uuid: ResourceKey,
        /// Its type.
        resource_type: ResourceType,
        /// Its owner.
        owner: String,
    },
    /// A resource's content or metadata changed.
    Updated {
        /// The resource.
        uuid: ResourceKey,
        /// Whether subscribers asked to be notified.
        notify: bool,
    },
    /// A resource was deleted.
    Deleted {
        /// The former resource.
        uuid: ResourceKey,
    },
    /// A resource's ACL was replaced or stripped.
    PermissionsChanged {
        /// The resource.
        uuid: ResourceKey,
    },
    /// A resource was copied.
    Copied {
        /// The new resource.
        uuid: ResourceKey,
        /// Where it was copied from.
        source: ResourceKey,
    },
}

impl ResourceEvent {
    /// The resource the event is about.
    #[must_use]
    pub fn uuid(&self) -> &ResourceKey {
        match self {
            Self::Created { uuid, .. }
            | Self::Updated { uuid, .. }
            | Self::Deleted { uuid }
            | Self::PermissionsChanged { uuid }
            | Self::Copied { uuid, .. } => uuid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_events_are_tagged() {
        let id = ExecutionId::v4();
        let json = serde_json::to_value(ExecutionEvent::TimedOut { execution_id: id }).unwrap();
        assert_eq!(json["event"], "timed_out");
        assert_eq!(json["execution_id"], id.to_string());
    }

    #[test]
    fn resource_event_uuid() {
        let uuid = ResourceKey::new("r2").unwrap();
        let event = ResourceEvent::Copied {
            uuid: uuid.clone(),
            source: ResourceKey::new("r1").unwrap(),
        };
        assert_eq!(event.uuid(), &uuid);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "copied");
        assert_eq!(json["source"], "r1");
    }
}

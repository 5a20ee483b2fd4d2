//! The persisted execution request.

use chrono::{DateTime, Utc};
use geocat_core::{ExecutionId, ResourceKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ExecutionError;
use crate::func::FuncName;
use crate::journal::LogEntry;
use crate::status::RequestStatus;
use crate::transition::validate_transition;

/// One requested operation and its lifecycle.
///
/// Every mutator bumps `version` and `last_updated`; repositories persist
/// with compare-and-swap on the version the caller loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// External handle.
    pub exec_id: ExecutionId,
    /// Username of the requester.
    pub user: String,
    /// Selects the handler.
    pub func_name: FuncName,
    /// Validated at creation, immutable thereafter.
    pub input_params: Value,
    /// `{"output": ...}` once finished, `{}` before.
    pub output_params: Value,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Free-text progress marker.
    #[serde(default)]
    pub step: Option<String>,
    /// Append-only diagnostic trail.
    #[serde(default)]
    pub log: Vec<LogEntry>,
    /// When the request was persisted.
    pub created: DateTime<Utc>,
    /// When a worker started it.
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    /// When it reached a terminal state.
    #[serde(default)]
    pub finished: Option<DateTime<Utc>>,
    /// Last persisted change.
    pub last_updated: DateTime<Utc>,
    /// The resource the operation targets.
    #[serde(rename = "geonode_resource", default)]
    pub resource: Option<ResourceKey>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl ExecutionRequest {
    /// A new request in `ready`.
    pub fn new(
        user: impl Into<String>,
        func_name: FuncName,
        input_params: Value,
        resource: Option<ResourceKey>,
    ) -> Self {
        let now = Utc::now();
        Self {
            exec_id: ExecutionId::v4(),
            user: user.into(),
            func_name,
            input_params,
            output_params: Value::Object(Map::new()),
            status: RequestStatus::Ready,
            step: None,
            log: Vec::new(),
            created: now,
            started: None,
            finished: None,
            last_updated: now,
            resource,
            version: 0,
        }
    }

    /// Whether the request reached `finished` or `failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the request belongs to `username`.
    #[must_use]
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.user == username
    }

    /// The lock key: the target resource of a mutating verb.
    #[must_use]
    pub fn lock_key(&self) -> Option<&ResourceKey> {
        self.resource
            .as_ref()
            .filter(|_| self.func_name.is_mutating())
    }

    fn touch(&mut self) {
        self.version += 1;
        self.last_updated = Utc::now();
    }

    fn transition_status(&mut self, to: RequestStatus) -> Result<(), ExecutionError> {
        if let Err(err) = validate_transition(self.status, to) {
            tracing::error!(
                execution_id = %self.exec_id,
                from = %self.status,
                to = %to,
                "rejected execution request transition"
            );
            return Err(err);
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    /// `ready → running`, recording `started`.
    pub fn start(&mut self) -> Result<(), ExecutionError> {
        self.transition_status(RequestStatus::Running)?;
        self.started = Some(self.last_updated);
        Ok(())
    }

    /// `running → finished`, wrapping the handler result as
    /// `{"output": result}`.
    pub fn finish(&mut self, output: Value) -> Result<(), ExecutionError> {
        self.transition_status(RequestStatus::Finished)?;
        let mut params = Map::new();
        params.insert("output".to_owned(), output);
        self.output_params = Value::Object(params);
        self.finished = Some(self.last_updated);
        Ok(())
    }

    /// `running → failed`, appending the error to `log`.
    pub fn fail(&mut self, class: &str, message: impl Into<String>) -> Result<(), ExecutionError> {
        self.transition_status(RequestStatus::Failed)?;
        self.log.push(LogEntry::error(class, message));
        self.finished = Some(self.last_updated);
        Ok(())
    }

    /// Update the progress marker.
    pub fn set_step(&mut self, step: impl Into<String>) {
        self.step = Some(step.into());
        self.touch();
    }

    /// Append a log entry.
    pub fn append_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request() -> ExecutionRequest {
        ExecutionRequest::new(
            "alice",
            FuncName::Delete,
            json!({"uuid": "r1"}),
            ResourceKey::new("r1").ok(),
        )
    }

    #[test]
    fn new_request_is_ready_and_empty() {
        let req = request();
        assert_eq!(req.status, RequestStatus::Ready);
        assert_eq!(req.output_params, json!({}));
        assert_eq!(req.version, 0);
        assert!(req.started.is_none());
    }

    #[test]
    fn happy_path_sets_timestamps_and_output() {
        let mut req = request();
        req.start().unwrap();
        assert_eq!(req.status, RequestStatus::Running);
        assert!(req.started.is_some());

        req.finish(json!(1)).unwrap();
        assert_eq!(req.status, RequestStatus::Finished);
        assert_eq!(req.output_params, json!({"output": 1}));
        assert!(req.finished.is_some());
        assert_eq!(req.version, 2);
    }

    #[test]
    fn failure_is_logged_with_class() {
        let mut req = request();
        req.start().unwrap();
        req.fail("user", "resource r1 not found").unwrap();
        assert_eq!(req.status, RequestStatus::Failed);
        assert_eq!(req.output_params, json!({}));
        let last = req.log.last().unwrap();
        assert_eq!(last.class.as_deref(), Some("user"));
    }

    #[test]
    fn terminal_request_is_never_mutated_by_a_transition() {
        let mut req = request();
        req.start().unwrap();
        req.finish(json!(0)).unwrap();
        let before = req.clone();

        assert!(matches!(
            req.fail("internal", "late"),
            Err(ExecutionError::InvalidTransition { .. })
        ));
        assert!(req.start().is_err());
        assert_eq!(req, before);
    }

    #[test]
    fn ready_cannot_finish_directly() {
        let mut req = request();
        assert!(req.finish(json!(null)).is_err());
        assert_eq!(req.status, RequestStatus::Ready);
    }

    #[test]
    fn resource_serializes_as_geonode_resource() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["geonode_resource"], "r1");
        assert_eq!(json["func_name"], "delete");
        assert_eq!(json["status"], "ready");
    }

    #[test]
    fn copy_takes_no_lock() {
        let req = ExecutionRequest::new(
            "bob",
            FuncName::Copy,
            json!({"instance": "r1", "owner": "bob"}),
            ResourceKey::new("r1").ok(),
        );
        assert!(req.lock_key().is_none());
        assert_eq!(request().lock_key().map(ResourceKey::as_str), Some("r1"));
    }
}

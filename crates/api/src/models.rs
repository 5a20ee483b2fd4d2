//! Request and response bodies.

use chrono::{DateTime, Utc};
use geocat_core::{ExecutionId, ResourceKey};
use geocat_execution::{ExecutionRequest, FuncName, LogEntry, RequestStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Answer to every mutating endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionAccepted {
    /// Status of the request when it was submitted.
    pub status: RequestStatus,
    /// Handle to poll.
    pub execution_id: ExecutionId,
    /// Where to poll.
    pub status_url: String,
}

impl ExecutionAccepted {
    /// Describe a freshly submitted request.
    #[must_use]
    pub fn from_request(request: &ExecutionRequest) -> Self {
        Self {
            status: request.status,
            execution_id: request.exec_id,
            status_url: status_url(request.exec_id),
        }
    }
}

/// Path of the status endpoint for `exec_id`.
#[must_use]
pub fn status_url(exec_id: ExecutionId) -> String {
    format!("/resource-service/execution-status/{exec_id}")
}

/// The execution status document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    /// Requester.
    pub user: String,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Verb.
    pub func_name: FuncName,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Terminal time, if any.
    pub finished: Option<DateTime<Utc>>,
    /// Last change.
    pub last_updated: DateTime<Utc>,
    /// Parameters as persisted.
    pub input_params: Value,
    /// `{"output": ...}` once finished.
    pub output_params: Value,
    /// Progress marker.
    pub step: Option<String>,
    /// Diagnostic trail.
    pub log: Vec<LogEntry>,
}

impl From<ExecutionRequest> for ExecutionStatus {
    fn from(request: ExecutionRequest) -> Self {
        Self {
            user: request.user,
            status: request.status,
            func_name: request.func_name,
            created: request.created,
            finished: request.finished,
            last_updated: request.last_updated,
            input_params: request.input_params,
            output_params: request.output_params,
            step: request.step,
            log: request.log,
        }
    }
}

/// Body of `POST /resources/create/{resource_type}` and, with `files`,
/// `POST /resources/ingest/{resource_type}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewResourceBody {
    /// Natural key; generated when absent.
    #[serde(default)]
    pub uuid: Option<ResourceKey>,
    /// Uploaded file references, ingest only.
    #[serde(default)]
    pub files: Option<Vec<String>>,
    /// Initial values; `owner` defaults to the caller.
    #[serde(default)]
    pub defaults: Map<String, Value>,
}

/// Body of `PUT /resources/{id}/copy`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopyBody {
    /// Owner of the copy; defaults to the caller.
    #[serde(default)]
    pub owner: Option<String>,
    /// Values overlaid on the source's metadata.
    #[serde(default)]
    pub defaults: Map<String, Value>,
}

//! State machine transition validation for execution requests.

use crate::error::ExecutionError;
use crate::status::RequestStatus;

/// Returns `true` if the transition from `from` to `to` is valid.
///
/// `ready → running → {finished | failed}`; terminal states admit nothing.
#[must_use]
pub fn can_transition(from: RequestStatus, to: RequestStatus) -> bool {
    matches!(
        (from, to),
        (RequestStatus::Ready, RequestStatus::Running)
            | (RequestStatus::Running, RequestStatus::Finished)
            | (RequestStatus::Running, RequestStatus::Failed)
    )
}

/// Validate a transition, returning an error if invalid.
pub fn validate_transition(from: RequestStatus, to: RequestStatus) -> Result<(), ExecutionError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(ExecutionError::InvalidTransition { from, to })
    }
}

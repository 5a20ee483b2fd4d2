//! `/resource-service/execution-status/{execution_id}`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use geocat_core::ExecutionId;

use crate::error::{ApiError, ApiResult};
use crate::models::ExecutionStatus;
use crate::state::{AppState, Caller};

fn execution_id(raw: &str) -> Result<ExecutionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid execution id: {raw}")))
}

/// Visible to the requester and to administrators.
pub(super) async fn get_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<ExecutionStatus> {
    let request = state.runtime.store().get(execution_id(&id)?).await?;
    if !(caller.0.is_admin() || caller.0.is(&request.user)) {
        return Err(ApiError::forbidden());
    }
    Ok(Json(request.into()))
}

/// Owner only. Deleting a queued request means it never runs.
pub(super) async fn delete_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .runtime
        .store()
        .delete(&caller.username(), execution_id(&id)?)
        .await?;
    Ok(StatusCode::OK)
}

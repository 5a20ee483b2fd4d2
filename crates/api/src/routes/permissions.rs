//! `/resources/{id}/permissions`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use geocat_catalog::RuleExt;
use geocat_catalog::policy::has_perm;
use geocat_execution::FuncName;
use geocat_permission::{CompactPermissionSpec, PermissionsInput};
use geocat_permission::codename::{
    CHANGE_RESOURCEBASE, CHANGE_RESOURCEBASE_PERMISSIONS, VIEW_RESOURCEBASE,
};
use serde_json::json;

use super::{authorize, body, load, submit};
use crate::error::{ApiError, ApiResult};
use crate::models::ExecutionAccepted;
use crate::state::{AppState, Caller};

pub(super) async fn get_permissions(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<CompactPermissionSpec> {
    let resource = load(&state, &id).await?;
    authorize(has_perm(VIEW_RESOURCEBASE), &caller.0, &resource)?;
    Ok(Json(state.manager.compact_permissions(&resource).await?))
}

pub(super) async fn put_permissions(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<PermissionsInput>, JsonRejection>,
) -> ApiResult<ExecutionAccepted> {
    let resource = load(&state, &id).await?;
    authorize(can_change_permissions(), &caller.0, &resource)?;
    let permissions = body(payload)?;
    permissions
        .to_extended(resource.resource_type)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let input = json!({
        "uuid": resource.uuid,
        "owner": resource.owner,
        "permissions": permissions,
    });
    submit(&state, &caller, FuncName::SetPermissions, input).await
}

/// Merge the body into the current ACL. Roles only ever go up.
pub(super) async fn patch_permissions(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<CompactPermissionSpec>, JsonRejection>,
) -> ApiResult<ExecutionAccepted> {
    let resource = load(&state, &id).await?;
    authorize(can_change_permissions(), &caller.0, &resource)?;
    let patch = body(payload)?;
    patch
        .validate(resource.resource_type)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let merged = state.manager.stored_permissions(&resource).merge(&patch);
    let input = json!({
        "uuid": resource.uuid,
        "owner": resource.owner,
        "permissions": merged,
    });
    submit(&state, &caller, FuncName::SetPermissions, input).await
}

pub(super) async fn delete_permissions(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<ExecutionAccepted> {
    let resource = load(&state, &id).await?;
    authorize(can_change_permissions(), &caller.0, &resource)?;
    submit(
        &state,
        &caller,
        FuncName::RemovePermissions,
        json!({"uuid": resource.uuid}),
    )
    .await
}

fn can_change_permissions() -> impl geocat_catalog::Rule {
    has_perm(CHANGE_RESOURCEBASE).or(has_perm(CHANGE_RESOURCEBASE_PERMISSIONS))
}

//! Resource operation endpoints. Each submits one execution request.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use geocat_catalog::policy::has_perm;
use geocat_core::{Principal, ResourceType};
use geocat_execution::FuncName;
use geocat_permission::codename::{CHANGE_RESOURCEBASE, DELETE_RESOURCEBASE, VIEW_RESOURCEBASE};
use serde_json::{Map, Value, json};

use super::{authorize, body, load, submit};
use crate::error::{ApiError, ApiResult};
use crate::models::{CopyBody, ExecutionAccepted, NewResourceBody};
use crate::state::{AppState, Caller};

pub(super) async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(resource_type): Path<String>,
    payload: Result<Json<NewResourceBody>, JsonRejection>,
) -> ApiResult<ExecutionAccepted> {
    require_add_resource(&caller.0)?;
    let input = new_resource_input(&caller, &resource_type, body(payload)?, false)?;
    submit(&state, &caller, FuncName::Create, input).await
}

pub(super) async fn ingest(
    State(state): State<AppState>,
    caller: Caller,
    Path(resource_type): Path<String>,
    payload: Result<Json<NewResourceBody>, JsonRejection>,
) -> ApiResult<ExecutionAccepted> {
    require_add_resource(&caller.0)?;
    let input = new_resource_input(&caller, &resource_type, body(payload)?, true)?;
    submit(&state, &caller, FuncName::Ingest, input).await
}

pub(super) async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<ExecutionAccepted> {
    let resource = load(&state, &id).await?;
    authorize(has_perm(CHANGE_RESOURCEBASE), &caller.0, &resource)?;
    let mut input = body(payload)?;
    input.insert("uuid".to_owned(), json!(resource.uuid));
    submit(&state, &caller, FuncName::Update, Value::Object(input)).await
}

pub(super) async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<ExecutionAccepted> {
    let resource = load(&state, &id).await?;
    authorize(has_perm(DELETE_RESOURCEBASE), &caller.0, &resource)?;
    submit(&state, &caller, FuncName::Delete, json!({"uuid": resource.uuid})).await
}

pub(super) async fn copy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Option<Json<CopyBody>>,
) -> ApiResult<ExecutionAccepted> {
    let source = load(&state, &id).await?;
    authorize(has_perm(VIEW_RESOURCEBASE), &caller.0, &source)?;
    let CopyBody { owner, defaults } = payload.map(|Json(b)| b).unwrap_or_default();
    let owner = owner
        .or_else(|| caller.0.username.clone())
        .ok_or_else(|| ApiError::bad_request("copy: owner is required for anonymous callers"))?;
    let input = json!({
        "instance": source.uuid,
        "owner": owner,
        "defaults": defaults,
    });
    submit(&state, &caller, FuncName::Copy, input).await
}

/// The global `add_resourcebase` permission; there is no resource to check
/// an ACL against yet.
fn require_add_resource(principal: &Principal) -> Result<(), ApiError> {
    if principal.is_admin() || principal.can_add_resource {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

fn new_resource_input(
    caller: &Caller,
    resource_type: &str,
    body: NewResourceBody,
    with_files: bool,
) -> Result<Value, ApiError> {
    let resource_type: ResourceType = resource_type
        .parse()
        .map_err(|e: geocat_core::ResourceTypeError| ApiError::bad_request(e.to_string()))?;

    let NewResourceBody {
        uuid,
        files,
        mut defaults,
    } = body;
    if let Some(username) = &caller.0.username {
        defaults
            .entry("owner")
            .or_insert_with(|| Value::String(username.clone()));
    }

    let mut input = Map::new();
    if let Some(uuid) = uuid {
        input.insert("uuid".to_owned(), json!(uuid));
    }
    input.insert("resource_type".to_owned(), json!(resource_type));
    input.insert("defaults".to_owned(), Value::Object(defaults));
    if with_files {
        input.insert("files".to_owned(), json!(files.unwrap_or_default()));
    }
    Ok(Value::Object(input))
}

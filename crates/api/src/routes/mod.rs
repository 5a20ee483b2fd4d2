//! Route table and the helpers shared by every handler.

mod permissions;
mod resources;
mod status;

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::routing::{delete, get, post, put};
use geocat_catalog::{Resource, Rule};
use geocat_core::{Principal, ResourceKey};
use geocat_execution::FuncName;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult};
use crate::models::ExecutionAccepted;
use crate::state::{AppState, Caller};

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/resources/{id}/permissions",
            get(permissions::get_permissions)
                .put(permissions::put_permissions)
                .patch(permissions::patch_permissions)
                .delete(permissions::delete_permissions),
        )
        .route("/resources/create/{resource_type}", post(resources::create))
        .route("/resources/ingest/{resource_type}", post(resources::ingest))
        .route("/resources/{id}/update", put(resources::update))
        .route("/resources/{id}/delete", delete(resources::delete))
        .route("/resources/{id}/copy", put(resources::copy))
        .route(
            "/resource-service/execution-status/{execution_id}",
            get(status::get_status).delete(status::delete_status),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unwrap a JSON body, turning axum's rejection into a `400` with the
/// usual error body.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn resource_key(raw: &str) -> Result<ResourceKey, ApiError> {
    ResourceKey::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

async fn load(state: &AppState, raw: &str) -> Result<Resource, ApiError> {
    Ok(state.manager.get(&resource_key(raw)?).await?)
}

fn authorize(rule: impl Rule, principal: &Principal, resource: &Resource) -> Result<(), ApiError> {
    if rule.allows(principal, resource) {
        Ok(())
    } else {
        tracing::debug!(
            user = principal.username.as_deref().unwrap_or_default(),
            resource = %resource.uuid,
            "permission denied"
        );
        Err(ApiError::forbidden())
    }
}

async fn submit(
    state: &AppState,
    caller: &Caller,
    func: FuncName,
    input: Value,
) -> ApiResult<ExecutionAccepted> {
    let request = state
        .runtime
        .submit(&caller.username(), func, &input)
        .await?;
    Ok(Json(ExecutionAccepted::from_request(&request)))
}

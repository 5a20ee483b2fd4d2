//! The execution request store.

use std::sync::Arc;

use geocat_core::ExecutionId;
use geocat_execution::{ExecutionRequest, FuncName, target_resource, validate_input};
use geocat_ports::ExecutionRepo;
use serde_json::Value;

use crate::error::ServiceError;

const ENTITY: &str = "execution request";

/// Creates, reads and deletes execution requests. Never runs anything.
#[derive(Clone)]
pub struct RequestStore {
    repo: Arc<dyn ExecutionRepo>,
}

impl RequestStore {
    /// A store over `repo`.
    pub fn new(repo: Arc<dyn ExecutionRepo>) -> Self {
        Self { repo }
    }

    /// Validate `input`, persist a `ready` request and return its id.
    ///
    /// `create` and `ingest` get a generated resource `uuid` when none was
    /// sent. The resource itself is not touched.
    pub async fn create(
        &self,
        user: &str,
        func_name: FuncName,
        input: &Value,
    ) -> Result<ExecutionId, ServiceError> {
        let params = validate_input(func_name, input)?;
        let resource = target_resource(func_name, &params);
        let request = ExecutionRequest::new(user, func_name, params, resource);
        self.repo.insert(&request).await?;
        tracing::info!(
            execution_id = %request.exec_id,
            func = %func_name,
            user,
            "execution request created"
        );
        Ok(request.exec_id)
    }

    /// Load a request.
    pub async fn get(&self, exec_id: ExecutionId) -> Result<ExecutionRequest, ServiceError> {
        self.repo
            .get(exec_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, exec_id.to_string()))
    }

    /// Delete a request on behalf of `requester`, who must own it.
    pub async fn delete(&self, requester: &str, exec_id: ExecutionId) -> Result<(), ServiceError> {
        let request = self.get(exec_id).await?;
        if !request.is_owned_by(requester) {
            return Err(ServiceError::Forbidden);
        }
        if !self.repo.delete(exec_id).await? {
            return Err(ServiceError::not_found(ENTITY, exec_id.to_string()));
        }
        tracing::info!(execution_id = %exec_id, "execution request deleted");
        Ok(())
    }

    /// A user's requests, oldest first.
    pub async fn list_for_user(&self, user: &str) -> Result<Vec<ExecutionRequest>, ServiceError> {
        Ok(self.repo.list_for_user(user).await?)
    }
}

impl std::fmt::Debug for RequestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestStore").finish_non_exhaustive()
    }
}

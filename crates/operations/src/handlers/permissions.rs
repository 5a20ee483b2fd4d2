use std::sync::Arc;

use async_trait::async_trait;
use geocat_catalog::ResourceManager;
use geocat_execution::FuncName;
use geocat_execution::params::{RemovePermissionsParams, SetPermissionsParams};

use super::ResourceOutput;
use crate::context::OperationContext;
use crate::error::OperationError;
use crate::operation::Operation;

manager_operation!(
    /// `set_permissions`: replace the whole ACL in one write.
    SetPermissions
);
manager_operation!(
    /// `remove_permissions`: strip the ACL down to owner and administrators.
    RemovePermissions
);

#[async_trait]
impl Operation for SetPermissions {
    const FUNC: FuncName = FuncName::SetPermissions;
    type Params = SetPermissionsParams;
    type Output = ResourceOutput;

    async fn run(
        &self,
        params: SetPermissionsParams,
        ctx: &OperationContext,
    ) -> Result<ResourceOutput, OperationError> {
        if params.permissions.is_none() && !params.created {
            return Err(OperationError::validation(
                "set_permissions: permissions may only be omitted for a newly created resource",
            ));
        }
        ctx.set_step("applying permissions").await;
        let resource = self
            .manager
            .set_permissions(&params.uuid, &params.owner, params.permissions.as_ref())
            .await?;
        Ok(resource.uuid.into())
    }
}

#[async_trait]
impl Operation for RemovePermissions {
    const FUNC: FuncName = FuncName::RemovePermissions;
    type Params = RemovePermissionsParams;
    type Output = ResourceOutput;

    async fn run(
        &self,
        params: RemovePermissionsParams,
        ctx: &OperationContext,
    ) -> Result<ResourceOutput, OperationError> {
        ctx.set_step("removing permissions").await;
        let resource = self.manager.remove_permissions(&params.uuid).await?;
        Ok(resource.uuid.into())
    }
}

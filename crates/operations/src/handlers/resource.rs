use std::sync::Arc;

use async_trait::async_trait;
use geocat_catalog::{NewResource, ResourceManager, ResourcePatch};
use geocat_core::{ResourceKey, ResourceType};
use geocat_execution::FuncName;
use geocat_execution::params::{
    CopyParams, CreateParams, DeleteParams, Defaults, IngestParams, UpdateParams,
};

use super::ResourceOutput;
use crate::context::OperationContext;
use crate::error::OperationError;
use crate::operation::Operation;

fn new_resource(
    uuid: ResourceKey,
    resource_type: ResourceType,
    defaults: Defaults,
    files: Vec<String>,
) -> NewResource {
    NewResource {
        uuid,
        resource_type,
        owner: defaults.owner,
        title: defaults.title,
        metadata: defaults.extra,
        files,
    }
}

manager_operation!(
    /// `create`: a new resource with the default ACL.
    CreateResource
);
manager_operation!(
    /// `ingest`: create, or refresh an existing uuid from new files.
    IngestResource
);
manager_operation!(
    /// `update`: partial update of an existing resource.
    UpdateResource
);
manager_operation!(
    /// `delete`: idempotent removal, returning the count.
    DeleteResource
);
manager_operation!(
    /// `copy`: duplicate under a fresh uuid for a new owner.
    CopyResource
);

#[async_trait]
impl Operation for CreateResource {
    const FUNC: FuncName = FuncName::Create;
    type Params = CreateParams;
    type Output = ResourceOutput;

    async fn run(
        &self,
        params: CreateParams,
        ctx: &OperationContext,
    ) -> Result<ResourceOutput, OperationError> {
        ctx.set_step("creating resource").await;
        let new = new_resource(params.uuid, params.resource_type, params.defaults, Vec::new());
        let resource = self.manager.create(new).await?;
        Ok(resource.uuid.into())
    }
}

#[async_trait]
impl Operation for IngestResource {
    const FUNC: FuncName = FuncName::Ingest;
    type Params = IngestParams;
    type Output = ResourceOutput;

    async fn run(
        &self,
        params: IngestParams,
        ctx: &OperationContext,
    ) -> Result<ResourceOutput, OperationError> {
        if params.files.is_empty() {
            return Err(OperationError::validation("ingest: files cannot be empty"));
        }
        ctx.set_step("ingesting files").await;
        let new = new_resource(
            params.uuid,
            params.resource_type,
            params.defaults,
            params.files,
        );
        let (resource, outcome) = self.manager.ingest(new).await?;
        tracing::debug!(uuid = %resource.uuid, ?outcome, "ingest applied");
        Ok(resource.uuid.into())
    }
}

#[async_trait]
impl Operation for UpdateResource {
    const FUNC: FuncName = FuncName::Update;
    type Params = UpdateParams;
    type Output = ResourceOutput;

    async fn run(
        &self,
        params: UpdateParams,
        ctx: &OperationContext,
    ) -> Result<ResourceOutput, OperationError> {
        ctx.set_step("updating metadata").await;
        let patch = ResourcePatch {
            vals: params.vals,
            custom: params.custom,
            regions: params.regions,
            keywords: params.keywords,
            xml_file: params.xml_file,
            metadata_uploaded: params.metadata_uploaded,
        };
        let resource = self.manager.update(&params.uuid, patch, params.notify).await?;
        Ok(resource.uuid.into())
    }
}

#[async_trait]
impl Operation for DeleteResource {
    const FUNC: FuncName = FuncName::Delete;
    type Params = DeleteParams;
    type Output = u64;

    async fn run(&self, params: DeleteParams, ctx: &OperationContext) -> Result<u64, OperationError> {
        ctx.set_step("deleting resource").await;
        Ok(self.manager.delete(&params.uuid).await?)
    }
}

#[async_trait]
impl Operation for CopyResource {
    const FUNC: FuncName = FuncName::Copy;
    type Params = CopyParams;
    type Output = ResourceOutput;

    async fn run(
        &self,
        params: CopyParams,
        ctx: &OperationContext,
    ) -> Result<ResourceOutput, OperationError> {
        ctx.set_step("copying resource").await;
        let copy = self
            .manager
            .copy(&params.instance, &params.owner, params.defaults)
            .await?;
        Ok(copy.uuid.into())
    }
}

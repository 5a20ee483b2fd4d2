//! Typed operations and their type-erased handler form.
//!
//! Handler authors implement [`Operation`] with a typed parameter struct;
//! [`OperationAdapter`] bridges it to the JSON-in, JSON-out
//! [`OperationHandler`] the dispatcher stores.

use std::sync::Arc;

use async_trait::async_trait;
use geocat_execution::FuncName;
use geocat_execution::params::parse;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::OperationContext;
use crate::error::OperationError;

/// One verb with typed input and output.
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    /// The verb this operation serves.
    const FUNC: FuncName;
    /// The `input_params` shape.
    type Params: DeserializeOwned + Send + 'static;
    /// What lands under `output_params.output`.
    type Output: Serialize + Send + 'static;

    /// Run the operation.
    async fn run(
        &self,
        params: Self::Params,
        ctx: &OperationContext,
    ) -> Result<Self::Output, OperationError>;
}

/// Type-erased operation, stored by the dispatcher as
/// `Arc<dyn OperationHandler>`.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// The verb this handler serves.
    fn func(&self) -> FuncName;

    /// Run with JSON `input_params`, returning the JSON output.
    async fn execute(&self, input: Value, ctx: &OperationContext) -> Result<Value, OperationError>;
}

/// Wraps a typed [`Operation`] as an [`OperationHandler`].
///
/// 1. Parses `input_params` into `O::Params`
/// 2. Runs the operation
/// 3. Serializes `O::Output`
pub struct OperationAdapter<O> {
    operation: Arc<O>,
}

impl<O> OperationAdapter<O> {
    /// Wrap an operation.
    pub fn new(operation: O) -> Self {
        Self {
            operation: Arc::new(operation),
        }
    }
}

#[async_trait]
impl<O: Operation> OperationHandler for OperationAdapter<O> {
    fn func(&self) -> FuncName {
        O::FUNC
    }

    async fn execute(&self, input: Value, ctx: &OperationContext) -> Result<Value, OperationError> {
        let params: O::Params = parse(O::FUNC, &input)?;
        let output = self.operation.run(params, ctx).await?;
        serde_json::to_value(output)
            .map_err(|e| OperationError::Internal(format!("output serialization failed: {e}")))
    }
}

impl<O: Operation> std::fmt::Debug for OperationAdapter<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationAdapter")
            .field("func", &O::FUNC)
            .finish()
    }
}

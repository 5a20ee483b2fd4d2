//! Operation registry for looking up handlers by verb.

use std::sync::Arc;

use dashmap::DashMap;
use geocat_catalog::ResourceManager;
use geocat_execution::FuncName;
use geocat_operations::{Operation, OperationAdapter, OperationHandler, default_operations};

use crate::error::ServiceError;

/// Thread-safe registry of operation handlers keyed by [`FuncName`].
pub struct HandlerRegistry {
    handlers: DashMap<FuncName, Arc<dyn OperationHandler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// A registry holding every verb's handler over `manager`.
    #[must_use]
    pub fn with_defaults(manager: &Arc<ResourceManager>) -> Self {
        let registry = Self::new();
        for handler in default_operations(manager) {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler. An existing handler for the same verb is replaced.
    pub fn register(&self, handler: Arc<dyn OperationHandler>) {
        let func = handler.func();
        tracing::debug!(func = %func, "registered operation handler");
        self.handlers.insert(func, handler);
    }

    /// Register a typed [`Operation`], wrapping it in an [`OperationAdapter`].
    pub fn register_operation<O: Operation>(&self, operation: O) {
        self.register(Arc::new(OperationAdapter::new(operation)));
    }

    /// Look up the handler for `func`.
    pub fn get(&self, func: FuncName) -> Result<Arc<dyn OperationHandler>, ServiceError> {
        self.handlers
            .get(&func)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ServiceError::InternalError(format!("no handler registered for {func}")))
    }

    /// Check if a handler is registered for `func`.
    #[must_use]
    pub fn contains(&self, func: FuncName) -> bool {
        self.handlers.contains_key(&func)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let funcs: Vec<FuncName> = self.handlers.iter().map(|e| *e.key()).collect();
        f.debug_struct("HandlerRegistry").field("funcs", &funcs).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geocat_core::ExecutionId;
    use geocat_execution::params::DeleteParams;
    use geocat_operations::{OperationContext, OperationError};
    use serde_json::json;

    struct CountingDelete;

    #[async_trait]
    impl Operation for CountingDelete {
        const FUNC: FuncName = FuncName::Delete;
        type Params = DeleteParams;
        type Output = u64;

        async fn run(&self, _: DeleteParams, _: &OperationContext) -> Result<u64, OperationError> {
            Ok(7)
        }
    }

    #[test]
    fn empty_registry() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains(FuncName::Create));
        assert!(matches!(
            registry.get(FuncName::Create),
            Err(ServiceError::InternalError(msg)) if msg.contains("create")
        ));
    }

    #[tokio::test]
    async fn typed_operations_register_under_their_verb() {
        let registry = HandlerRegistry::new();
        registry.register_operation(CountingDelete);
        assert_eq!(registry.len(), 1);

        let handler = registry.get(FuncName::Delete).unwrap();
        let ctx = OperationContext::detached(ExecutionId::v4(), "alice");
        assert_eq!(handler.execute(json!({"uuid": "r1"}), &ctx).await.unwrap(), json!(7));
    }
}

//! One operation per verb, all backed by the [`ResourceManager`].

macro_rules! manager_operation {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            manager: Arc<ResourceManager>,
        }

        impl $name {
            /// Operation over `manager`.
            pub fn new(manager: Arc<ResourceManager>) -> Self {
                Self { manager }
            }
        }
    };
}

mod permissions;
mod resource;

use std::sync::Arc;

use geocat_catalog::ResourceManager;
use geocat_core::ResourceKey;
use serde::{Deserialize, Serialize};

use crate::operation::{OperationAdapter, OperationHandler};

pub use permissions::{RemovePermissions, SetPermissions};
pub use resource::{
    CopyResource, CreateResource, DeleteResource, IngestResource, UpdateResource,
};

/// `{uuid}`: the output of every verb except `delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOutput {
    /// The resource the operation produced or touched.
    pub uuid: ResourceKey,
}

impl From<ResourceKey> for ResourceOutput {
    fn from(uuid: ResourceKey) -> Self {
        Self { uuid }
    }
}

/// Every verb's handler over `manager`.
pub fn default_operations(manager: &Arc<ResourceManager>) -> Vec<Arc<dyn OperationHandler>> {
    vec![
        Arc::new(OperationAdapter::new(CreateResource::new(Arc::clone(manager)))),
        Arc::new(OperationAdapter::new(IngestResource::new(Arc::clone(manager)))),
        Arc::new(OperationAdapter::new(UpdateResource::new(Arc::clone(manager)))),
        Arc::new(OperationAdapter::new(DeleteResource::new(Arc::clone(manager)))),
        Arc::new(OperationAdapter::new(CopyResource::new(Arc::clone(manager)))),
        Arc::new(OperationAdapter::new(SetPermissions::new(Arc::clone(manager)))),
        Arc::new(OperationAdapter::new(RemovePermissions::new(Arc::clone(manager)))),
    ]
}

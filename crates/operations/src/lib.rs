#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Operations
//!
//! The handlers behind the seven `func_name` verbs.
//!
//! | verb | output |
//! |---|---|
//! | `create`, `ingest`, `update`, `copy` | `{uuid}` |
//! | `set_permissions`, `remove_permissions` | `{uuid}` |
//! | `delete` | the number of resources deleted |
//!
//! Each handler applies its mutation through a single
//! [`ResourceManager`](geocat_catalog::ResourceManager) write, so a failed
//! operation leaves the resource untouched. Errors carry an [`ErrorClass`]
//! the dispatcher records on the request log.

pub mod context;
pub mod error;
pub mod handlers;
pub mod operation;

pub use context::{NoopRecorder, OperationContext, StepRecorder};
pub use error::{ErrorClass, OperationError};
pub use handlers::{ResourceOutput, default_operations};
pub use operation::{Operation, OperationAdapter, OperationHandler};

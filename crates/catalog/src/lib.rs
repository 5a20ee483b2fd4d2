#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Catalog
//!
//! The slice of the resource catalog this service touches:
//!
//! - [`Resource`] -- a plain record with a [`ResourceType`](geocat_core::ResourceType)
//!   discriminator and an opaque metadata object
//! - [`ResourceRepo`] -- the storage port (`get`, `insert`, `save`, `delete`)
//! - [`ResourceManager`] -- mutations, each one repository write followed by
//!   a [`ResourceEvent`](geocat_telemetry::ResourceEvent)
//! - [`policy`] -- composable authorization predicates
//! - [`PermissionDefaults`] -- the ACL new resources start with

pub mod defaults;
pub mod error;
pub mod manager;
pub mod policy;
pub mod repo;
pub mod resource;

pub use defaults::PermissionDefaults;
pub use error::CatalogError;
pub use manager::{Ingested, ResourceManager};
pub use policy::{Rule, RuleExt};
pub use repo::ResourceRepo;
pub use resource::{NewResource, Resource, ResourcePatch};

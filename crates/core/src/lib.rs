#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Core
//!
//! Fundamental types shared by every geocat crate:
//!
//! - **Identifiers**: [`ExecutionId`] (typed UUID) and [`ResourceKey`]
//!   (the catalog resource's `uuid` natural key)
//! - **Subjects**: [`Subject`]: who a permission grant is attached to
//! - **Principals**: [`Principal`]: the authenticated caller of an operation
//! - **Resource types**: [`ResourceType`]: the discriminator that selects
//!   permission tables
//!
//! ```rust
//! use geocat_core::{ExecutionId, ResourceKey, Subject};
//!
//! let id = ExecutionId::v4();
//! let key = ResourceKey::new("r1").unwrap();
//! let subject: Subject = "group:editors".parse().unwrap();
//! assert!(!id.is_nil());
//! assert_eq!(key.as_str(), "r1");
//! assert_eq!(subject, Subject::group("editors"));
//! ```

pub mod id;
pub mod keys;
pub mod principal;
pub mod resource_type;
pub mod subject;

pub use id::*;
pub use keys::{ResourceKey, ResourceKeyError};
pub use principal::Principal;
pub use resource_type::{DatasetSubtype, ResourceType, ResourceTypeError};
pub use subject::{SubjectParseError, Subject};

/// Common prelude for geocat crates.
pub mod prelude {
    pub use super::{
        DatasetSubtype, ExecutionId, Principal, ResourceKey, ResourceType, Subject, UuidParseError,
    };
}

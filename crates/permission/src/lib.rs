#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Permission
//!
//! The permission model and the permission spec engine.
//!
//! - [`Role`]: the compact vocabulary `view < download < edit < manage`
//! - [`codename`]: granular permission codenames
//! - [`PermissionTable`]: which roles a resource type allows and the
//!   codename bundle behind each role
//! - [`PermissionSpec`]: the *extended* form: subject → codenames
//! - [`CompactPermissionSpec`]: the *compact* form: subject → role (+ any
//!   anomalous extra codenames)
//! - [`PermissionsInput`]: what callers may send: either form, per subject
//!
//! The engine has three operations:
//!
//! | operation | direction | entry point |
//! |---|---|---|
//! | compaction | extended → compact | [`PermissionSpec::compact`] |
//! | expansion | compact → extended | [`CompactPermissionSpec::expand`] |
//! | merge | compact × compact → compact | [`CompactPermissionSpec::merge`] |
//!
//! Compaction never drops a grant: anything a role bundle does not cover is
//! carried as `extra` so that expansion restores the exact ACL.

pub mod codename;
pub mod compact;
pub mod error;
pub mod input;
pub mod role;
pub mod spec;
pub mod table;

pub use compact::{CompactGrant, CompactPermissionSpec, CompactionContext};
pub use error::PermissionError;
pub use input::{PermissionsInput, SubjectPermissions};
pub use role::Role;
pub use spec::PermissionSpec;
pub use table::PermissionTable;

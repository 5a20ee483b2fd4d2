#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Ports
//!
//! Backend interface traits (ports) for the geocat resource service.
//!
//! This crate defines the **port** traits that backend drivers implement.
//! It follows the Ports & Drivers (hexagonal) architecture pattern:
//!
//! - [`ExecutionRepo`] -- versioned execution request persistence
//! - [`TaskQueue`] -- work distribution queue
//! - [`UserDirectory`] -- principal lookup
//!
//! All traits are `async_trait` and object-safe, suitable for use as
//! `Box<dyn Trait>` or `Arc<dyn Trait>` behind dependency injection.

pub mod directory;
pub mod error;
pub mod execution;
pub mod queue;

pub use directory::UserDirectory;
pub use error::PortsError;
pub use execution::ExecutionRepo;
pub use queue::TaskQueue;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: every port is object-safe.
    #[test]
    fn traits_are_object_safe() {
        fn _assert_execution_repo(_: &dyn ExecutionRepo) {}
        fn _assert_task_queue(_: &dyn TaskQueue) {}
        fn _assert_user_directory(_: &dyn UserDirectory) {}
    }

    /// Ports are shared across workers behind `Arc`.
    #[test]
    fn traits_work_as_arc_dyn() {
        use std::sync::Arc;
        fn _takes_execution(_: Arc<dyn ExecutionRepo>) {}
        fn _takes_queue(_: Arc<dyn TaskQueue>) {}
        fn _takes_directory(_: Arc<dyn UserDirectory>) {}
    }
}

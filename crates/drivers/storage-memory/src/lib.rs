#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Storage Memory Driver
//!
//! `DashMap`-backed implementations of the storage ports:
//!
//! - [`MemoryExecutionRepo`] -- [`ExecutionRepo`](geocat_ports::ExecutionRepo)
//!   with compare-and-swap on the request version
//! - [`MemoryResourceRepo`] -- [`ResourceRepo`](geocat_catalog::ResourceRepo)
//! - [`MemoryDirectory`] -- [`UserDirectory`](geocat_ports::UserDirectory)
//!   over a fixed user table
//!
//! Nothing survives a restart; suitable for tests and single-process
//! deployments.

pub mod directory;
pub mod execution;
pub mod resource;

pub use directory::MemoryDirectory;
pub use execution::MemoryExecutionRepo;
pub use resource::MemoryResourceRepo;

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Runtime
//!
//! Asynchronous execution of resource operations.
//!
//! This crate provides:
//! - [`RequestStore`] -- validates and persists execution requests
//! - [`Dispatcher`] -- queue consumers that run one handler per request
//! - [`ResourceLocks`] -- per-resource mutual exclusion in admission order
//! - [`Watchdog`] -- fails requests stuck in `running`
//! - [`HandlerRegistry`] -- looks up operation handlers by verb
//! - [`Runtime`] -- the facade wiring all of the above
//!
//! A request is `ready` when the caller gets its id back. Workers move it
//! to `running` with a compare-and-swap on its version, run the handler
//! while holding the target resource's lock, and write `finished` or
//! `failed`. Requests on the same resource run one at a time, in the order
//! they were dispatched; requests on different resources run in parallel.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod locks;
pub mod registry;
pub mod runtime;
pub mod store;
pub mod watchdog;

pub use config::RuntimeConfig;
pub use dispatcher::Dispatcher;
pub use error::ServiceError;
pub use locks::ResourceLocks;
pub use registry::HandlerRegistry;
pub use runtime::Runtime;
pub use store::RequestStore;
pub use watchdog::Watchdog;

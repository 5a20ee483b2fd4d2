#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Execution
//!
//! The execution request record and its state machine.
//!
//! This crate models the persisted job; it does NOT dispatch anything. It
//! defines:
//!
//! - [`RequestStatus`]: `ready → running → {finished | failed}`
//! - [`ExecutionRequest`]: the durable record with optimistic versioning
//! - [`FuncName`]: the seven operation verbs
//! - [`LogEntry`]: the request's diagnostic trail
//! - [`params`]: typed `input_params` shapes and creation-time validation
//! - State machine transitions validated by the [`transition`] module

pub mod error;
pub mod func;
pub mod journal;
pub mod params;
pub mod request;
pub mod status;
pub mod transition;

pub use error::ExecutionError;
pub use func::FuncName;
pub use journal::{LogEntry, LogLevel};
pub use params::{target_resource, validate_input};
pub use request::ExecutionRequest;
pub use status::RequestStatus;

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Telemetry
//!
//! Event bus and metrics for the geocat resource service.
//!
//! This crate provides:
//! - [`EventBus`] -- broadcast-based event distribution
//! - [`ExecutionEvent`] -- dispatcher lifecycle events
//! - [`ResourceEvent`] -- resource side effects, emitted after commit
//! - [`MetricsRegistry`] -- named counters, gauges, and histograms

pub mod bus;
pub mod event;
pub mod metrics;

pub use bus::{EventBus, EventSubscriber};
pub use event::{ExecutionEvent, ResourceEvent};
pub use metrics::{Counter, Gauge, Histogram, HistogramSummary, MetricsRegistry};

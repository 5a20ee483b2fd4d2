#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat Log
//!
//! Subscriber setup for geocat binaries, on top of `tracing-subscriber`.
//!
//! ```no_run
//! use geocat_log::{Config, LoggerBuilder};
//!
//! let _guard = LoggerBuilder::from_config(Config::from_env()).build().unwrap();
//! tracing::info!("ready");
//! ```

pub mod builder;
pub mod config;
pub mod error;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, Format};
pub use error::{LogError, LogResult};

/// Initialize logging from the environment (`GEOCAT_LOG`, `RUST_LOG`,
/// `GEOCAT_LOG_FORMAT`).
pub fn auto_init() -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(Config::from_env()).build()
}

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # geocat API
//!
//! The axum router in front of the runtime and the resource manager.
//!
//! Every mutating endpoint only validates, authorizes and submits an
//! execution request; the answer is `{status, execution_id, status_url}`
//! and the caller polls the status endpoint for the outcome. Callers are
//! named by the trusted `x-remote-user` header and resolved through the
//! [`UserDirectory`](geocat_ports::UserDirectory).
//!
//! ```text
//! GET    /resources/{id}/permissions          compact ACL
//! PUT    /resources/{id}/permissions          replace ACL
//! PATCH  /resources/{id}/permissions          merge into ACL
//! DELETE /resources/{id}/permissions          strip ACL
//! POST   /resources/create/{resource_type}
//! POST   /resources/ingest/{resource_type}
//! PUT    /resources/{id}/update
//! DELETE /resources/{id}/delete
//! PUT    /resources/{id}/copy
//! GET    /resource-service/execution-status/{execution_id}
//! DELETE /resource-service/execution-status/{execution_id}
//! ```

pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;

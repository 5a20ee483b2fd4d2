//! Shared handler state and caller resolution.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use geocat_catalog::ResourceManager;
use geocat_core::{Principal, Subject};
use geocat_ports::UserDirectory;
use geocat_runtime::Runtime;

use crate::error::ApiError;

/// Trusted header naming the authenticated caller.
pub const REMOTE_USER_HEADER: &str = "x-remote-user";

/// Everything the handlers need, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Submits and tracks execution requests.
    pub runtime: Arc<Runtime>,
    /// Reads resources and their permissions.
    pub manager: Arc<ResourceManager>,
    /// Resolves callers.
    pub directory: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Bundle the collaborators.
    pub fn new(
        runtime: Arc<Runtime>,
        manager: Arc<ResourceManager>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            runtime,
            manager,
            directory,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("runtime", &self.runtime)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

/// The resolved caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl Caller {
    /// Name recorded as the requester of execution requests.
    #[must_use]
    pub fn username(&self) -> String {
        self.0
            .username
            .clone()
            .unwrap_or_else(|| Subject::Anonymous.to_string())
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(REMOTE_USER_HEADER)
            .map(|value| value.to_str())
            .transpose()
            .map_err(|_| ApiError::bad_request(format!("{REMOTE_USER_HEADER} is not valid ASCII")))?
            .map(str::trim)
            .filter(|name| !name.is_empty());
        if let Some(name) = header {
            // Reserved subject names would alias the anonymous requester.
            let is_user = name
                .parse::<Subject>()
                .is_ok_and(|subject| subject.username().is_some());
            if !is_user {
                return Err(ApiError::bad_request(format!(
                    "{REMOTE_USER_HEADER} names a reserved subject: {name}"
                )));
            }
        }
        let principal = state.directory.resolve(header).await?;
        Ok(Self(principal))
    }
}

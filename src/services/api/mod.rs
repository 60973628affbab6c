/*
 * Responsibility
 * - Request client の公開インターフェース (re-export)
 * - プロセス全体で共有する client の singleton (configure / global)
 */
use std::sync::OnceLock;
use std::time::Duration;

pub mod auth;
pub mod client;
pub mod error;
pub mod policy;

pub use auth::{LOGIN_PATH, LoginRequest, LoginResponse};
pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use error::ApiError;
pub use policy::{ClearCredential, LogOnly, UnauthorizedEvent, UnauthorizedPolicy};

use crate::services::credential::CredentialStore;

static CLIENT: OnceLock<ApiClient> = OnceLock::new();

/// Build the process-wide client once. Later calls return the first instance.
pub fn configure(
    base_url: &str,
    timeout: Duration,
    store: CredentialStore,
) -> Result<&'static ApiClient, ApiError> {
    configure_with(|| ApiClient::new(base_url, timeout, store))
}

/// Like `configure`, with full control over how the client is built.
///
/// `build` only runs when no client has been configured yet.
pub fn configure_with(
    build: impl FnOnce() -> Result<ApiClient, ApiError>,
) -> Result<&'static ApiClient, ApiError> {
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }
    let client = build()?;
    Ok(CLIENT.get_or_init(|| client))
}

/// The configured client, if `configure` has run.
pub fn global() -> Option<&'static ApiClient> {
    CLIENT.get()
}

//! What to do when the server rejects the held credential (HTTP 401).
//!
//! The request client always returns `ApiError::Unauthorized` to the caller; the
//! policy only decides the side effect.

use tracing::warn;

use crate::services::credential::CredentialStore;

/// Details of a rejected request, handed to the policy.
#[derive(Debug, Clone)]
pub struct UnauthorizedEvent {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub request_id: String,
}

pub trait UnauthorizedPolicy: Send + Sync {
    fn on_unauthorized(&self, event: &UnauthorizedEvent);
}

/// Default: report and leave the credential alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogOnly;

impl UnauthorizedPolicy for LogOnly {
    fn on_unauthorized(&self, event: &UnauthorizedEvent) {
        warn!(
            method = %event.method,
            url = %event.url,
            status = event.status,
            request_id = %event.request_id,
            "request rejected: not authenticated or token expired"
        );
    }
}

/// Drop the credential so the next navigation lands on the login route.
#[derive(Clone, Debug)]
pub struct ClearCredential {
    store: CredentialStore,
}

impl ClearCredential {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

impl UnauthorizedPolicy for ClearCredential {
    fn on_unauthorized(&self, event: &UnauthorizedEvent) {
        LogOnly.on_unauthorized(event);
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear rejected credential");
        }
    }
}

use std::time::Duration;

use thiserror::Error;

use crate::services::storage::StorageError;

/// Errors surfaced by the request client.
///
/// `Unauthorized` is kept apart from every other failure so a caller (or the
/// unauthorized policy) can react to a server-side credential rejection.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authenticated or token expired (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("invalid username or password (HTTP {status})")]
    InvalidCredentials { status: u16 },

    #[error("request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("unable to reach the server: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("could not build request: {0}")]
    InvalidRequest(#[source] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    #[error("failed to persist credential: {0}")]
    Credential(#[from] StorageError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status returned by the server, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status }
            | Self::InvalidCredentials { status }
            | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::services::api::client::{ApiClient, Rejection};
use crate::services::api::error::ApiError;
use crate::services::credential::fingerprint;

/// Backend login endpoint, relative to the API base address.
pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body returned by the backend on a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl ApiClient {
    /// Exchange username/password for a token and store it verbatim.
    ///
    /// Bad credentials come back as `ApiError::InvalidCredentials`. The 401
    /// does not go through the unauthorized policy, so the stored credential is
    /// left untouched in that case.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { username, password };
        let sent = self
            .send(Method::POST, LOGIN_PATH, |b| b.json(&body), Rejection::Return)
            .await;
        let response = match sent {
            Err(ApiError::Unauthorized { status }) => {
                warn!(username, "login rejected");
                return Err(ApiError::InvalidCredentials { status });
            }
            other => other?,
        };
        let response: LoginResponse = self.read_json(response).await?;

        if response.access_token.trim().is_empty() {
            return Err(ApiError::Decode("login response carried an empty token".to_string()));
        }

        self.credentials().set(&response.access_token)?;
        info!(
            username,
            token_fingerprint = %fingerprint(&response.access_token),
            "signed in"
        );

        Ok(response)
    }

    /// Forget the held credential. The backend keeps no session to revoke.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.credentials().clear()?;
        info!("signed out");
        Ok(())
    }
}

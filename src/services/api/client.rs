//! Shared HTTP client with credential attachment and 401 detection.
//!
//! Responsibility:
//! - Outbound: read the credential store before every request and attach
//!   `Authorization: Bearer <token>` when a token is held. Every request also gets
//!   an `x-request-id` for log correlation.
//! - Inbound: classify every response. 401 goes through the unauthorized policy and
//!   comes back as `ApiError::Unauthorized`; other failures propagate unchanged.
//!
//! Notes:
//! - Nothing is retried.
//! - The timeout is set once on the underlying `reqwest::Client`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::services::api::error::ApiError;
use crate::services::api::policy::{LogOnly, UnauthorizedEvent, UnauthorizedPolicy};
use crate::services::credential::{CredentialStore, fingerprint};

/// What `inspect` does with a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Rejection {
    /// The server rejected the held credential: run the unauthorized policy.
    RunPolicy,
    /// The 401 is about the request itself (e.g. a bad password): just return it.
    Return,
}

/// Header used to correlate client and server logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Maximum number of error body characters kept in `ApiError::Status`.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    store: CredentialStore,
    on_unauthorized: Arc<dyn UnauthorizedPolicy>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("store", &self.store)
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, store: CredentialStore) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            base_url,
            timeout,
            store,
            on_unauthorized: Arc::new(LogOnly),
        })
    }

    /// Replace the side effect run on HTTP 401 (default: `LogOnly`).
    pub fn with_unauthorized_policy(mut self, policy: Arc<dyn UnauthorizedPolicy>) -> Self {
        self.on_unauthorized = policy;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    /// Join `path` onto the base address with exactly one `/` between them.
    ///
    /// `Url::join` would drop a base path such as `/api`, so join as strings.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim();

        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path.trim_start_matches('/'))
        };

        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }

    /// Send a request through both interceptors.
    ///
    /// `build` customizes the request (body, extra headers) after the credential
    /// has been attached.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        self.send(method, path, build, Rejection::RunPolicy).await
    }

    pub(super) async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
        rejection: Rejection,
    ) -> Result<Response, ApiError> {
        let url = self.url(path)?;
        let request_id = Uuid::new_v4().to_string();

        let builder = self
            .http
            .request(method.clone(), url.clone())
            .header(REQUEST_ID_HEADER, &request_id);
        let builder = build(self.authorize(builder));

        debug!(%method, %url, %request_id, "sending request");
        let result = builder.send().await;

        self.inspect(result, &method, &url, &request_id, rejection)
            .await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, |b| b).await?;
        self.read_json(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::POST, path, |b| b.json(body)).await?;
        self.read_json(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, |b| b).await?;
        Ok(())
    }

    // Outbound interceptor.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.get() {
            Some(token) => {
                debug!(token_fingerprint = %fingerprint(&token), "attaching bearer credential");
                builder.bearer_auth(token)
            }
            None => builder,
        }
    }

    // Inbound interceptor.
    async fn inspect(
        &self,
        result: Result<Response, reqwest::Error>,
        method: &Method,
        url: &Url,
        request_id: &str,
        rejection: Rejection,
    ) -> Result<Response, ApiError> {
        let response = match result {
            Ok(response) => response,
            Err(err) => return Err(self.map_transport_error(err, request_id)),
        };

        let status = response.status();
        debug!(%status, %request_id, "response received");

        if status == StatusCode::UNAUTHORIZED {
            if rejection == Rejection::RunPolicy {
                self.on_unauthorized.on_unauthorized(&UnauthorizedEvent {
                    method: method.to_string(),
                    url: url.to_string(),
                    status: status.as_u16(),
                    request_id: request_id.to_string(),
                });
            }
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %request_id, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: sanitize_body(&body),
            });
        }

        Ok(response)
    }

    pub(super) async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.map_transport_error(err, "-"))?;

        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }

    fn map_transport_error(&self, err: reqwest::Error, request_id: &str) -> ApiError {
        if err.is_builder() {
            warn!(%request_id, error = %err, "request could not be built");
            ApiError::InvalidRequest(err)
        } else if err.is_timeout() {
            warn!(%request_id, timeout_ms = self.timeout.as_millis() as u64, "request timed out");
            ApiError::Timeout {
                after: self.timeout,
            }
        } else {
            warn!(%request_id, error = %err, "request transport failure");
            ApiError::Transport(err)
        }
    }
}

/// Trim and truncate an error body before surfacing it.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request failed".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

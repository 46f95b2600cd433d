//! REST gateway core
//!
//! Every endpoint wrapper goes through `ApiClient`, which:
//! - Builds the URL under the API prefix (ids are escaped as path segments)
//! - Attaches the stored bearer token, read fresh on each request
//! - Maps any non-2xx response to `ApiError::Status`, using the body's
//!   `error` field when present and the caller's default message otherwise

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::{AuthApi, FilesApi, FoldersApi, PassShareApi, SharesApi, UserApi};
use crate::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; the message is what a user should see
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read stored token: {0}")]
    Storage(#[from] StorageError),

    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status of a rejected request, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Client for the file-sharing REST API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `server_url` with endpoints under the default `/api` prefix
    pub fn new(server_url: &str, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        Self::with_prefix(server_url, crate::DEFAULT_API_PREFIX, storage)
    }

    /// Create a client with an explicit API prefix (empty for none)
    pub fn with_prefix(
        server_url: &str,
        api_prefix: &str,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("fileshare/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http_client(http, server_url, api_prefix, storage)
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_http_client(
        http: Client,
        server_url: &str,
        api_prefix: &str,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(server_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{server_url}: {e}")))?;

        {
            let mut segments = base_url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(server_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(api_prefix.split('/').filter(|s| !s.is_empty()));
        }

        Ok(Self {
            http,
            base_url,
            storage,
        })
    }

    /// API base, e.g. `http://localhost:8080/api`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Storage the bearer token is read from
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn files(&self) -> FilesApi<'_> {
        FilesApi::new(self)
    }

    pub fn folders(&self) -> FoldersApi<'_> {
        FoldersApi::new(self)
    }

    pub fn shares(&self) -> SharesApi<'_> {
        SharesApi::new(self)
    }

    pub fn passhare(&self) -> PassShareApi<'_> {
        PassShareApi::new(self)
    }

    pub fn user(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    // Helpers shared by the endpoint wrappers

    /// URL of an endpoint below the API base
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor: the base can always take segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Request without credentials
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!("{} {}", method, url);
        self.http.request(method, url)
    }

    /// Request carrying the stored bearer token, if any
    pub(crate) fn authed_request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, ApiError> {
        let req = self.request(method, segments);

        Ok(match self.storage.get(crate::TOKEN_KEY)? {
            Some(token) => req.bearer_auth(token),
            None => {
                tracing::debug!("No stored token, sending request without credentials");
                req
            }
        })
    }

    /// Send and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        default_error: &str,
    ) -> Result<T, ApiError> {
        let resp = self.send(req, default_error).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send and discard whatever body comes back
    pub(crate) async fn send_empty(
        &self,
        req: RequestBuilder,
        default_error: &str,
    ) -> Result<(), ApiError> {
        self.send(req, default_error).await?;
        Ok(())
    }

    /// Send, returning the successful response untouched
    pub(crate) async fn send(
        &self,
        req: RequestBuilder,
        default_error: &str,
    ) -> Result<Response, ApiError> {
        let resp = req.send().await?;
        check_status(resp, default_error).await
    }
}

/// Turn a non-2xx response into `ApiError::Status`
async fn check_status(resp: Response, default_error: &str) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.bytes().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| default_error.to_string());

    tracing::warn!("Request failed: HTTP {}: {}", status.as_u16(), message);

    Err(ApiError::Status { status, message })
}

/// The `error` field of a JSON error body, if there is one
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.as_str())
        .filter(|e| !e.is_empty())
        .map(String::from)
}

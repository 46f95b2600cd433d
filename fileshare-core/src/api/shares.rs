//! Shareable links

use reqwest::Method;
use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::ShareRecord;

/// Parameters for `POST /shares`; absent options are left off the query
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShare {
    pub file_id: String,
    pub share_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_epoch_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Changes for `PATCH /shares/{id}`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_epoch_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

pub struct SharesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SharesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /shares`
    pub async fn list(&self) -> Result<Vec<ShareRecord>, ApiError> {
        let req = self.client.authed_request(Method::GET, &["shares"])?;
        self.client.send_json(req, "Failed to list shares").await
    }

    /// `POST /shares?fileId&shareType&permissions&expiryEpochMs&password&createdBy`
    pub async fn create(&self, share: &NewShare) -> Result<ShareRecord, ApiError> {
        let req = self
            .client
            .authed_request(Method::POST, &["shares"])?
            .query(share);

        self.client.send_json(req, "Create share failed").await
    }

    /// `PATCH /shares/{id}`
    pub async fn update(&self, id: &str, update: &ShareUpdate) -> Result<ShareRecord, ApiError> {
        let req = self
            .client
            .authed_request(Method::PATCH, &["shares", id])?
            .query(update);

        self.client.send_json(req, "Update share failed").await
    }

    /// `DELETE /shares/{id}`
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let req = self.client.authed_request(Method::DELETE, &["shares", id])?;
        self.client.send_empty(req, "Delete share failed").await
    }
}

//! Files: listing, multipart upload, rename/star, delete and download

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, Url};
use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::FileRecord;

/// Changes for `PATCH /files/{id}`; `None` leaves the field alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
}

impl FileUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            starred: None,
        }
    }

    pub fn star(starred: bool) -> Self {
        Self {
            name: None,
            starred: Some(starred),
        }
    }

    // An empty name means "no rename"
    fn normalized(&self) -> Self {
        Self {
            name: self.name.clone().filter(|n| !n.is_empty()),
            starred: self.starred,
        }
    }
}

pub struct FilesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FilesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /files`
    pub async fn list(&self) -> Result<Vec<FileRecord>, ApiError> {
        let req = self.client.authed_request(Method::GET, &["files"])?;
        self.client.send_json(req, "Failed to list files").await
    }

    /// `POST /files` as multipart: the file under `file`, plus `folderId` when given
    pub async fn upload(
        &self,
        local_path: &Path,
        folder_id: Option<&str>,
    ) -> Result<FileRecord, ApiError> {
        let bytes = tokio::fs::read(local_path).await?;
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(local_path).first_or_octet_stream();

        tracing::info!("Uploading {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;

        let mut form = Form::new().part("file", part);
        if let Some(folder_id) = folder_id.filter(|f| !f.is_empty()) {
            form = form.text("folderId", folder_id.to_string());
        }

        let req = self
            .client
            .authed_request(Method::POST, &["files"])?
            .multipart(form);

        self.client.send_json(req, "Upload failed").await
    }

    /// `PATCH /files/{id}?name&starred`
    pub async fn update(&self, id: &str, update: &FileUpdate) -> Result<FileRecord, ApiError> {
        let req = self
            .client
            .authed_request(Method::PATCH, &["files", id])?
            .query(&update.normalized());

        self.client.send_json(req, "Update failed").await
    }

    /// `DELETE /files/{id}`
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let req = self.client.authed_request(Method::DELETE, &["files", id])?;
        self.client.send_empty(req, "Delete failed").await
    }

    /// Address of `GET /files/{id}/download`; performs no request
    pub fn download_url(&self, id: &str) -> Url {
        self.client.endpoint(&["files", id, "download"])
    }

    /// Fetch the whole file into memory
    pub async fn download(&self, id: &str) -> Result<Vec<u8>, ApiError> {
        let req = self
            .client
            .authed_request(Method::GET, &["files", id, "download"])?;
        let resp = self.client.send(req, "Download failed").await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Stream the file to `dest`, returning bytes written
    pub async fn download_to(&self, id: &str, dest: &Path) -> Result<u64, ApiError> {
        let req = self
            .client
            .authed_request(Method::GET, &["files", id, "download"])?;
        let resp = self.client.send(req, "Download failed").await?;
        super::write_body(resp, dest).await
    }
}

//! Pass-share sessions: ephemeral rooms joined by code
//!
//! The owner creates a session and hands out its code; participants join
//! with the code, offer files into the room and download what others offered.
//! Leaving drops one participant, ending closes the room for everyone.

use std::path::Path;

use reqwest::{Method, Url};
use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::{Participant, PassShareSession, SessionFile};

const SESSIONS: [&str; 2] = ["passhare", "sessions"];

pub struct PassShareApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PassShareApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn session_path<'s>(id: &'s str, rest: &[&'s str]) -> Vec<&'s str> {
        let mut segments = Vec::with_capacity(3 + rest.len());
        segments.extend(SESSIONS);
        segments.push(id);
        segments.extend_from_slice(rest);
        segments
    }

    /// `POST /passhare/sessions`
    pub async fn create_session(&self) -> Result<PassShareSession, ApiError> {
        let req = self.client.authed_request(Method::POST, &SESSIONS)?;
        self.client.send_json(req, "Failed to create session").await
    }

    /// `POST /passhare/sessions/join?code`
    pub async fn join(&self, code: &str) -> Result<PassShareSession, ApiError> {
        #[derive(Serialize)]
        struct JoinParams<'a> {
            code: &'a str,
        }

        let req = self
            .client
            .authed_request(Method::POST, &["passhare", "sessions", "join"])?
            .query(&JoinParams { code: code.trim() });

        self.client.send_json(req, "Failed to join session").await
    }

    /// `GET /passhare/sessions/{id}`
    pub async fn get(&self, id: &str) -> Result<PassShareSession, ApiError> {
        let req = self
            .client
            .authed_request(Method::GET, &Self::session_path(id, &[]))?;
        self.client.send_json(req, "Failed to load session").await
    }

    /// `POST /passhare/sessions/{id}/files?fileId`: offer one of the user's files
    pub async fn add_file(&self, id: &str, file_id: &str) -> Result<SessionFile, ApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct AddFileParams<'a> {
            file_id: &'a str,
        }

        let req = self
            .client
            .authed_request(Method::POST, &Self::session_path(id, &["files"]))?
            .query(&AddFileParams { file_id });

        self.client
            .send_json(req, "Failed to add file to session")
            .await
    }

    /// `GET /passhare/sessions/{id}/files`
    pub async fn files(&self, id: &str) -> Result<Vec<SessionFile>, ApiError> {
        let req = self
            .client
            .authed_request(Method::GET, &Self::session_path(id, &["files"]))?;
        self.client
            .send_json(req, "Failed to list session files")
            .await
    }

    /// `GET /passhare/sessions/{id}/participants`
    pub async fn participants(&self, id: &str) -> Result<Vec<Participant>, ApiError> {
        let req = self
            .client
            .authed_request(Method::GET, &Self::session_path(id, &["participants"]))?;
        self.client
            .send_json(req, "Failed to list participants")
            .await
    }

    /// `POST /passhare/sessions/{id}/leave`
    pub async fn leave(&self, id: &str) -> Result<(), ApiError> {
        let req = self
            .client
            .authed_request(Method::POST, &Self::session_path(id, &["leave"]))?;
        self.client.send_empty(req, "Failed to leave session").await
    }

    /// `POST /passhare/sessions/{id}/end`
    pub async fn end(&self, id: &str) -> Result<(), ApiError> {
        let req = self
            .client
            .authed_request(Method::POST, &Self::session_path(id, &["end"]))?;
        self.client.send_empty(req, "Failed to end session").await
    }

    /// `DELETE /passhare/sessions/{id}/files/{fileId}`
    pub async fn remove_file(&self, id: &str, file_id: &str) -> Result<(), ApiError> {
        let req = self
            .client
            .authed_request(Method::DELETE, &Self::session_path(id, &["files", file_id]))?;
        self.client
            .send_empty(req, "Failed to remove session file")
            .await
    }

    /// Address of `GET /passhare/sessions/{id}/files/{fileId}/download`
    pub fn download_url(&self, id: &str, file_id: &str) -> Url {
        self.client
            .endpoint(&Self::session_path(id, &["files", file_id, "download"]))
    }

    /// Stream a session file to `dest`, returning bytes written
    pub async fn download_to(&self, id: &str, file_id: &str, dest: &Path) -> Result<u64, ApiError> {
        let req = self.client.authed_request(
            Method::GET,
            &Self::session_path(id, &["files", file_id, "download"]),
        )?;
        let resp = self.client.send(req, "Download failed").await?;
        super::write_body(resp, dest).await
    }
}

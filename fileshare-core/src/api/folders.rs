//! Folders

use reqwest::Method;
use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::FolderRecord;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderParams<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
}

pub struct FoldersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FoldersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /folders`
    pub async fn list(&self) -> Result<Vec<FolderRecord>, ApiError> {
        let req = self.client.authed_request(Method::GET, &["folders"])?;
        self.client.send_json(req, "Failed to list folders").await
    }

    /// `POST /folders?name&parentId`; no `parent_id` creates a top-level folder
    pub async fn create(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<FolderRecord, ApiError> {
        let req = self
            .client
            .authed_request(Method::POST, &["folders"])?
            .query(&FolderParams {
                name,
                parent_id: parent_id.filter(|p| !p.is_empty()),
            });

        self.client.send_json(req, "Create folder failed").await
    }

    /// `PATCH /folders/{id}?name`
    pub async fn rename(&self, id: &str, name: &str) -> Result<FolderRecord, ApiError> {
        let req = self
            .client
            .authed_request(Method::PATCH, &["folders", id])?
            .query(&FolderParams {
                name,
                parent_id: None,
            });

        self.client.send_json(req, "Rename folder failed").await
    }

    /// `DELETE /folders/{id}`
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let req = self.client.authed_request(Method::DELETE, &["folders", id])?;
        self.client.send_empty(req, "Delete folder failed").await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::storage::MemoryStorage;
    use crate::ApiClient;

    #[tokio::test]
    async fn test_create_folder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/folders"))
            .and(query_param("name", "Reports 2024"))
            .and(query_param("parentId", "12"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 13, "name": "Reports 2024", "parentId": 12
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/folders"))
            .and(query_param("name", "Top"))
            .and(query_param_is_missing("parentId"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 14, "name": "Top"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();

        let nested = client.folders().create("Reports 2024", Some("12")).await.unwrap();
        assert_eq!(nested.parent_id.unwrap().as_str(), "12");

        let top = client.folders().create("Top", None).await.unwrap();
        assert!(top.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_rename_and_delete_folder() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/folders/13"))
            .and(query_param("name", "Archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 13, "name": "Archive"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/folders/13"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"error": "Folder not empty"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();

        let renamed = client.folders().rename("13", "Archive").await.unwrap();
        assert_eq!(renamed.name.as_deref(), Some("Archive"));

        let err = client.folders().remove("13").await.unwrap_err();
        assert_eq!(err.to_string(), "Folder not empty");
    }

    #[tokio::test]
    async fn test_bare_failures_use_default_messages() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();
        let api = client.folders();
        let cases = [
            ("Failed to list folders", api.list().await.map(drop)),
            ("Create folder failed", api.create("New", Some("1")).await.map(drop)),
            ("Rename folder failed", api.rename("13", "Archive").await.map(drop)),
            ("Delete folder failed", api.remove("13").await),
        ];

        for (expected, result) in cases {
            assert_eq!(result.unwrap_err().to_string(), expected);
        }
    }
}

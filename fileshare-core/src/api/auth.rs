//! Registration and login (form-encoded, no bearer token)

use reqwest::Method;
use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::AuthResponse;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/register`
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        #[derive(Serialize)]
        struct RegisterForm<'a> {
            name: &'a str,
            email: &'a str,
            password: &'a str,
        }

        let req = self
            .client
            .request(Method::POST, &["auth", "register"])
            .form(&RegisterForm {
                name,
                email,
                password,
            });

        self.client.send_json(req, "Register failed").await
    }

    /// `POST /auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        #[derive(Serialize)]
        struct LoginForm<'a> {
            email: &'a str,
            password: &'a str,
        }

        let req = self
            .client
            .request(Method::POST, &["auth", "login"])
            .form(&LoginForm { email, password });

        self.client.send_json(req, "Login failed").await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::storage::{MemoryStorage, Storage};
    use crate::ApiClient;

    #[tokio::test]
    async fn test_login_sends_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("email=ada%40example.com&password=p%26ss"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok",
                "user": {"id": 1, "name": "Ada"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();
        let resp = client.auth().login("ada@example.com", "p&ss").await.unwrap();

        assert_eq!(resp.token.as_deref(), Some("tok"));
        assert_eq!(resp.user.unwrap().get("name"), Some(&json!("Ada")));
    }

    #[tokio::test]
    async fn test_auth_requests_skip_stored_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_string("name=Ada&email=ada%40example.com&password=secret"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "t"})))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        storage.set(crate::TOKEN_KEY, "stale").unwrap();
        let client = ApiClient::new(&server.uri(), storage).unwrap();

        client
            .auth()
            .register("Ada", "ada@example.com", "secret")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_register_failure_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"error": "Email already registered"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();

        let err = client.auth().register("Ada", "a@b.c", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");

        let err = client.auth().login("a@b.c", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "Login failed");
    }

    #[tokio::test]
    async fn test_bare_failures_use_default_messages() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();
        let cases = [
            (
                "Register failed",
                client.auth().register("Ada", "a@b.c", "x").await.map(drop),
            ),
            ("Login failed", client.auth().login("a@b.c", "x").await.map(drop)),
        ];

        for (expected, result) in cases {
            assert_eq!(result.unwrap_err().to_string(), expected);
        }
    }
}

//! Profile of the signed-in user

use reqwest::Method;
use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::User;

/// Changes for `PATCH /users/me`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

pub struct UserApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /users/me`
    pub async fn profile(&self) -> Result<User, ApiError> {
        let req = self.client.authed_request(Method::GET, &["users", "me"])?;
        self.client.send_json(req, "Failed to load profile").await
    }

    /// `PATCH /users/me?name&email`, returns the updated user
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let req = self
            .client
            .authed_request(Method::PATCH, &["users", "me"])?
            .query(update);

        self.client.send_json(req, "Profile update failed").await
    }
}

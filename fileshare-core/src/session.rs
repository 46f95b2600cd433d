//! Session store for fileshare clients
//!
//! Elm-style: every change to the session goes through `SessionAction` and
//! the pure `Session::reduce`. `SessionStore` wraps the reducer with the
//! side effects: calling the auth endpoints, persisting the token and user
//! snapshot, and notifying subscribers through a `watch` channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

use crate::client::{ApiClient, ApiError};
use crate::models::{AuthResponse, User, merge_user};
use crate::storage::{Storage, StorageError};

/// Authentication state seen by the rest of the client
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// True until the stored session has been restored, and while a
    /// login/register is in flight
    pub is_loading: bool,
    /// Message of the last failed login/register
    pub error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
            error: None,
        }
    }
}

/// State transitions
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    LoginStart,
    LoginSuccess(User),
    LoginFailure(String),
    Logout,
    /// Shallow-merge these fields into the user
    UpdateUser(User),
}

impl Session {
    /// Apply one action
    pub fn reduce(self, action: SessionAction) -> Self {
        match action {
            SessionAction::LoginStart => Self {
                is_loading: true,
                error: None,
                ..self
            },
            SessionAction::LoginSuccess(user) => Self {
                user: Some(user),
                is_authenticated: true,
                is_loading: false,
                error: None,
            },
            SessionAction::LoginFailure(message) => Self {
                user: None,
                is_authenticated: false,
                is_loading: false,
                error: Some(message),
            },
            SessionAction::Logout => Self {
                user: None,
                is_authenticated: false,
                is_loading: false,
                error: None,
            },
            SessionAction::UpdateUser(patch) => Self {
                user: Some(merge_user(self.user.as_ref(), &patch)),
                ..self
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    InvalidResponse(String),

    #[error("Failed to encode user: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Profile picture not found: {}", .0.display())]
    PictureNotFound(PathBuf),
}

/// Which auth call is running; picks the invalid-response message
#[derive(Debug, Clone, Copy)]
enum AuthFlow {
    Login,
    Register,
}

impl AuthFlow {
    fn invalid_response(self) -> &'static str {
        match self {
            AuthFlow::Login => "Invalid login response",
            AuthFlow::Register => "Invalid registration response",
        }
    }
}

/// Holds the session, persists it, and drives login/register/logout
pub struct SessionStore {
    client: ApiClient,
    storage: Arc<dyn Storage>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// Create a store sharing the client's storage; call `restore` next
    pub fn new(client: ApiClient) -> Self {
        let storage = Arc::clone(client.storage());
        let (state, _) = watch::channel(Session::default());
        Self {
            client,
            storage,
            state,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Current state
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified after every dispatched action
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: SessionAction) {
        tracing::debug!("Session action: {:?}", action);
        self.state.send_modify(|session| {
            *session = std::mem::take(session).reduce(action);
        });
    }

    /// Load the stored session: signed in only if both the token and a
    /// readable user snapshot are present
    pub fn restore(&self) -> Result<(), SessionError> {
        let token = self.storage.get(crate::TOKEN_KEY)?;
        let user_data = self.storage.get(crate::USER_KEY)?;

        let user = match (token, user_data) {
            (Some(_), Some(data)) => match serde_json::from_str::<User>(&data) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable stored user: {}", e);
                    None
                }
            },
            _ => None,
        };

        match user {
            Some(user) => {
                tracing::info!("Restored stored session");
                self.dispatch(SessionAction::LoginSuccess(user));
            }
            None => self.dispatch(SessionAction::Logout),
        }
        Ok(())
    }

    /// Sign in and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        self.dispatch(SessionAction::LoginStart);
        let result = self.client.auth().login(email, password).await;
        self.complete_auth(AuthFlow::Login, result)
    }

    /// Create an account, then behave like a successful login
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        self.dispatch(SessionAction::LoginStart);
        let result = self.client.auth().register(name, email, password).await;
        self.complete_auth(AuthFlow::Register, result)
    }

    /// Forget the stored token and user
    pub fn logout(&self) -> Result<(), SessionError> {
        let removed = self
            .storage
            .remove(crate::TOKEN_KEY)
            .and_then(|_| self.storage.remove(crate::USER_KEY));

        // Signed out locally even when the file could not be rewritten
        self.dispatch(SessionAction::Logout);
        tracing::info!("Logged out");
        Ok(removed?)
    }

    /// Merge `patch` into the user, persist, and return the merged user
    pub fn update_user(&self, patch: User) -> Result<User, SessionError> {
        let merged = merge_user(self.state.borrow().user.as_ref(), &patch);
        self.storage
            .set(crate::USER_KEY, &serde_json::to_string(&merged)?)?;
        self.dispatch(SessionAction::UpdateUser(patch));
        Ok(merged)
    }

    /// Point the user's `avatar` at a local picture, or clear it with `None`
    ///
    /// Returns the `file://` URL stored as the avatar.
    pub fn update_profile_picture(
        &self,
        picture: Option<&Path>,
    ) -> Result<Option<String>, SessionError> {
        let (avatar, file) = match picture {
            Some(path) => {
                let absolute = std::fs::canonicalize(path)
                    .map_err(|_| SessionError::PictureNotFound(path.to_path_buf()))?;
                let url = Url::from_file_path(&absolute)
                    .map_err(|_| SessionError::PictureNotFound(path.to_path_buf()))?;
                (
                    Some(url.to_string()),
                    Some(absolute.to_string_lossy().into_owned()),
                )
            }
            None => (None, None),
        };

        let mut patch = User::new();
        patch.insert(
            "avatar".to_string(),
            avatar.clone().map(Value::String).unwrap_or(Value::Null),
        );
        patch.insert(
            "profilePictureFile".to_string(),
            file.map(Value::String).unwrap_or(Value::Null),
        );

        self.update_user(patch)?;
        Ok(avatar)
    }

    // Private helpers

    fn complete_auth(
        &self,
        flow: AuthFlow,
        result: Result<AuthResponse, ApiError>,
    ) -> Result<User, SessionError> {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("{:?} failed: {}", flow, message);
                self.dispatch(SessionAction::LoginFailure(message));
                return Err(e.into());
            }
        };

        let Some(token) = response.token.filter(|t| !t.is_empty()) else {
            let message = flow.invalid_response().to_string();
            tracing::warn!("{:?} response carried no token", flow);
            self.dispatch(SessionAction::LoginFailure(message.clone()));
            return Err(SessionError::InvalidResponse(message));
        };

        let user = response.user.unwrap_or_default();

        if let Err(e) = self.persist(&token, &user) {
            self.dispatch(SessionAction::LoginFailure(e.to_string()));
            return Err(e);
        }

        tracing::info!("{:?} succeeded", flow);
        self.dispatch(SessionAction::LoginSuccess(user.clone()));
        Ok(user)
    }

    fn persist(&self, token: &str, user: &User) -> Result<(), SessionError> {
        self.storage.set(crate::TOKEN_KEY, token)?;
        self.storage
            .set(crate::USER_KEY, &serde_json::to_string(user)?)?;
        Ok(())
    }
}

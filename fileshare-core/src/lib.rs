//! fileshare-core: Shared library for the fileshare client
//!
//! This crate provides:
//! - REST gateway for the file-sharing backend (auth, files, folders,
//!   shares, pass-share sessions, user profile)
//! - Session store with durable token/user persistence
//! - Configuration loading

pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod session;
pub mod storage;

pub use client::{ApiClient, ApiError};
pub use config::Config;
pub use models::{Id, User};
pub use session::{Session, SessionAction, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Server used when neither the command line nor the config names one
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Path prefix every REST endpoint lives under
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Storage key holding the JSON user snapshot
pub const USER_KEY: &str = "userData";

//! Endpoint wrappers, one namespace per backend resource
//!
//! Each wrapper performs exactly one HTTP call through `ApiClient`. Obtain
//! them from the client: `client.files().list().await`.

mod auth;
mod files;
mod folders;
mod passhare;
mod shares;
mod user;

pub use auth::AuthApi;
pub use files::{FileUpdate, FilesApi};
pub use folders::FoldersApi;
pub use passhare::PassShareApi;
pub use shares::{NewShare, ShareUpdate, SharesApi};
pub use user::{ProfileUpdate, UserApi};

use reqwest::Response;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::client::ApiError;

/// Stream a download body into a local file, returning bytes written
pub(crate) async fn write_body(mut resp: Response, dest: &Path) -> Result<u64, ApiError> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut written = 0u64;

    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    tracing::debug!("Wrote {} bytes to {}", written, dest.display());
    Ok(written)
}

//! Command execution

use std::path::Path;

use anyhow::{Context, bail};
use serde::Serialize;
use serde_json::{Value, json};

use fileshare_core::api::{FileUpdate, NewShare, ProfileUpdate, ShareUpdate};
use fileshare_core::{ApiClient, SessionStore};

use crate::cli::{
    Command, FilesCommand, FoldersCommand, PassShareCommand, SharesCommand, UserCommand,
};

/// Run one command against the backend
pub async fn run(store: &SessionStore, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = store.login(&email, &password).await?;
            print_json(&json!({ "success": true, "user": user }))
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let user = store.register(&name, &email, &password).await?;
            print_json(&json!({ "success": true, "user": user }))
        }
        Command::Logout => {
            store.logout()?;
            print_json(&json!({ "success": true }))
        }
        Command::Whoami => {
            let session = store.snapshot();
            print_json(&json!({
                "isAuthenticated": session.is_authenticated,
                "user": session.user,
            }))
        }
        Command::Files(cmd) => files(require_session(store)?, cmd).await,
        Command::Folders(cmd) => folders(require_session(store)?, cmd).await,
        Command::Shares(cmd) => shares(store, cmd).await,
        Command::Passhare(cmd) => passhare(require_session(store)?, cmd).await,
        Command::User(cmd) => user(store, cmd).await,
    }
}

/// Client for commands that only make sense when signed in
fn require_session(store: &SessionStore) -> anyhow::Result<&ApiClient> {
    if !store.snapshot().is_authenticated {
        bail!("Not logged in. Run `fileshare login <email>` first.");
    }
    Ok(store.client())
}

async fn files(client: &ApiClient, cmd: FilesCommand) -> anyhow::Result<()> {
    let api = client.files();
    match cmd {
        FilesCommand::List => print_json(&api.list().await?),
        FilesCommand::Upload { path, folder } => {
            let file = api
                .upload(&path, folder.as_deref())
                .await
                .with_context(|| format!("Uploading {}", path.display()))?;
            print_json(&file)
        }
        FilesCommand::Rename { id, name } => {
            print_json(&api.update(&id, &FileUpdate::rename(name)).await?)
        }
        FilesCommand::Star { id } => print_json(&api.update(&id, &FileUpdate::star(true)).await?),
        FilesCommand::Unstar { id } => {
            print_json(&api.update(&id, &FileUpdate::star(false)).await?)
        }
        FilesCommand::Delete { id } => {
            api.remove(&id).await?;
            print_json(&json!({ "deleted": id }))
        }
        FilesCommand::Download { id, output } => {
            let bytes = api.download_to(&id, &output).await?;
            print_json(&download_summary(&output, bytes))
        }
        FilesCommand::Url { id } => {
            print_json(&json!({ "url": api.download_url(&id).to_string() }))
        }
    }
}

async fn folders(client: &ApiClient, cmd: FoldersCommand) -> anyhow::Result<()> {
    let api = client.folders();
    match cmd {
        FoldersCommand::List => print_json(&api.list().await?),
        FoldersCommand::Create { name, parent } => {
            print_json(&api.create(&name, parent.as_deref()).await?)
        }
        FoldersCommand::Rename { id, name } => print_json(&api.rename(&id, &name).await?),
        FoldersCommand::Delete { id } => {
            api.remove(&id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

async fn shares(store: &SessionStore, cmd: SharesCommand) -> anyhow::Result<()> {
    let client = require_session(store)?;
    let api = client.shares();
    match cmd {
        SharesCommand::List => print_json(&api.list().await?),
        SharesCommand::Create {
            file_id,
            share_type,
            created_by,
            options,
        } => {
            // Default the creator to the signed-in user's id
            let created_by = created_by.or_else(|| {
                store
                    .snapshot()
                    .user
                    .and_then(|u| u.get("id").cloned())
                    .map(|id| match id {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
            });

            let share = NewShare {
                file_id,
                share_type,
                permissions: options.permissions,
                expiry_epoch_ms: options.expires,
                password: options.password,
                created_by,
            };
            print_json(&api.create(&share).await?)
        }
        SharesCommand::Update {
            id,
            share_type,
            options,
        } => {
            let update = ShareUpdate {
                share_type,
                permissions: options.permissions,
                expiry_epoch_ms: options.expires,
                password: options.password,
            };
            print_json(&api.update(&id, &update).await?)
        }
        SharesCommand::Delete { id } => {
            api.remove(&id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

async fn passhare(client: &ApiClient, cmd: PassShareCommand) -> anyhow::Result<()> {
    let api = client.passhare();
    match cmd {
        PassShareCommand::Create => print_json(&api.create_session().await?),
        PassShareCommand::Join { code } => print_json(&api.join(&code).await?),
        PassShareCommand::Show { session } => print_json(&api.get(&session).await?),
        PassShareCommand::AddFile { session, file_id } => {
            print_json(&api.add_file(&session, &file_id).await?)
        }
        PassShareCommand::Files { session } => print_json(&api.files(&session).await?),
        PassShareCommand::Participants { session } => {
            print_json(&api.participants(&session).await?)
        }
        PassShareCommand::Leave { session } => {
            api.leave(&session).await?;
            print_json(&json!({ "left": session }))
        }
        PassShareCommand::End { session } => {
            api.end(&session).await?;
            print_json(&json!({ "ended": session }))
        }
        PassShareCommand::RemoveFile { session, file_id } => {
            api.remove_file(&session, &file_id).await?;
            print_json(&json!({ "removed": file_id }))
        }
        PassShareCommand::Download {
            session,
            file_id,
            output,
        } => {
            let bytes = api.download_to(&session, &file_id, &output).await?;
            print_json(&download_summary(&output, bytes))
        }
    }
}

async fn user(store: &SessionStore, cmd: UserCommand) -> anyhow::Result<()> {
    let client = require_session(store)?;
    match cmd {
        UserCommand::Profile => {
            let profile = client.user().profile().await?;
            // Keep the stored snapshot in step with the server
            let user = store.update_user(profile)?;
            print_json(&user)
        }
        UserCommand::Update { name, email } => {
            let update = ProfileUpdate { name, email };
            if update.is_empty() {
                bail!("Nothing to update: pass --name and/or --email");
            }
            let profile = client.user().update_profile(&update).await?;
            let user = store.update_user(profile)?;
            print_json(&user)
        }
        UserCommand::Avatar { path, clear } => {
            let picture = if clear { None } else { path.as_deref() };
            let avatar = store.update_profile_picture(picture)?;
            print_json(&json!({ "success": true, "avatar": avatar }))
        }
    }
}

// Paths are not guaranteed to be UTF-8, so they are reported lossily
fn download_summary(path: &Path, bytes: u64) -> Value {
    json!({ "path": path.display().to_string(), "bytes": bytes })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fileshare_core::{MemoryStorage, SessionAction, User};

    fn signed_out_store() -> SessionStore {
        let client =
            ApiClient::new("http://127.0.0.1:9", Arc::new(MemoryStorage::new())).unwrap();
        let store = SessionStore::new(client);
        store.restore().unwrap();
        store
    }

    #[test]
    fn test_require_session_gates_on_login() {
        let store = signed_out_store();
        let err = require_session(&store).unwrap_err();
        assert!(err.to_string().starts_with("Not logged in"));

        let mut user = User::new();
        user.insert("id".to_string(), json!(1));
        store.dispatch(SessionAction::LoginSuccess(user));
        assert!(require_session(&store).is_ok());
    }

    #[tokio::test]
    async fn test_resource_commands_refused_when_signed_out() {
        let store = signed_out_store();

        let err = run(&store, Command::Files(FilesCommand::List))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Not logged in"));

        let err = run(&store, Command::Shares(SharesCommand::List))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Not logged in"));

        run(&store, Command::Whoami).await.unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_download_summary_with_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"out-\xff.bin"));
        let summary = download_summary(path, 9);

        assert_eq!(summary["bytes"], json!(9));
        assert_eq!(summary["path"], json!("out-\u{fffd}.bin"));
        print_json(&summary).unwrap();
    }
}

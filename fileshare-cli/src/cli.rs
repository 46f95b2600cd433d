//! Command-line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "fileshare", version, about = "Client for the fileshare service")]
pub struct Cli {
    /// Named server from the config file
    #[arg(long, global = true, env = "FILESHARE_SERVER")]
    pub server: Option<String>,

    /// Server base URL, overrides --server and the config
    #[arg(long, global = true, env = "FILESHARE_URL")]
    pub url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long, env = "FILESHARE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        #[arg(long, env = "FILESHARE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Whoami,
    #[command(subcommand)]
    Files(FilesCommand),
    #[command(subcommand)]
    Folders(FoldersCommand),
    #[command(subcommand)]
    Shares(SharesCommand),
    #[command(subcommand)]
    Passhare(PassShareCommand),
    #[command(subcommand)]
    User(UserCommand),
}

/// Files
#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    List,
    Upload {
        path: PathBuf,
        #[arg(long)]
        folder: Option<String>,
    },
    Rename {
        id: String,
        name: String,
    },
    Star {
        id: String,
    },
    Unstar {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Save a file locally
    Download {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the download address without fetching
    Url {
        id: String,
    },
}

/// Folders
#[derive(Debug, Subcommand)]
pub enum FoldersCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    Rename {
        id: String,
        name: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ShareOptions {
    #[arg(long)]
    pub permissions: Option<String>,
    /// Expiry as Unix time in milliseconds
    #[arg(long)]
    pub expires: Option<i64>,
    #[arg(long)]
    pub password: Option<String>,
}

/// Shareable links
#[derive(Debug, Subcommand)]
pub enum SharesCommand {
    List,
    Create {
        file_id: String,
        #[arg(long, default_value = "link")]
        share_type: String,
        #[arg(long)]
        created_by: Option<String>,
        #[command(flatten)]
        options: ShareOptions,
    },
    Update {
        id: String,
        #[arg(long)]
        share_type: Option<String>,
        #[command(flatten)]
        options: ShareOptions,
    },
    Delete {
        id: String,
    },
}

/// Pass-share sessions
#[derive(Debug, Subcommand)]
pub enum PassShareCommand {
    Create,
    Join {
        code: String,
    },
    Show {
        session: String,
    },
    AddFile {
        session: String,
        file_id: String,
    },
    Files {
        session: String,
    },
    Participants {
        session: String,
    },
    Leave {
        session: String,
    },
    End {
        session: String,
    },
    RemoveFile {
        session: String,
        file_id: String,
    },
    Download {
        session: String,
        file_id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Profile
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    Profile,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Set the local profile picture, or clear it with --clear
    Avatar {
        #[arg(required_unless_present = "clear")]
        path: Option<PathBuf>,
        #[arg(long, conflicts_with = "path")]
        clear: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_share_create() {
        let cli = Cli::try_parse_from([
            "fileshare",
            "--url",
            "http://localhost:9000",
            "shares",
            "create",
            "42",
            "--permissions",
            "read",
            "--expires",
            "1767225600000",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("http://localhost:9000"));
        match cli.command {
            Command::Shares(SharesCommand::Create {
                file_id,
                share_type,
                options,
                ..
            }) => {
                assert_eq!(file_id, "42");
                assert_eq!(share_type, "link");
                assert_eq!(options.expires, Some(1_767_225_600_000));
            }
            other => panic!("Wrong command: {:?}", other),
        }
    }

    #[test]
    fn test_avatar_needs_path_or_clear() {
        assert!(Cli::try_parse_from(["fileshare", "user", "avatar"]).is_err());
        assert!(Cli::try_parse_from(["fileshare", "user", "avatar", "--clear"]).is_ok());
    }
}

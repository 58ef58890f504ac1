//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigInput, DEFAULT_POSTS_DIR};

/// Top-level CLI parser for `hashsync`.
#[derive(Debug, Parser)]
#[command(
    name = "hashsync",
    version,
    about = "Sync a directory of markdown posts to a Hashnode publication"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Publish, update, draft or delete posts so the publication matches
    /// the markdown files.
    Publish(PublishArgs),
    /// Parse every markdown file and report what publish would do, offline.
    Check(CheckArgs),
}

/// Arguments for `publish`.
#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Personal access token for the GraphQL API.
    #[arg(long, env = "HASHNODE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Id of the publication posts are created in.
    #[arg(long, env = "HASHNODE_PUBLICATION_ID")]
    pub publication_id: Option<String>,

    /// Publication domain; defaults to `<publication-id>.hashnode.dev`.
    #[arg(long, env = "HASHNODE_PUBLICATION_HOST")]
    pub publication_host: Option<String>,

    /// Directory scanned recursively for markdown files.
    #[arg(long, env = "HASHSYNC_POSTS_DIR")]
    pub posts_directory: Option<PathBuf>,

    /// GraphQL endpoint.
    #[arg(long, env = "HASHNODE_API_URL")]
    pub api_url: Option<String>,

    /// Look everything up but only log the mutations that would be made.
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run report (summary and per-file outcomes) as JSON.
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

impl PublishArgs {
    /// Raw configuration values, before validation.
    #[must_use]
    pub fn config_input(&self) -> ConfigInput {
        ConfigInput {
            access_token: self.access_token.clone(),
            publication_id: self.publication_id.clone(),
            publication_host: self.publication_host.clone(),
            posts_directory: self.posts_directory.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

/// Arguments for `check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Directory scanned recursively for markdown files.
    #[arg(long, env = "HASHSYNC_POSTS_DIR", default_value = DEFAULT_POSTS_DIR)]
    pub posts_directory: PathBuf,
}

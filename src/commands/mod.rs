// Command surface: the clap tree and the helpers the handlers share.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::api::ApiClient;
use crate::config::{self, Config, DEFAULT_API_BASE};
use crate::error::CliError;
use crate::repo::RepoSlug;
use crate::service::RepoService;
use crate::ui::TerminalConfirm;

mod auth;
mod cat;
mod get;
mod init;
mod ls;
mod put;
mod rm;
mod stat;

#[derive(Parser)]
#[command(name = "ghrepo", version, about = "Read and write hosted repository contents from the command line")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Personal access token (overrides GITHUB_TOKEN / GH_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// API base URL
    #[arg(long, global = true, default_value = DEFAULT_API_BASE)]
    pub api_base: String,
    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,
    /// Enable debug logging on stderr (never prints the token)
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Build the single configuration value threaded through a run.
    pub fn to_config(&self) -> Config {
        Config {
            token: config::resolve_token(self.token.as_deref()),
            api_base: self.api_base.clone(),
            timeout: Duration::from_secs(self.timeout),
            json: self.json,
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authentication commands
    Auth(auth::AuthArgs),
    /// Show metadata for a file or directory
    Stat(stat::StatArgs),
    /// List directory contents
    Ls(ls::LsArgs),
    /// Write file content to stdout
    Cat(cat::CatArgs),
    /// Download a file or directory to the local filesystem
    Get(get::GetArgs),
    /// Create or update a file
    Put(put::PutArgs),
    /// Delete a file
    Rm(rm::RmArgs),
    /// Add ghrepo usage notes for a repository to AGENTS.md
    Init(init::InitArgs),
}

impl Commands {
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Commands::Auth(args) => auth::run(args, config),
            Commands::Stat(args) => stat::run(args, config),
            Commands::Ls(args) => ls::run(args, config),
            Commands::Cat(args) => cat::run(args, config),
            Commands::Get(args) => get::run(args, config),
            Commands::Put(args) => put::run(args, config, &TerminalConfirm),
            Commands::Rm(args) => rm::run(args, config, &TerminalConfirm),
            Commands::Init(args) => init::run(args),
        }
    }
}

/// The token, or an auth failure before any network call is made.
pub(crate) fn require_token(config: &Config) -> Result<&str, CliError> {
    config
        .token
        .as_deref()
        .ok_or_else(|| CliError::auth_failure("no token provided: use --token, GITHUB_TOKEN, or GH_TOKEN"))
}

pub(crate) fn api_client(config: &Config) -> Result<ApiClient, CliError> {
    let token = require_token(config)?;
    tracing::debug!(api_base = %config.api_base, timeout = ?config.timeout, "api client");
    ApiClient::new(&config.api_base, token, config.timeout)
}

pub(crate) fn repo_service(config: &Config, repo: &str) -> Result<RepoService<ApiClient>, CliError> {
    let client = api_client(config)?;
    let repo = RepoSlug::parse(repo)?;
    Ok(RepoService::new(client, repo))
}

/// Authenticated configuration pointing at a port nothing listens on, so a
/// handler that gets past its local checks fails with a transport error.
#[cfg(test)]
pub(crate) fn offline_config() -> Config {
    Config {
        token: Some("test-token".to_string()),
        api_base: "http://127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(2),
        ..Config::default()
    }
}

#[cfg(test)]
pub(crate) fn category(err: &anyhow::Error) -> Option<crate::error::Category> {
    err.downcast_ref::<CliError>().map(|e| e.category)
}

/// ` [branch: x]` suffix for confirmation prompts.
pub(crate) fn branch_suffix(branch: &str) -> String {
    if branch.is_empty() {
        String::new()
    } else {
        format!(" [branch: {branch}]")
    }
}

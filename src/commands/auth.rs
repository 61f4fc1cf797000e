// `auth check`: confirm the token works and report the remaining rate limit.

use clap::{Args, Subcommand};

use crate::api::ContentsApi;
use crate::config::Config;
use crate::output::{self, AuthReport};

#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommand,
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Verify that the configured token is valid
    Check,
}

pub fn run(args: AuthArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        AuthCommand::Check => check(config),
    }
}

fn check(config: &Config) -> anyhow::Result<()> {
    let client = super::api_client(config)?;
    let identity = client.get_identity()?;

    let report = AuthReport {
        status: "ok".to_string(),
        user: identity.login,
        rate_limit_remaining: identity.rate_limit_remaining,
    };
    output::print_auth(&mut std::io::stdout().lock(), &report, config.json)?;
    Ok(())
}

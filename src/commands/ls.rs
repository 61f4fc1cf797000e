// `ls`: list a directory, optionally the whole subtree.

use clap::Args;

use crate::config::Config;
use crate::output;

#[derive(Args)]
pub struct LsArgs {
    /// Repository as owner/name
    repo: String,
    /// Directory inside the repository ("." for the root)
    #[arg(default_value = ".")]
    path: String,
    /// Git ref (branch, tag, or commit)
    #[arg(long = "ref", default_value = "")]
    git_ref: String,
    /// List the whole subtree using the tree endpoint
    #[arg(short, long)]
    recursive: bool,
}

pub fn run(args: LsArgs, config: &Config) -> anyhow::Result<()> {
    let service = super::repo_service(config, &args.repo)?;
    let entries = service.list(&args.git_ref, &args.path, args.recursive)?;
    output::print_entries(&mut std::io::stdout().lock(), &entries, config.json)?;
    Ok(())
}

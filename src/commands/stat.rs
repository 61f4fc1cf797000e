// `stat`: metadata for one remote path.

use clap::Args;

use crate::config::Config;
use crate::output;

#[derive(Args)]
pub struct StatArgs {
    /// Repository as owner/name
    repo: String,
    /// Path inside the repository
    path: String,
    /// Git ref (branch, tag, or commit)
    #[arg(long = "ref", default_value = "")]
    git_ref: String,
}

pub fn run(args: StatArgs, config: &Config) -> anyhow::Result<()> {
    let service = super::repo_service(config, &args.repo)?;
    let entry = service.stat(&args.git_ref, &args.path)?;
    output::print_entry(&mut std::io::stdout().lock(), &entry, config.json)?;
    Ok(())
}

// `cat`: raw file bytes to stdout.

use std::io::Write;

use clap::Args;

use crate::config::Config;

#[derive(Args)]
pub struct CatArgs {
    /// Repository as owner/name
    repo: String,
    /// File inside the repository
    path: String,
    /// Git ref (branch, tag, or commit)
    #[arg(long = "ref", default_value = "")]
    git_ref: String,
}

pub fn run(args: CatArgs, config: &Config) -> anyhow::Result<()> {
    let service = super::repo_service(config, &args.repo)?;
    let data = service.read_file(&args.git_ref, &args.path)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}

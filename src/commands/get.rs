// `get`: download a file or directory under `--out`.

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::ui;

#[derive(Args)]
pub struct GetArgs {
    /// Repository as owner/name
    repo: String,
    /// File or directory inside the repository
    path: String,
    /// Local output path
    #[arg(long, short)]
    out: PathBuf,
    /// Git ref (branch, tag, or commit)
    #[arg(long = "ref", default_value = "")]
    git_ref: String,
    /// Replace files that already exist locally
    #[arg(long)]
    overwrite: bool,
}

pub fn run(args: GetArgs, config: &Config) -> anyhow::Result<()> {
    let service = super::repo_service(config, &args.repo)?;

    let spinner = ui::spinner(&format!("Downloading {}...", args.path));
    let result = service.download(&args.git_ref, &args.path, &args.out, args.overwrite);
    spinner.finish_and_clear();

    let written = result?;
    eprintln!("downloaded {written} file(s) to {}", args.out.display());
    Ok(())
}

// `put`: create or update one file from a local file or stdin.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::error::CliError;
use crate::output;
use crate::ui::{self, Confirm};

#[derive(Args)]
pub struct PutArgs {
    /// Repository as owner/name
    repo: String,
    /// Destination path inside the repository
    path: String,
    /// Commit message
    #[arg(short, long)]
    message: String,
    /// Target branch (defaults to the repository's default branch)
    #[arg(short, long, default_value = "")]
    branch: String,
    /// Local file to upload
    #[arg(long)]
    file: Option<PathBuf>,
    /// Read content from stdin (requires --yes)
    #[arg(long)]
    stdin: bool,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

fn read_content(args: &PutArgs) -> Result<Vec<u8>, CliError> {
    match (&args.file, args.stdin) {
        (None, false) => Err(CliError::bad_args("one of --file or --stdin is required")),
        (Some(_), true) => Err(CliError::bad_args("--file and --stdin are mutually exclusive")),
        (None, true) => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(|e| CliError::bad_args("failed to read from stdin").with_source(e))?;
            Ok(buf)
        }
        (Some(path), false) => std::fs::read(path)
            .map_err(|e| CliError::bad_args(format!("failed to read file {}", path.display())).with_source(e)),
    }
}

pub fn run(args: PutArgs, config: &Config, confirm: &dyn Confirm) -> anyhow::Result<()> {
    if args.message.is_empty() {
        return Err(CliError::bad_args("--message / -m is required").into());
    }
    // Stdin carries the content, so there is nothing left to answer a prompt with.
    if args.stdin && !args.yes {
        return Err(CliError::user_abort("reading content from --stdin requires --yes").into());
    }

    let service = super::repo_service(config, &args.repo)?;
    let content = read_content(&args)?;

    let prompt = format!(
        "About to create/update {}/{}{}.",
        service.repo(),
        args.path,
        super::branch_suffix(&args.branch)
    );
    ui::confirm_or_abort(confirm, &prompt, args.yes)?;

    let result = service.create_or_update_file(&args.branch, &args.path, &args.message, &content)?;
    output::print_mutation(&mut std::io::stdout().lock(), &result, config.json)?;
    Ok(())
}

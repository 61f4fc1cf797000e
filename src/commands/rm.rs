// `rm`: delete a single file after confirmation.

use clap::Args;

use crate::config::Config;
use crate::error::CliError;
use crate::output;
use crate::ui::{self, Confirm};

#[derive(Args)]
pub struct RmArgs {
    /// Repository as owner/name
    repo: String,
    /// File to delete
    path: String,
    /// Commit message
    #[arg(short, long)]
    message: String,
    /// Target branch (defaults to the repository's default branch)
    #[arg(short, long, default_value = "")]
    branch: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub fn run(args: RmArgs, config: &Config, confirm: &dyn Confirm) -> anyhow::Result<()> {
    if args.message.is_empty() {
        return Err(CliError::bad_args("--message / -m is required").into());
    }

    let service = super::repo_service(config, &args.repo)?;
    let prompt = format!(
        "About to delete {}/{}{}.",
        service.repo(),
        args.path,
        super::branch_suffix(&args.branch)
    );
    ui::confirm_or_abort(confirm, &prompt, args.yes)?;

    let result = service.delete_file(&args.branch, &args.path, &args.message)?;
    output::print_mutation(&mut std::io::stdout().lock(), &result, config.json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{category, offline_config};
    use crate::error::Category;
    use crate::ui::{Panics, Scripted};

    fn args(yes: bool) -> RmArgs {
        RmArgs {
            repo: "owner/repo".into(),
            path: "old.txt".into(),
            message: "remove old file".into(),
            branch: "main".into(),
            yes,
        }
    }

    #[test]
    fn declined_prompt_aborts_without_deleting() {
        let err = run(args(false), &offline_config(), &Scripted(false)).unwrap_err();
        assert_eq!(category(&err), Some(Category::UserAbort));
    }

    #[test]
    fn yes_skips_the_prompt() {
        let err = run(args(true), &offline_config(), &Panics).unwrap_err();
        assert_eq!(category(&err), Some(Category::Transport));
    }

    #[test]
    fn empty_message_is_bad_args() {
        let mut args = args(true);
        args.message.clear();
        let err = run(args, &offline_config(), &Panics).unwrap_err();
        assert_eq!(category(&err), Some(Category::BadArgs));
    }
}

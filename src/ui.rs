// UI layer: the interactive bits of the CLI. Confirmation is a small
// capability trait so commands can be driven by a scripted answer in tests;
// the terminal implementation uses `dialoguer`, the transfer spinner
// `indicatif`.

use std::io::IsTerminal;
use std::time::Duration;

use dialoguer::Confirm as ConfirmPrompt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliError;

/// Ask the user a yes/no question.
pub trait Confirm {
    fn confirm(&self, message: &str) -> Result<bool, CliError>;
}

/// Prompts on the terminal. Refuses to block when stdin is not a terminal.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, message: &str) -> Result<bool, CliError> {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::user_abort("non-interactive session requires --yes flag"));
        }
        ConfirmPrompt::new()
            .with_prompt(format!("{message} Continue?"))
            .default(false)
            .interact()
            .map_err(|e| CliError::user_abort("confirmation prompt failed").with_source(e))
    }
}

/// Fixed answer; used for scripted runs and tests.
pub struct Scripted(pub bool);

impl Confirm for Scripted {
    fn confirm(&self, _message: &str) -> Result<bool, CliError> {
        Ok(self.0)
    }
}

/// Gate a mutating operation. `assume_yes` skips the question entirely.
pub fn confirm_or_abort(confirm: &dyn Confirm, message: &str, assume_yes: bool) -> Result<(), CliError> {
    if assume_yes || confirm.confirm(message)? {
        Ok(())
    } else {
        Err(CliError::user_abort("operation cancelled by user"))
    }
}

/// Spinner on stderr; hidden automatically when stderr is not a terminal.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Fails the test if a prompt is ever shown.
#[cfg(test)]
pub(crate) struct Panics;

#[cfg(test)]
impl Confirm for Panics {
    fn confirm(&self, _message: &str) -> Result<bool, CliError> {
        panic!("prompt must not be shown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Category;

    #[test]
    fn yes_flag_skips_prompt() {
        assert!(confirm_or_abort(&Panics, "About to delete x.", true).is_ok());
    }

    #[test]
    fn declined_is_user_abort() {
        let err = confirm_or_abort(&Scripted(false), "About to delete x.", false).unwrap_err();
        assert_eq!(err.category, Category::UserAbort);
        assert!(confirm_or_abort(&Scripted(true), "About to delete x.", false).is_ok());
    }
}

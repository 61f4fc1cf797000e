// Entrypoint: parse arguments, build the run's configuration, set up
// logging, then hand over to the command. Errors are printed in the
// selected output format and mapped onto the exit-code table.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghrepo::commands::Cli;
use ghrepo::error::{CliError, EXIT_BAD_ARGS, EXIT_UNCLASSIFIED};
use ghrepo::output;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ghrepo=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Error plus every cause below it.
fn format_error(err: &anyhow::Error) -> String {
    let mut msg = err.to_string();
    for cause in err.chain().skip(1) {
        msg.push_str(&format!("\n  caused by: {cause}"));
    }
    msg
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>()
        .map(CliError::exit_code)
        .unwrap_or(EXIT_UNCLASSIFIED)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => err.exit(),
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(EXIT_BAD_ARGS as u8);
        }
    };

    let config = cli.global.to_config();
    init_tracing(config.verbose);

    match cli.command.run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&mut std::io::stderr().lock(), &format_error(&err), config.json);
            ExitCode::from(exit_code(&err) as u8)
        }
    }
}

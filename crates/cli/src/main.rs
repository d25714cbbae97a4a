use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use seedsync_cli::seedsync_core::SyncError;
use seedsync_cli::{Cli, init_tracing, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(summary) => {
            if !cli.quiet {
                print!("{summary}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            // unresolved paths are usage errors: clap prints usage and exits 2
            if let Some(SyncError::MissingArgument(name)) = err.downcast_ref::<SyncError>() {
                Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        format!("the following required argument was not provided: {name}"),
                    )
                    .exit();
            }
            eprintln!("{} {err:#}", "ERROR:".red().bold());
            ExitCode::FAILURE
        }
    }
}

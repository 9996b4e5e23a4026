mod anthropic;
mod app;
mod cli;
mod constants;
mod dispatcher;
mod error;
mod gemini;
mod history;
mod input;
mod logging;
mod openai;
mod output;
mod profile;
mod prompt;
mod provider;
mod registry;
mod store;

use std::process::ExitCode;

use crate::app::run_app;
use crate::cli::CliCommand;
use crate::error::{ClippyError, EXIT_USAGE};
use crate::logging::{init_logging, log_error};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let command = CliCommand::from_args();

    match run_app(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&format!("{e:#}"));

            match e.downcast_ref::<ClippyError>() {
                Some(clippy_error) => {
                    eprintln!("Error: {clippy_error}");
                    if let Some(hint) = clippy_error.hint() {
                        eprintln!("{hint}");
                    }
                    ExitCode::from(clippy_error.exit_code())
                }
                None => {
                    eprintln!("Error: {e:#}");
                    ExitCode::from(EXIT_USAGE)
                }
            }
        }
    }
}

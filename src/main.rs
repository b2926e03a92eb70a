use std::process::ExitCode;

use clap::Parser;

use stockdesk::cli::Cli;
use stockdesk::startup::run;

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

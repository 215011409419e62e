//! Storefront command-line client

use std::{io, process::ExitCode};

use clap::Parser;
use storefront_app::context::AppContext;

use crate::{config::Cli, errors::CliError};

mod commands;
mod config;
mod errors;
mod observability;
mod render;

#[tokio::main]
async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "command errors are reported to the user, not only logged"
            )]
            {
                eprintln!("error: {}", errors::report(&error));
            }

            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    observability::init_subscriber(&cli.logging)?;

    let context = AppContext::from_config(cli.api.to_api_config(), cli.storage.state_file).await?;

    let mut out = io::stdout();

    cli.command.run(&context, &mut out).await
}

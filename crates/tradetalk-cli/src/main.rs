mod cli;
mod commands;
mod error;
mod output;
mod session;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tradetalk_core::AppConfig;

use crate::cli::{Cli, Command};
use crate::commands::Services;
use crate::error::CliError;
use crate::session::Session;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let services = Services::from_config(build_config(cli)?);
    tracing::debug!(config = ?services.config, "configuration resolved");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(dispatch(cli, &services))
}

async fn dispatch(cli: &Cli, services: &Services) -> Result<(), CliError> {
    match &cli.command {
        None | Some(Command::Menu) => {
            let directory = services.load_directory()?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut session = Session::new(services, &directory, stdin.lock(), stdout.lock())
                .with_format(cli.format, cli.pretty);
            session.run().await
        }
        Some(_) => {
            let stdout = io::stdout();
            commands::execute(cli, services, &mut stdout.lock()).await
        }
    }
}

/// Environment first, then command-line overrides.
fn build_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::from_env()?;
    if cli.mock {
        config = config.with_mock(true);
    }
    if let Some(path) = &cli.directory {
        config = config.with_directory_path(path);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    Ok(config)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

mod cli;
mod commands;
mod error;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use panelnode_api::PanelClient;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(panelnode_config::config_path);
    let client = build_client(&config_path)?;

    tracing::debug!(command = ?cli.command, "dispatching command");
    match cli.command {
        Command::Check => commands::check(&client),
        Command::Rules => commands::rules(&client),
        Command::Get(args) => commands::get(&client, &args).await,
    }
}

/// Load the node config and build the panel client.
///
/// An unsupported node type or an invalid local rule ends the process with
/// a non-zero exit code; an unreadable rule file only logs a warning.
fn build_client(config_path: &Path) -> Result<PanelClient, CliError> {
    let config_error = |source| CliError::Config {
        source,
        path: config_path.display().to_string(),
    };

    let node = panelnode_config::load_config(config_path).map_err(config_error)?;
    let client_config = node.to_client_config().map_err(config_error)?;

    PanelClient::new(&client_config).map_err(CliError::from)
}

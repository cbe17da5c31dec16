mod cli;
mod commands;
mod output;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Watch { dashboard } => commands::watch::run(dashboard).await,
        Command::Discover {
            host,
            identity,
            port,
        } => commands::discover::run(host, identity, port).await,
        Command::Identity(args) => commands::identity::run(args.command).await,
        Command::Dashboards => commands::dashboards(),
        Command::Config(args) => commands::config_cmd::run(args.command),
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

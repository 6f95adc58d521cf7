mod cli;
mod commands;
mod error;
mod logging;
mod scene;
mod snapshot;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\nError: {e}");
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file)?;

    info!("minim v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
    }
}

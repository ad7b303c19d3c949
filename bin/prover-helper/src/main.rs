//! Prover helper binary.

use clap::Parser;

mod cli;
mod logging;
mod styles;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = cli::Cli::parse();
    cli.logging.init_tracing()?;
    cli.run().await
}

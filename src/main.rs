//! Entry point wiring CLI dispatch to the enrichment flows.

use anyhow::Result;
use sentiscope::{cli::Cli, config::Settings, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing()?;
    let cli = Cli::parse();
    let settings = Settings::load()?;

    info!(command = ?cli.command(), "starting command");
    cli.dispatch(settings).await
}

//! Command-line interface wiring for sentiscope.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Settings;

pub mod enrich;
pub mod score;

/// Top-level CLI definition. Not `Debug`: it may carry the subscription key.
#[derive(Parser)]
#[command(author, version, about = "Text Analytics sentiment enrichment", long_about = None)]
pub struct Cli {
    /// Subscription key, overriding TEXT_ANALYTICS_KEY.
    #[arg(long, global = true)]
    key: Option<String>,
    /// Azure region of the Text Analytics resource, overriding TEXT_ANALYTICS_REGION.
    #[arg(long, global = true)]
    region: Option<String>,
    /// Full service endpoint, overriding the region-derived one.
    #[arg(long, global = true)]
    endpoint: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// The selected sub-command, safe to log.
    pub fn command(&self) -> &Commands {
        &self.command
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, mut settings: Settings) -> Result<()> {
        if let Some(key) = self.key {
            settings.subscription_key = Some(key);
        }
        if let Some(region) = self.region {
            settings.region = region;
        }
        if let Some(endpoint) = self.endpoint {
            settings.endpoint = Some(endpoint);
        }
        match self.command {
            Commands::Score(args) => score::run(args, settings).await,
            Commands::Enrich(args) => enrich::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score a batch of documents in one request and print the results.
    Score(score::Args),
    /// Add a sentiment score column to every row of a CSV table.
    Enrich(enrich::Args),
}

/// Output style for the `score` command.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// `Document Id:  <id> , Sentiment Score:  <score>` per scored document.
    #[default]
    Text,
    /// One JSON object per submitted document, including skipped ones.
    Json,
}

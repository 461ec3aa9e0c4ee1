//! CLI entry-point for scoring a batch of documents in one request.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    analytics::{self, Document, TextAnalyticsClient},
    cli::OutputFormat,
    config::Settings,
    report::{self, DocumentStatus},
};

/// Args for the `score` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// JSON array of `{id, language?, text?}`; the built-in sample is used when omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Language for documents that do not declare one.
    #[arg(long)]
    pub language: Option<String>,
    /// Output style.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
struct InputDocument {
    id: String,
    language: Option<String>,
    text: Option<String>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let language = args.language.unwrap_or_else(|| settings.language.clone());
    let documents = match &args.input {
        Some(path) => load_documents(path, &language)?,
        None => {
            info!("no input given; scoring the built-in sample documents");
            analytics::sample_documents()
        }
    };

    let client = TextAnalyticsClient::from_settings(&settings)?;
    info!(documents = documents.len(), url = client.url(), "submitting sentiment batch");
    let outcome = analytics::analyze(&client, &documents)
        .await
        .context("sentiment request failed")?;

    let statuses = report::collate(&documents, &outcome);
    for (id, status) in &statuses {
        match status {
            DocumentStatus::Skipped => info!(%id, "no text; not scored"),
            DocumentStatus::Rejected { message } => warn!(%id, %message, "rejected by service"),
            DocumentStatus::Missing => warn!(%id, "no result returned"),
            DocumentStatus::Scored { .. } => {}
        }
    }

    let lines = match args.format {
        OutputFormat::Text => report::score_lines(&outcome),
        OutputFormat::Json => report::json_lines(&statuses)?,
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Read documents from a JSON array file, filling in `language` where absent.
pub fn load_documents(path: &Path, language: &str) -> Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
    let parsed: Vec<InputDocument> =
        serde_json::from_str(&raw).with_context(|| format!("parse documents in {path:?}"))?;
    Ok(parsed
        .into_iter()
        .map(|d| Document {
            id: d.id,
            language: d.language.unwrap_or_else(|| language.to_string()),
            text: d.text,
        })
        .collect())
}

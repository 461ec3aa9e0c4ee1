//! CLI entry-point for row-wise table enrichment.

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    analytics::TextAnalyticsClient,
    config::Settings,
    enrich::{self, EnrichOptions, ProjectionOptions},
    table,
};

/// Args for the `enrich` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// CSV file with a header row.
    #[arg(long)]
    pub input: PathBuf,
    /// Destination (.csv or .parquet); defaults to `<outputs>/<input stem>_sentiment.csv`.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Column holding the text to score.
    #[arg(long, default_value = "store comments")]
    pub text_col: String,
    /// Structured `{score, error}` result column.
    #[arg(long, default_value = "StoreCommentSentimentObj")]
    pub output_col: String,
    /// Per-row error message column.
    #[arg(long, default_value = "Errors")]
    pub error_col: String,
    /// Scalar score column produced by the projection.
    #[arg(long, default_value = "StoreCommentSentimentScore")]
    pub score_col: String,
    /// Maximum in-flight requests; overrides ENRICH_CONCURRENCY.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Language of the text column.
    #[arg(long)]
    pub language: Option<String>,
    /// Keep the structured and error columns instead of projecting the score (Parquet only).
    #[arg(long)]
    pub raw: bool,
    /// Rows to preview on stdout after writing.
    #[arg(long, default_value_t = 2)]
    pub show: usize,
    /// Rows sampled for schema inference.
    #[arg(long, default_value_t = table::DEFAULT_INFER_ROWS)]
    pub infer_rows: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table");
        settings.join_output(format!("{stem}_sentiment.csv"))
    });
    if args.raw {
        ensure!(
            output.extension().and_then(|e| e.to_str()) == Some("parquet"),
            "--raw keeps structured columns and needs a .parquet output"
        );
    }

    let options = EnrichOptions {
        text_col: args.text_col.clone(),
        output_col: args.output_col.clone(),
        error_col: args.error_col.clone(),
        language: args
            .language
            .clone()
            .unwrap_or_else(|| settings.language.clone()),
        concurrency: args.concurrency.unwrap_or(settings.concurrency),
    };
    options.validate()?;

    let df = table::read_csv(&args.input, args.infer_rows)?;
    let client = TextAnalyticsClient::from_settings(&settings)?;
    info!(url = client.url(), concurrency = options.concurrency, "enriching table");

    let enriched = enrich::enrich_frame(&client, &df, &options)
        .await
        .context("enrich table")?;

    let mut result = if args.raw {
        enriched
    } else {
        let projection = ProjectionOptions {
            output_col: args.output_col.clone(),
            error_col: args.error_col.clone(),
            score_col: args.score_col.clone(),
        };
        enrich::project_score(&enriched, &projection)?
    };

    table::write_table(&mut result, &output)?;
    if args.show > 0 {
        println!("{}", result.head(Some(args.show)));
    }
    Ok(())
}

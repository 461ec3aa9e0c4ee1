//! Row-wise table enrichment against the sentiment capability.
//!
//! Every row becomes a single-document request. At most `concurrency` requests are in flight;
//! they complete in any order, but each outcome is written back to the row it came from.

pub mod projection;

use anyhow::{bail, ensure, Context, Result};
use futures::stream::{self, StreamExt};
use polars::prelude::*;
use tracing::{debug, info, instrument};

use crate::analytics::{self, Document, Enricher};

pub use projection::{project_score, ProjectionOptions};

/// Field names inside the structured result column.
pub const SCORE_FIELD: &str = "score";
pub const ERROR_FIELD: &str = "error";

const SCORE_STAGE: &str = "__sentiscope_score";
const ERROR_STAGE: &str = "__sentiscope_error";

/// Result of enriching one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Scored(f64),
    /// Null or empty text; nothing was sent.
    Skipped,
    Failed(String),
}

impl RowOutcome {
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Scored(score) => Some(*score),
            Self::Skipped | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            Self::Scored(_) | Self::Skipped => None,
        }
    }
}

/// Column and dispatch settings for [`enrich_frame`].
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub text_col: String,
    pub output_col: String,
    pub error_col: String,
    pub language: String,
    pub concurrency: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            text_col: "store comments".to_string(),
            output_col: "StoreCommentSentimentObj".to_string(),
            error_col: "Errors".to_string(),
            language: "en".to_string(),
            concurrency: 10,
        }
    }
}

impl EnrichOptions {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.concurrency >= 1, "concurrency must be at least 1");
        ensure!(
            self.output_col != self.error_col,
            "output and error columns must differ (both {:?})",
            self.output_col
        );
        for name in [&self.output_col, &self.error_col] {
            if *name == self.text_col {
                bail!("column {name:?} would overwrite the text column");
            }
            if name.is_empty() || name.as_str() == SCORE_STAGE || name.as_str() == ERROR_STAGE {
                bail!("invalid output column name {name:?}");
            }
        }
        Ok(())
    }
}

/// Tally of row outcomes, logged after each enrichment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub scored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl EnrichSummary {
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            match outcome {
                RowOutcome::Scored(_) => acc.scored += 1,
                RowOutcome::Skipped => acc.skipped += 1,
                RowOutcome::Failed(_) => acc.failed += 1,
            }
            acc
        })
    }
}

/// Score each text independently with bounded concurrency.
///
/// The returned vector is aligned with `texts`. Failures are captured per row and never abort
/// sibling rows.
pub async fn enrich_texts<E>(
    enricher: &E,
    texts: Vec<Option<String>>,
    language: &str,
    concurrency: usize,
) -> Vec<RowOutcome>
where
    E: Enricher + ?Sized,
{
    let mut outcomes: Vec<Option<RowOutcome>> = vec![None; texts.len()];

    let mut completed = stream::iter(texts.into_iter().enumerate())
        .map(move |(idx, text)| async move {
            let doc = Document {
                id: idx.to_string(),
                language: language.to_string(),
                text,
            };
            (idx, score_row(enricher, doc).await)
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((idx, outcome)) = completed.next().await {
        outcomes[idx] = Some(outcome);
    }

    outcomes
        .into_iter()
        .map(|o| o.unwrap_or_else(|| RowOutcome::Failed("row was not processed".into())))
        .collect()
}

async fn score_row<E>(enricher: &E, doc: Document) -> RowOutcome
where
    E: Enricher + ?Sized,
{
    let row = doc.id.clone();
    match analytics::analyze(enricher, std::slice::from_ref(&doc)).await {
        Ok(outcome) => {
            if let Some(result) = outcome.results.into_iter().find(|r| r.id == row) {
                RowOutcome::Scored(result.score)
            } else if outcome.skipped.contains(&row) {
                RowOutcome::Skipped
            } else if let Some(err) = outcome.errors.into_iter().find(|e| e.id == row) {
                RowOutcome::Failed(err.message)
            } else {
                RowOutcome::Failed("service returned no result for row".into())
            }
        }
        Err(err) => {
            debug!(%row, %err, "row enrichment failed");
            RowOutcome::Failed(err.to_string())
        }
    }
}

/// Enrich `df` with a structured `{score, error}` column and an error column.
///
/// Row count and order are preserved. Only configuration problems are returned as errors.
#[instrument(skip_all, fields(rows = df.height(), text_col = %options.text_col))]
pub async fn enrich_frame<E>(
    enricher: &E,
    df: &DataFrame,
    options: &EnrichOptions,
) -> Result<DataFrame>
where
    E: Enricher + ?Sized,
{
    options.validate()?;
    let texts = text_column(df, &options.text_col)?;

    let outcomes = enrich_texts(enricher, texts, &options.language, options.concurrency).await;
    let summary = EnrichSummary::from_outcomes(&outcomes);
    info!(
        scored = summary.scored,
        skipped = summary.skipped,
        failed = summary.failed,
        concurrency = options.concurrency,
        "enrichment complete"
    );

    attach_outcomes(df, &outcomes, &options.output_col, &options.error_col)
}

/// Attach per-row outcomes as the structured result column and the error column.
pub fn attach_outcomes(
    df: &DataFrame,
    outcomes: &[RowOutcome],
    output_col: &str,
    error_col: &str,
) -> Result<DataFrame> {
    ensure!(
        outcomes.len() == df.height(),
        "{} outcomes for {} rows",
        outcomes.len(),
        df.height()
    );

    let scores: Vec<Option<f64>> = outcomes.iter().map(RowOutcome::score).collect();
    let errors: Vec<Option<String>> = outcomes
        .iter()
        .map(|o| o.error().map(str::to_owned))
        .collect();

    let mut staged = df.clone();
    staged.with_column(Series::new(SCORE_STAGE.into(), scores))?;
    staged.with_column(Series::new(ERROR_STAGE.into(), errors))?;

    let enriched = staged
        .lazy()
        .with_columns([
            as_struct(vec![
                col(SCORE_STAGE).alias(SCORE_FIELD),
                col(ERROR_STAGE).alias(ERROR_FIELD),
            ])
            .alias(output_col),
            col(ERROR_STAGE).alias(error_col),
        ])
        .collect()?
        .drop(SCORE_STAGE)?
        .drop(ERROR_STAGE)?;
    Ok(enriched)
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("text column {name:?} not found"))?;
    let as_text = column.cast(&DataType::String)?;
    let values = as_text
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect();
    Ok(values)
}

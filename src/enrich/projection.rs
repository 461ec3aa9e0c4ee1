//! Score projection: flatten the structured result column into a scalar score column.

use anyhow::{ensure, Context, Result};
use polars::prelude::*;

use super::SCORE_FIELD;

/// Columns involved in [`project_score`].
#[derive(Debug, Clone)]
pub struct ProjectionOptions {
    pub output_col: String,
    pub error_col: String,
    pub score_col: String,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            output_col: "StoreCommentSentimentObj".to_string(),
            error_col: "Errors".to_string(),
            score_col: "StoreCommentSentimentScore".to_string(),
        }
    }
}

/// Append the structured column's `score` field as `score_col`, then drop the structured and
/// error columns.
///
/// Pure: the input frame is left untouched and no remote calls are made. Rows without a score
/// keep a null. A missing error column is tolerated.
pub fn project_score(df: &DataFrame, options: &ProjectionOptions) -> Result<DataFrame> {
    ensure!(
        options.score_col != options.output_col && options.score_col != options.error_col,
        "score column {:?} collides with the columns it replaces",
        options.score_col
    );
    df.column(&options.output_col)
        .with_context(|| format!("structured column {:?} not found", options.output_col))?;

    let mut projected = df
        .clone()
        .lazy()
        .with_column(
            col(options.output_col.as_str())
                .struct_()
                .field_by_name(SCORE_FIELD)
                .cast(DataType::Float64)
                .alias(options.score_col.as_str()),
        )
        .collect()?
        .drop(&options.output_col)?;

    if projected.get_column_index(&options.error_col).is_some() {
        projected = projected.drop(&options.error_col)?;
    }
    Ok(projected)
}

//! Tabular IO: header-bearing CSV in, CSV or Parquet out.

use std::{fs::File, path::Path};

use anyhow::{bail, Context, Result};
use polars::prelude::{
    CsvReadOptions, CsvWriter, DataFrame, DataType, ParquetWriter, SerReader, SerWriter,
};
use tracing::info;

/// Rows sampled when inferring column types.
pub const DEFAULT_INFER_ROWS: usize = 100;

/// Read a CSV with a header row, inferring column types from the first `infer_rows` rows.
pub fn read_csv(path: &Path, infer_rows: usize) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(infer_rows))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("open {}", path.display()))?
        .finish()
        .with_context(|| format!("parse {}", path.display()))?;
    info!(path = %path.display(), rows = df.height(), columns = df.width(), "loaded table");
    Ok(df)
}

/// Write `df` as Parquet when the extension is `.parquet`, CSV otherwise.
///
/// Structured columns cannot be represented in CSV and are rejected there.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));

    if parquet {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        ParquetWriter::new(file).finish(df)?;
    } else {
        if let Some(name) = df
            .get_columns()
            .iter()
            .find(|c| matches!(c.dtype(), DataType::Struct(_)))
            .map(|c| c.name().to_string())
        {
            bail!("column {name:?} is structured; write to a .parquet path instead");
        }
        let mut file =
            File::create(path).with_context(|| format!("create {}", path.display()))?;
        CsvWriter::new(&mut file).finish(df)?;
    }
    info!(path = %path.display(), rows = df.height(), "wrote table");
    Ok(())
}

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::{
    frame::DataFrame,
    io::{SerReader, SerWriter},
    prelude::{CsvReader, CsvWriter},
};

/// Reads a CSV file from `path` into a Polars DataFrame.
pub fn read_from_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).with_context(|| format!("Failed to open csv: {}", path.display()))?;
    let df = CsvReader::new(file).finish()?;
    Ok(df)
}

/// Writes a Polars DataFrame to a CSV file at `path`.
pub fn write_to_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create csv: {}", path.display()))?;
    CsvWriter::new(file).finish(df)?;
    Ok(())
}

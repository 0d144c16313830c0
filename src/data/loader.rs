//! CSV Data Loader Module
//! Reads indicator CSV files into Polars DataFrames.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::DatasetSpec;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV '{}': {source}", path.display())]
    CsvError {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file. Empty fields become nulls; malformed rows are errors.
    ///
    /// Column types are inferred from every row, so a decimal deep in a
    /// long integer column widens it to float.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let csv_error = |source| LoaderError::CsvError {
            path: path.to_path_buf(),
            source,
        };

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_missing_is_null(true)
            .finish()
            .map_err(csv_error)?
            .collect()
            .map_err(csv_error)?;

        debug!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded csv"
        );
        Ok(df)
    }

    /// Load every dataset in order. The first failure aborts the whole load.
    pub fn load_all(datasets: &[DatasetSpec]) -> Result<Vec<DataFrame>, LoaderError> {
        datasets
            .iter()
            .map(|dataset| Self::load_csv(&dataset.path))
            .collect()
    }
}

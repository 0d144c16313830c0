//! CSV Writer Module
//! Persists the merged table.

use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to create '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// What was written, for the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

pub struct DataWriter;

impl DataWriter {
    /// Write `df` as CSV with a header row and no index column, replacing
    /// any existing file. Missing parent directories are created.
    pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<WriteSummary, WriterError> {
        let io_error = |source| WriterError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut file = File::create(path).map_err(io_error)?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;

        info!("Processed data saved to {}", path.display());
        info!("Total countries in final dataset: {}", df.height());

        Ok(WriteSummary {
            path: path.to_path_buf(),
            rows: df.height(),
            columns: df.width(),
        })
    }
}

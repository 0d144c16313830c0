//! Pipeline Module
//! Runs load, clean, filter, merge, save and chart rendering in order.

use polars::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::charts::{ChartError, ChartPlotter};
use crate::config::PipelineConfig;
use crate::data::{
    DataLoader, DataMerger, DataProcessor, DataWriter, LoaderError, ProcessorError, WriteSummary,
    WriterError,
};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Process(#[from] ProcessorError),
    #[error(transparent)]
    Write(#[from] WriterError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub year: i64,
    pub output: WriteSummary,
    /// Chart files written, in configuration order.
    pub charts: Vec<PathBuf>,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<RunReport, PipelineError> {
        let config = &self.config;

        info!("Loading {} datasets", config.datasets.len());
        let raw = DataLoader::load_all(&config.datasets)?;

        info!("Cleaning datasets");
        let cleaned = config
            .datasets
            .iter()
            .zip(&raw)
            .map(|(dataset, df)| DataProcessor::clean(df, dataset))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Filtering datasets to year {}", config.year);
        let mut filtered = Vec::with_capacity(cleaned.len());
        for (dataset, df) in config.datasets.iter().zip(&cleaned) {
            let df = DataProcessor::filter_year(df, &dataset.name, config.year)?;
            if df.height() == 0 {
                warn!(
                    "Dataset '{}' has no rows for year {}",
                    dataset.name, config.year
                );
            }
            filtered.push((dataset.name.clone(), df));
        }

        info!("Merging datasets on Entity and Code");
        let mut merged: DataFrame = DataMerger::merge(filtered)?;
        if merged.height() == 0 {
            warn!("Merged dataset is empty; writing header only");
        }

        info!("Saving merged dataset");
        let output = DataWriter::write_csv(&mut merged, &config.output)?;

        if !config.charts.is_empty() {
            info!("Rendering {} charts", config.charts.len());
        }
        let mut charts = Vec::with_capacity(config.charts.len());
        for chart in &config.charts {
            match ChartPlotter::render(&merged, chart, config.year)? {
                Some(path) => charts.push(path),
                None => warn!(
                    "No values to plot for {}; chart skipped",
                    chart.output().display()
                ),
            }
        }

        Ok(RunReport {
            year: config.year,
            output,
            charts,
        })
    }
}

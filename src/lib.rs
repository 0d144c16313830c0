//! Indicator Join - year-filtered inner join of per-country indicator CSV files
//!
//! Loads each configured dataset, keeps one indicator column per dataset,
//! restricts every dataset to a single year and joins them on (Entity, Code),
//! then renders the configured charts of the joined table.

pub mod charts;
pub mod config;
pub mod data;
pub mod logging;
pub mod pipeline;

pub use config::{ChartSpec, DatasetSpec, PipelineConfig, Preset};
pub use pipeline::{Pipeline, PipelineError, RunReport};

//! Pipeline Configuration Module
//! Built-in presets and TOML pipeline definitions.

use clap::ValueEnum;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::{CODE, ENTITY, YEAR};

/// OWID region grouping column shipped with several of the raw datasets.
pub const OWID_REGION_COLUMN: &str = "World regions according to OWID";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid pipeline definition: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Pipeline defines no datasets")]
    NoDatasets,
    #[error("Indicator column '{0}' is used by more than one dataset")]
    DuplicateIndicator(String),
    #[error("Dataset '{dataset}' uses key column '{column}' as its indicator")]
    KeyAsIndicator { dataset: String, column: String },
    #[error("Chart '{}' plots '{column}', which is not an indicator of this pipeline", output.display())]
    UnknownChartColumn { output: PathBuf, column: String },
}

/// Built-in pipeline variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// Poverty and schooling, 2020
    #[default]
    Level1,
    /// GDP, life expectancy, child mortality and HDI, 2022
    Level2,
}

/// One input dataset of the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    pub path: PathBuf,
    pub indicator: String,
    #[serde(default)]
    pub drop_columns: Vec<String>,
}

impl DatasetSpec {
    pub fn new(name: &str, path: impl Into<PathBuf>, indicator: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            indicator: indicator.to_string(),
            drop_columns: Vec::new(),
        }
    }

    pub fn with_drop_columns(mut self, columns: &[&str]) -> Self {
        self.drop_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// A chart rendered from the joined table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    /// Distribution of one indicator across countries.
    Histogram {
        column: String,
        title: String,
        x_label: String,
        output: PathBuf,
    },
    /// One point per country.
    Scatter {
        x: String,
        y: String,
        title: String,
        x_label: String,
        y_label: String,
        output: PathBuf,
    },
}

impl ChartSpec {
    pub fn columns(&self) -> Vec<&str> {
        match self {
            ChartSpec::Histogram { column, .. } => vec![column.as_str()],
            ChartSpec::Scatter { x, y, .. } => vec![x.as_str(), y.as_str()],
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            ChartSpec::Histogram { output, .. } | ChartSpec::Scatter { output, .. } => output,
        }
    }
}

/// Complete definition of one pipeline run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    pub year: i64,
    pub output: PathBuf,
    pub datasets: Vec<DatasetSpec>,
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
}

impl PipelineConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Level1 => Self::level1(),
            Preset::Level2 => Self::level2(),
        }
    }

    /// Extreme poverty against mean years of schooling.
    pub fn level1() -> Self {
        Self {
            year: 2020,
            output: PathBuf::from("data/processed/level1_data.csv"),
            datasets: vec![
                DatasetSpec::new(
                    "poverty",
                    "data/raw/share-of-population-in-extreme-poverty.csv",
                    "Share of population in poverty ($3 a day)",
                ),
                DatasetSpec::new(
                    "education",
                    "data/raw/mean-years-of-schooling-long-run.csv",
                    "Average years of schooling",
                ),
            ],
            charts: Vec::new(),
        }
    }

    /// Economic and health indicators.
    pub fn level2() -> Self {
        Self {
            year: 2022,
            output: PathBuf::from("data/processed/level2_data.csv"),
            datasets: vec![
                DatasetSpec::new(
                    "gdp",
                    "data/raw/gdp-per-capita-worldbank.csv",
                    "GDP per capita",
                )
                .with_drop_columns(&[OWID_REGION_COLUMN]),
                DatasetSpec::new(
                    "life_expectancy",
                    "data/raw/life-expectancy.csv",
                    "Life expectancy",
                )
                .with_drop_columns(&[OWID_REGION_COLUMN]),
                DatasetSpec::new(
                    "child_mortality",
                    "data/raw/child-mortality.csv",
                    "Under-five mortality rate",
                ),
                DatasetSpec::new(
                    "hdi",
                    "data/raw/human-development-index.csv",
                    "Human Development Index",
                ),
            ],
            charts: vec![
                ChartSpec::Histogram {
                    column: "GDP per capita".to_string(),
                    title: "Distribution of GDP per Capita".to_string(),
                    x_label: "GDP per Capita (USD)".to_string(),
                    output: PathBuf::from("data/processed/charts/gdp-histogram.svg"),
                },
                ChartSpec::Histogram {
                    column: "Life expectancy".to_string(),
                    title: "Distribution of Life Expectancy".to_string(),
                    x_label: "Life Expectancy (Years)".to_string(),
                    output: PathBuf::from("data/processed/charts/life-expectancy-histogram.svg"),
                },
                ChartSpec::Scatter {
                    x: "Life expectancy".to_string(),
                    y: "GDP per capita".to_string(),
                    title: "Life Expectancy vs GDP per Capita".to_string(),
                    x_label: "Life Expectancy (Years)".to_string(),
                    y_label: "GDP per Capita (USD)".to_string(),
                    output: PathBuf::from("data/processed/charts/life-expectancy-vs-gdp.svg"),
                },
            ],
        }
    }

    /// Load and validate a TOML pipeline definition.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Indicator names must be distinct and must not shadow the key columns,
    /// otherwise the join would rename or collide them. Charts may only plot
    /// indicator columns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.datasets.is_empty() {
            return Err(ConfigError::NoDatasets);
        }

        let mut seen = HashSet::new();
        for dataset in &self.datasets {
            let indicator = dataset.indicator.as_str();
            if [ENTITY, CODE, YEAR].contains(&indicator) {
                return Err(ConfigError::KeyAsIndicator {
                    dataset: dataset.name.clone(),
                    column: dataset.indicator.clone(),
                });
            }
            if !seen.insert(indicator) {
                return Err(ConfigError::DuplicateIndicator(dataset.indicator.clone()));
            }
        }

        let indicators = self.indicators();
        for chart in &self.charts {
            if let Some(column) = chart.columns().into_iter().find(|c| !indicators.contains(c)) {
                return Err(ConfigError::UnknownChartColumn {
                    output: chart.output().to_path_buf(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Indicator columns in output order.
    pub fn indicators(&self) -> Vec<&str> {
        self.datasets.iter().map(|d| d.indicator.as_str()).collect()
    }
}

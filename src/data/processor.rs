//! Data Processor Module
//! Handles data cleaning and year filtering.

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::{CODE, ENTITY, JOIN_KEYS, YEAR};
use crate::config::DatasetSpec;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Dataset '{dataset}' has no column '{column}'")]
    MissingColumn { dataset: String, column: String },
    #[error("No datasets to merge")]
    NoDatasets,
}

/// Handles cleaning and filtering of a single dataset.
pub struct DataProcessor;

impl DataProcessor {
    /// Drop the configured columns, keep the key, year and indicator columns,
    /// and remove rows with a missing value in any of them.
    ///
    /// Running it again on its own output returns the same frame.
    pub fn clean(df: &DataFrame, dataset: &DatasetSpec) -> Result<DataFrame, ProcessorError> {
        let df = Self::drop_columns(df, &dataset.drop_columns)?;

        let retained = [ENTITY, CODE, YEAR, dataset.indicator.as_str()];
        Self::require_columns(&df, &dataset.name, &retained)?;

        let projected = df
            .select(retained)?
            .lazy()
            .with_columns([
                col(ENTITY).cast(DataType::String),
                col(CODE).cast(DataType::String),
            ])
            .collect()?;

        let cleaned = Self::drop_missing(&projected)?;
        debug!(
            dataset = %dataset.name,
            before = df.height(),
            after = cleaned.height(),
            "cleaned"
        );
        Ok(cleaned)
    }

    /// Remove the named columns. Columns that are already gone are skipped.
    pub fn drop_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame, ProcessorError> {
        let mut df = df.clone();
        for column in columns {
            if df.get_column_index(column).is_some() {
                df = df.drop(column)?;
            }
        }
        Ok(df)
    }

    /// Remove every row holding a null (or a NaN, for float columns) in any column.
    pub fn drop_missing(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let predicate = df
            .get_columns()
            .iter()
            .map(|column| {
                let present = col(column.name().as_str()).is_not_null();
                if column.dtype().is_float() {
                    present.and(col(column.name().as_str()).is_not_nan())
                } else {
                    present
                }
            })
            .reduce(|acc, expr| acc.and(expr));

        match predicate {
            Some(predicate) => Ok(df.clone().lazy().filter(predicate).collect()?),
            None => Ok(df.clone()),
        }
    }

    /// Keep only rows of the target year and drop the `Year` column.
    ///
    /// A year with no rows yields an empty frame, not an error.
    pub fn filter_year(
        df: &DataFrame,
        dataset: &str,
        year: i64,
    ) -> Result<DataFrame, ProcessorError> {
        Self::require_columns(df, dataset, &[YEAR])?;

        let filtered = df
            .clone()
            .lazy()
            .filter(col(YEAR).cast(DataType::Int64).eq(lit(year)))
            .collect()?
            .drop(YEAR)?;

        debug!(dataset, year, rows = filtered.height(), "filtered by year");
        Ok(filtered)
    }

    /// Check the join key columns are present.
    pub fn require_keys(df: &DataFrame, dataset: &str) -> Result<(), ProcessorError> {
        Self::require_columns(df, dataset, &JOIN_KEYS)
    }

    fn require_columns(
        df: &DataFrame,
        dataset: &str,
        columns: &[&str],
    ) -> Result<(), ProcessorError> {
        match columns
            .iter()
            .find(|column| df.get_column_index(column).is_none())
        {
            Some(column) => Err(ProcessorError::MissingColumn {
                dataset: dataset.to_string(),
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poverty_spec() -> DatasetSpec {
        DatasetSpec::new("poverty", "poverty.csv", "Poverty")
            .with_drop_columns(&["World regions according to OWID"])
    }

    fn raw_poverty() -> DataFrame {
        df!(
            "Entity" => ["Chad", "Chad", "World", "France", "Kenya"],
            "Code" => [Some("TCD"), Some("TCD"), None, Some("FRA"), Some("KEN")],
            "Year" => [2019i64, 2020, 2020, 2020, 2020],
            "Poverty" => [Some(35.1), Some(33.5), Some(9.1), Some(0.1), None],
            "World regions according to OWID" => [Some("Africa"), Some("Africa"), None, Some("Europe"), Some("Africa")]
        )
        .unwrap()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<String> {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn clean_drops_region_column_and_incomplete_rows() {
        let cleaned = DataProcessor::clean(&raw_poverty(), &poverty_spec()).unwrap();

        assert_eq!(
            cleaned.get_column_names().iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            ["Entity", "Code", "Year", "Poverty"]
        );
        assert_eq!(strings(&cleaned, "Entity"), ["Chad", "Chad", "France"]);
        for column in cleaned.get_columns() {
            assert_eq!(column.null_count(), 0, "nulls left in {}", column.name());
        }
    }

    #[test]
    fn clean_is_idempotent() {
        let spec = poverty_spec();
        let once = DataProcessor::clean(&raw_poverty(), &spec).unwrap();
        let twice = DataProcessor::clean(&once, &spec).unwrap();
        assert!(once.equals(&twice));
    }

    #[test]
    fn clean_projects_away_unrelated_columns() {
        let df = df!(
            "Entity" => ["Chad"],
            "Code" => ["TCD"],
            "Year" => [2020i64],
            "Poverty" => [33.5],
            "Notes" => [None::<&str>]
        )
        .unwrap();
        let cleaned = DataProcessor::clean(&df, &DatasetSpec::new("p", "p.csv", "Poverty")).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert!(cleaned.get_column_index("Notes").is_none());
    }

    #[test]
    fn clean_reports_missing_indicator() {
        let spec = DatasetSpec::new("education", "education.csv", "Average years of schooling");
        let err = DataProcessor::clean(&raw_poverty(), &spec).unwrap_err();
        match err {
            ProcessorError::MissingColumn { dataset, column } => {
                assert_eq!(dataset, "education");
                assert_eq!(column, "Average years of schooling");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn drop_missing_treats_nan_as_missing() {
        let df = df!(
            "Entity" => ["Chad", "France"],
            "Value" => [f64::NAN, 0.1]
        )
        .unwrap();
        let cleaned = DataProcessor::drop_missing(&df).unwrap();
        assert_eq!(strings(&cleaned, "Entity"), ["France"]);
    }

    #[test]
    fn filter_year_keeps_only_target_rows() {
        let cleaned = DataProcessor::clean(&raw_poverty(), &poverty_spec()).unwrap();
        let filtered = DataProcessor::filter_year(&cleaned, "poverty", 2020).unwrap();

        assert!(filtered.get_column_index("Year").is_none());
        assert_eq!(strings(&filtered, "Entity"), ["Chad", "France"]);
        let poverty: Vec<f64> = filtered
            .column("Poverty")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(poverty, [33.5, 0.1]);
    }

    #[test]
    fn filter_year_without_matches_is_empty() {
        let filtered = DataProcessor::filter_year(&raw_poverty(), "poverty", 1990).unwrap();
        assert_eq!(filtered.height(), 0);
        assert!(filtered.get_column_index("Year").is_none());
        assert!(filtered.get_column_index("Poverty").is_some());
    }

    #[test]
    fn filter_year_requires_year_column() {
        let df = df!("Entity" => ["Chad"], "Code" => ["TCD"]).unwrap();
        assert!(matches!(
            DataProcessor::filter_year(&df, "poverty", 2020),
            Err(ProcessorError::MissingColumn { column, .. }) if column == "Year"
        ));
    }
}

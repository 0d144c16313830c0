//! Inner join of prepared datasets on (Entity, Code).

use polars::prelude::*;
use tracing::debug;

use super::processor::{DataProcessor, ProcessorError};
use super::JOIN_KEYS;

pub struct DataMerger;

impl DataMerger {
    /// Fold the datasets left to right with inner joins on the join keys.
    ///
    /// Each item pairs a dataset label with its frame. Keys missing from any
    /// input are dropped from the result, and surviving rows keep the order
    /// of the first dataset.
    pub fn merge(frames: Vec<(String, DataFrame)>) -> Result<DataFrame, ProcessorError> {
        let mut frames = frames.into_iter();
        let (first_name, first) = frames.next().ok_or(ProcessorError::NoDatasets)?;
        DataProcessor::require_keys(&first, &first_name)?;

        let mut merged = first;
        for (name, df) in frames {
            DataProcessor::require_keys(&df, &name)?;
            merged = Self::inner_join(merged, df)?;
            debug!(dataset = %name, rows = merged.height(), "joined");
        }
        Ok(merged)
    }

    fn inner_join(left: DataFrame, right: DataFrame) -> PolarsResult<DataFrame> {
        let keys: Vec<Expr> = JOIN_KEYS.iter().map(|key| col(*key)).collect();
        left.lazy()
            .join(
                right.lazy(),
                keys.clone(),
                keys,
                JoinArgs {
                    maintain_order: MaintainOrderJoin::Left,
                    ..JoinArgs::new(JoinType::Inner)
                },
            )
            .collect()
    }
}

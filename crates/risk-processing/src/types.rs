//! Result types returned by the preparation pipeline.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a preparation run did to the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparationSummary {
    /// Rows in the loaded dataset.
    pub rows_before: usize,
    /// Rows in the prepared dataset.
    pub rows_after: usize,
    /// Rows dropped by the outlier filter.
    pub outlier_rows_removed: usize,
    /// Number of imputed values per column.
    pub imputed_values: BTreeMap<String, usize>,
    /// Indicator columns created by one-hot encoding, in frame order.
    pub indicator_columns: Vec<String>,
    /// Boolean columns cast to integers.
    pub boolean_columns_cast: Vec<String>,
    /// Human-readable description of each step, in execution order.
    pub processing_steps: Vec<String>,
}

impl PreparationSummary {
    /// Total number of imputed values across all columns.
    pub fn total_imputed(&self) -> usize {
        self.imputed_values.values().sum()
    }
}

/// A prepared dataset together with its [`PreparationSummary`].
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Fully numeric frame, ready for model fitting.
    pub frame: DataFrame,
    pub summary: PreparationSummary,
}

//! Group-wise median imputation.
//!
//! Missing values in a numeric column are filled with the median of the
//! rows that share the same key in a categorical column. The computation is
//! split in two passes: [`GroupMedians::compute`] builds the key → median
//! table from the current frame, [`GroupMedians::apply`] fills the column.

use std::collections::BTreeMap;

use crate::error::{PreparationError, Result};
use crate::utils::{column_f64, column_strings, fill_numeric_nulls_with};
use polars::prelude::*;
use tracing::{debug, warn};

/// Medians of a value column, per group key and over the whole column.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMedians {
    value_column: String,
    group_column: String,
    by_group: BTreeMap<String, f64>,
    global: Option<f64>,
}

impl GroupMedians {
    /// Compute the median of `value_column` for every key of `group_column`.
    ///
    /// Groups whose values are all missing get no entry and fall back to the
    /// global median when applied. A column with no values at all has no
    /// global median either; that only matters if [`apply`](Self::apply)
    /// finds a row to fill.
    pub fn compute(df: &DataFrame, value_column: &str, group_column: &str) -> Result<Self> {
        let values = column_f64(df, value_column)?;
        let keys = column_strings(df, group_column)?;

        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (key, value) in keys.iter().zip(&values) {
            if let (Some(key), Some(value)) = (key, value) {
                grouped.entry(key.clone()).or_default().push(*value);
            }
        }

        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let global = median(present);

        let by_group = grouped
            .into_iter()
            .filter_map(|(key, group_values)| median(group_values).map(|m| (key, m)))
            .collect();

        Ok(Self {
            value_column: value_column.to_string(),
            group_column: group_column.to_string(),
            by_group,
            global,
        })
    }

    /// Median for a group key, if the group had any values.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.by_group.get(key).copied()
    }

    /// Median over every non-missing value of the column, if it had any.
    pub fn global(&self) -> Option<f64> {
        self.global
    }

    /// Fill missing values of the value column in place.
    ///
    /// Returns the number of values filled. Fails with
    /// [`PreparationError::NoValidValues`] if a missing row has neither a
    /// group median nor a global median to fall back on; the frame is left
    /// unchanged in that case.
    pub fn apply(&self, df: &mut DataFrame, processing_steps: &mut Vec<String>) -> Result<usize> {
        let values = column_f64(df, &self.value_column)?;
        let keys = column_strings(df, &self.group_column)?;

        let mut fallbacks = 0;
        let (filled_series, filled) = fill_numeric_nulls_with(&values, &self.value_column, |i| {
            match keys[i].as_deref().and_then(|k| self.get(k)) {
                Some(m) => Some(m),
                None => {
                    fallbacks += 1;
                    self.global
                }
            }
        });

        match self.global {
            None if fallbacks > 0 => {
                return Err(PreparationError::NoValidValues(self.value_column.clone()));
            }
            Some(global) if fallbacks > 0 => warn!(
                "{} rows of '{}' had no '{}' group median; used global median {:.4}",
                fallbacks, self.value_column, self.group_column, global
            ),
            _ => {}
        }
        df.replace(&self.value_column, filled_series)?;

        processing_steps.push(format!(
            "Filled {} missing '{}' values with the median per '{}' ({} from global median)",
            filled, self.value_column, self.group_column, fallbacks
        ));
        debug!(
            "Imputed {} values in '{}' grouped by '{}'",
            filled, self.value_column, self.group_column
        );

        Ok(filled)
    }
}

/// Median of a set of values; `None` when empty.
fn median(values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Series::new(PlSmallStr::EMPTY, values).median()
}

//! Outlier handling module.
//!
//! Removes rows whose age or employment length cannot be real and are
//! treated as data-entry errors.

use crate::config::{ColumnSchema, MAX_EMPLOYMENT_YEARS, MAX_PERSON_AGE};
use crate::error::Result;
use crate::utils::column_f64;
use polars::prelude::*;
use tracing::debug;

/// Drops rows with implausible applicant attributes.
pub struct OutlierFilter;

impl OutlierFilter {
    /// Remove rows with age ≥ [`MAX_PERSON_AGE`] or employment length ≥
    /// [`MAX_EMPLOYMENT_YEARS`].
    ///
    /// Rows where either value is missing are kept. Returns the number of
    /// rows removed.
    pub fn remove_invalid_rows(
        df: &mut DataFrame,
        columns: &ColumnSchema,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let original_rows = df.height();

        let ages = column_f64(df, &columns.age)?;
        let employment = column_f64(df, &columns.employment_length)?;

        let mask_values: Vec<bool> = ages
            .iter()
            .zip(&employment)
            .map(|(age, emp)| {
                let age_ok = age.is_none_or(|v| v < MAX_PERSON_AGE);
                let emp_ok = emp.is_none_or(|v| v < MAX_EMPLOYMENT_YEARS);
                age_ok && emp_ok
            })
            .collect();

        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        *df = df.filter(&mask)?;

        let rows_removed = original_rows - df.height();
        processing_steps.push(format!(
            "Removed {} rows with {} >= {} or {} >= {}",
            rows_removed, columns.age, MAX_PERSON_AGE, columns.employment_length, MAX_EMPLOYMENT_YEARS
        ));
        debug!("Removed {} outlier rows", rows_removed);

        Ok(rows_removed)
    }
}

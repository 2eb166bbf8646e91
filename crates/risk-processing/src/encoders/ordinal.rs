//! Fixed-mapping encoders.
//!
//! Every value of the column must appear in the mapping; anything else,
//! including a missing value, is rejected with
//! [`PreparationError::UnknownCategory`].

use crate::error::{PreparationError, Result};
use crate::utils::column_strings;
use polars::prelude::*;
use tracing::debug;

/// Loan grades from safest to riskiest.
pub const LOAN_GRADES: [(&str, i64); 7] = [
    ("A", 0),
    ("B", 1),
    ("C", 2),
    ("D", 3),
    ("E", 4),
    ("F", 5),
    ("G", 6),
];

/// Binary yes/no flag.
pub const YES_NO: [(&str, i64); 2] = [("Y", 1), ("N", 0)];

/// Replaces a categorical column with integer codes from a fixed mapping.
#[derive(Debug, Clone, Copy)]
pub struct OrdinalEncoder {
    mapping: &'static [(&'static str, i64)],
}

impl OrdinalEncoder {
    pub const fn new(mapping: &'static [(&'static str, i64)]) -> Self {
        Self { mapping }
    }

    /// Encoder for loan grades `A`..`G` → `0`..`6`.
    pub const fn loan_grade() -> Self {
        Self::new(&LOAN_GRADES)
    }

    /// Encoder for `Y`/`N` flags → `1`/`0`.
    pub const fn yes_no() -> Self {
        Self::new(&YES_NO)
    }

    /// Code for a single value, if it is part of the mapping.
    pub fn code(&self, value: &str) -> Option<i64> {
        self.mapping
            .iter()
            .find(|(label, _)| *label == value)
            .map(|(_, code)| *code)
    }

    /// Replace `column` with its `Int64` codes.
    pub fn encode(
        &self,
        df: &mut DataFrame,
        column: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let values = column_strings(df, column)?;

        let codes = values
            .iter()
            .map(|value| {
                value
                    .as_deref()
                    .and_then(|v| self.code(v))
                    .ok_or_else(|| PreparationError::unknown_category(column, value.as_deref()))
            })
            .collect::<Result<Vec<i64>>>()?;

        df.replace(column, Series::new(column.into(), codes))?;

        let labels: Vec<String> = self
            .mapping
            .iter()
            .map(|(label, code)| format!("{}={}", label, code))
            .collect();
        processing_steps.push(format!("Encoded '{}' as {}", column, labels.join(", ")));
        debug!("Ordinal-encoded column '{}'", column);

        Ok(())
    }
}

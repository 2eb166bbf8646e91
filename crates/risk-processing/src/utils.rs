//! Shared utilities for the data preparation pipeline.
//!
//! Column access helpers used by the outlier filter, the imputers and the
//! encoders, so that each step reads values the same way.

use crate::error::{PreparationError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

// =============================================================================
// Schema Utilities
// =============================================================================

/// Check whether the frame has a column with the given name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Fail with [`PreparationError::ColumnNotFound`] on the first absent column.
pub fn require_columns<'a>(
    df: &DataFrame,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for name in names {
        if !has_column(df, name) {
            return Err(PreparationError::ColumnNotFound(name.to_string()));
        }
    }
    Ok(())
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Get a column as a materialized Series, mapping absence to a schema error.
pub fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    if !has_column(df, name) {
        return Err(PreparationError::ColumnNotFound(name.to_string()));
    }
    Ok(df.column(name)?.as_materialized_series())
}

/// Read a numeric column as `f64` values, keeping nulls.
///
/// NaN values are treated as missing.
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = series(df, name)?;
    if !is_numeric_dtype(series.dtype()) {
        return Err(PreparationError::TypeConversionFailed {
            column: name.to_string(),
            target_type: "Float64".to_string(),
            reason: format!("column has non-numeric type {}", series.dtype()),
        });
    }

    let floats = series.cast(&DataType::Float64)?;
    let values = floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Read a column as trimmed strings, keeping nulls.
///
/// Empty strings are treated as missing.
pub fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = series(df, name)?;
    let strings = series.cast(&DataType::String)?;
    let values = strings
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric column with per-row values.
///
/// `fill` is consulted only for rows whose value is missing; returning `None`
/// leaves the row missing.
pub fn fill_numeric_nulls_with<F>(
    values: &[Option<f64>],
    name: &str,
    mut fill: F,
) -> (Series, usize)
where
    F: FnMut(usize) -> Option<f64>,
{
    let mut filled = 0;
    let result: Vec<Option<f64>> = values
        .iter()
        .enumerate()
        .map(|(i, v)| match v {
            Some(v) => Some(*v),
            None => {
                let imputed = fill(i);
                if imputed.is_some() {
                    filled += 1;
                }
                imputed
            }
        })
        .collect();

    (Series::new(name.into(), result), filled)
}

/// Cast every boolean column to `Int64` 0/1 values.
///
/// Returns the names of the columns that were converted.
pub fn normalize_boolean_columns(df: &mut DataFrame) -> Result<Vec<String>> {
    let boolean_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_boolean_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();

    for name in &boolean_columns {
        let as_int = series(df, name)?.cast(&DataType::Int64)?;
        df.replace(name, as_int)?;
    }

    Ok(boolean_columns)
}

// =============================================================================
// Tests
// =============================================================================

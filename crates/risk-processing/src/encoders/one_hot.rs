//! Indicator (one-hot) encoding for nominal columns.

use std::collections::BTreeSet;

use crate::error::{PreparationError, Result};
use crate::utils::{column_strings, has_column};
use polars::prelude::*;
use tracing::debug;

/// Expands a nominal column into `Int64` 0/1 indicator columns.
///
/// The alphabetically-first observed value is the reference level and gets
/// no column, so `k` distinct values produce `k - 1` indicators.
pub struct OneHotEncoder;

impl OneHotEncoder {
    /// Replace `column` by its indicator columns, appended at the end of the
    /// frame as `<column>_<value>` in sorted value order.
    ///
    /// Returns the names of the created columns. Fails with
    /// [`PreparationError::ColumnCollision`] if an indicator name is already
    /// used by another column; the frame is left unchanged in that case.
    pub fn expand(
        df: &mut DataFrame,
        column: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        let values = column_strings(df, column)?;

        let levels: BTreeSet<&str> = values
            .iter()
            .map(|v| {
                v.as_deref()
                    .ok_or_else(|| PreparationError::unknown_category(column, None))
            })
            .collect::<Result<_>>()?;

        let mut levels = levels.into_iter();
        let reference = levels.next();
        let indicators: Vec<(String, Series)> = levels
            .map(|level| {
                let name = format!("{}_{}", column, level);
                let flags: Vec<i64> = values
                    .iter()
                    .map(|v| i64::from(v.as_deref() == Some(level)))
                    .collect();
                let series = Series::new(name.as_str().into(), flags);
                (name, series)
            })
            .collect();

        if let Some((name, _)) = indicators.iter().find(|(name, _)| has_column(df, name)) {
            return Err(PreparationError::ColumnCollision(name.clone()));
        }

        *df = df.drop(column)?;
        for (_, series) in &indicators {
            df.with_column(series.clone())?;
        }

        let created: Vec<String> = indicators.into_iter().map(|(name, _)| name).collect();
        processing_steps.push(format!(
            "One-hot encoded '{}' into {} columns (reference level: {})",
            column,
            created.len(),
            reference.unwrap_or("none")
        ));
        debug!("Expanded '{}' into {:?}", column, created);

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|s| s.to_string()).collect()
    }

    fn ints(df: &DataFrame, column: &str) -> Vec<i64> {
        df.column(column)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_expand_drops_reference_level() {
        let mut df = df![
            "id" => [1, 2, 3, 4],
            "person_home_ownership" => ["RENT", "OWN", "MORTGAGE", "RENT"],
            "loan_amnt" => [100, 200, 300, 400],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let created = OneHotEncoder::expand(&mut df, "person_home_ownership", &mut steps).unwrap();

        // MORTGAGE is the reference level
        assert_eq!(
            created,
            vec![
                "person_home_ownership_OWN".to_string(),
                "person_home_ownership_RENT".to_string()
            ]
        );
        assert_eq!(
            names(&df),
            vec![
                "id",
                "loan_amnt",
                "person_home_ownership_OWN",
                "person_home_ownership_RENT"
            ]
        );
        assert_eq!(ints(&df, "person_home_ownership_OWN"), vec![0, 1, 0, 0]);
        assert_eq!(ints(&df, "person_home_ownership_RENT"), vec![1, 0, 0, 1]);
        assert!(steps[0].contains("reference level: MORTGAGE"));
    }

    #[test]
    fn test_indicators_plus_reference_sum_to_one() {
        let intents = ["EDUCATION", "MEDICAL", "VENTURE", "PERSONAL", "MEDICAL", "EDUCATION"];
        let mut df = df!["loan_intent" => intents].unwrap();
        let mut steps = Vec::new();

        let created = OneHotEncoder::expand(&mut df, "loan_intent", &mut steps).unwrap();
        assert_eq!(created.len(), 3);

        for (row, intent) in intents.iter().enumerate() {
            let sum: i64 = created.iter().map(|c| ints(&df, c)[row]).sum();
            let reference = i64::from(*intent == "EDUCATION");
            assert_eq!(sum + reference, 1, "row {}", row);
        }
    }

    #[test]
    fn test_single_level_produces_no_columns() {
        let mut df = df!["loan_intent" => ["VENTURE", "VENTURE"], "x" => [1, 2]].unwrap();
        let mut steps = Vec::new();

        let created = OneHotEncoder::expand(&mut df, "loan_intent", &mut steps).unwrap();

        assert!(created.is_empty());
        assert_eq!(names(&df), vec!["x"]);
    }

    #[test]
    fn test_existing_indicator_name_is_rejected() {
        let mut df = df![
            "loan_intent" => ["EDUCATION", "VENTURE"],
            "loan_intent_VENTURE" => [7i64, 8],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let err = OneHotEncoder::expand(&mut df, "loan_intent", &mut steps).unwrap_err();

        assert_eq!(err.error_code(), "COLUMN_COLLISION");
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("loan_intent_VENTURE"));
        assert_eq!(names(&df), vec!["loan_intent", "loan_intent_VENTURE"]);
        assert_eq!(ints(&df, "loan_intent_VENTURE"), vec![7, 8]);
        assert!(steps.is_empty());
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let mut df = df!["loan_intent" => [Some("VENTURE"), None]].unwrap();
        let mut steps = Vec::new();

        let err = OneHotEncoder::expand(&mut df, "loan_intent", &mut steps).unwrap_err();
        assert!(err.is_encoding_error());
    }
}

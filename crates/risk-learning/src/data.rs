//! Conversion of prepared DataFrames into feature matrices.
//!
//! The trainers work on dense `ndarray` matrices. [`Dataset`] is the bridge
//! from a prepared polars frame: every non-target column becomes an `f64`
//! feature and the target becomes an `i64` label vector.

use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{Result, TrainingError};

/// Features (and optionally labels) extracted from a prepared frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Option<Array1<i64>>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset from in-memory arrays.
    pub fn new(
        features: Array2<f64>,
        labels: Option<Array1<i64>>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if feature_names.len() != features.ncols() {
            return Err(TrainingError::InvalidData(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                features.ncols()
            )));
        }
        if let Some(labels) = &labels
            && labels.len() != features.nrows()
        {
            return Err(TrainingError::ShapeMismatch {
                features: features.nrows(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    /// Split a frame into features and the `target` label column.
    ///
    /// Fails with [`TrainingError::ColumnNotFound`] if `target` is absent and
    /// [`TrainingError::InvalidData`] on nulls, non-numeric columns or
    /// non-integral labels.
    pub fn from_frame(df: &DataFrame, target: &str) -> Result<Self> {
        if !df.get_column_names().iter().any(|c| c.as_str() == target) {
            return Err(TrainingError::ColumnNotFound(target.to_string()));
        }

        let labels = column_values(df.column(target)?.as_materialized_series())?
            .into_iter()
            .map(|v| {
                if v.fract() == 0.0 {
                    Ok(v as i64)
                } else {
                    Err(TrainingError::InvalidData(format!(
                        "label column '{}' has non-integral value {}",
                        target, v
                    )))
                }
            })
            .collect::<Result<Array1<i64>>>()?;

        let feature_frame = df.drop(target)?;
        let (features, feature_names) = feature_matrix(&feature_frame)?;
        debug!(
            "Built dataset with {} rows, {} features, target '{}'",
            features.nrows(),
            features.ncols(),
            target
        );

        Self::new(features, Some(labels), feature_names)
    }

    /// Use every column of the frame as a feature, without labels.
    pub fn unlabeled(df: &DataFrame) -> Result<Self> {
        let (features, feature_names) = feature_matrix(df)?;
        Self::new(features, None, feature_names)
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Labels, if the dataset was built with a target.
    pub fn labels(&self) -> Option<&Array1<i64>> {
        self.labels.as_ref()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Shuffle rows with `seed` and split off a `test_size` fraction.
    ///
    /// The test set gets `ceil(test_size * n)` rows; both sides must end up
    /// non-empty.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "test_size must be in (0.0, 1.0), got {}",
                test_size
            )));
        }

        let n = self.n_samples();
        let n_test = (test_size * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(TrainingError::EmptyDataset(format!(
                "cannot split {} rows with test_size {}",
                n, test_size
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));
        let (test_idx, train_idx) = indices.split_at(n_test);

        Ok((self.select(train_idx), self.select(test_idx)))
    }

    fn select(&self, rows: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), rows),
            labels: self.labels.as_ref().map(|l| l.select(Axis(0), rows)),
            feature_names: self.feature_names.clone(),
        }
    }
}

/// Check if a DataType can be used as a feature.
fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::Int8
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

/// Non-null `f64` values of a numeric column.
fn column_values(series: &Series) -> Result<Vec<f64>> {
    if !is_numeric_dtype(series.dtype()) {
        return Err(TrainingError::InvalidData(format!(
            "column '{}' has non-numeric type {}",
            series.name(),
            series.dtype()
        )));
    }
    if series.null_count() > 0 {
        return Err(TrainingError::InvalidData(format!(
            "column '{}' has {} missing values",
            series.name(),
            series.null_count()
        )));
    }

    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_no_null_iter().collect())
}

fn feature_matrix(df: &DataFrame) -> Result<(Array2<f64>, Vec<String>)> {
    let mut features = Array2::<f64>::zeros((df.height(), df.width()));
    let mut names = Vec::with_capacity(df.width());

    for (j, column) in df.get_columns().iter().enumerate() {
        let values = column_values(column.as_materialized_series())?;
        features.column_mut(j).assign(&Array1::from(values));
        names.push(column.name().to_string());
    }

    Ok((features, names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn prepared_frame() -> DataFrame {
        df![
            "person_age" => [22, 35, 41, 29],
            "loan_int_rate" => [7.1, 11.0, 13.5, 8.2],
            "loan_status" => [0, 1, 1, 0],
            "person_home_ownership_RENT" => [1, 0, 0, 1],
        ]
        .unwrap()
    }

    #[test]
    fn test_from_frame_separates_target() {
        let dataset = Dataset::from_frame(&prepared_frame(), "loan_status").unwrap();

        assert_eq!(
            dataset.feature_names(),
            &["person_age", "loan_int_rate", "person_home_ownership_RENT"]
        );
        assert_eq!(dataset.labels().unwrap(), &array![0i64, 1, 1, 0]);
        assert_eq!(dataset.features().row(1).to_vec(), vec![35.0, 11.0, 0.0]);
    }

    #[test]
    fn test_from_frame_missing_target() {
        let err = Dataset::from_frame(&prepared_frame(), "defaulted").unwrap_err();
        assert!(matches!(err, TrainingError::ColumnNotFound(c) if c == "defaulted"));
    }

    #[test]
    fn test_from_frame_rejects_strings_and_nulls() {
        let df = df!["grade" => ["A", "B"], "y" => [0, 1]].unwrap();
        assert!(matches!(
            Dataset::from_frame(&df, "y"),
            Err(TrainingError::InvalidData(_))
        ));

        let df = df!["rate" => [Some(1.0), None], "y" => [0, 1]].unwrap();
        let err = Dataset::from_frame(&df, "y").unwrap_err();
        assert!(err.to_string().contains("missing values"));
    }

    #[test]
    fn test_from_frame_rejects_fractional_labels() {
        let df = df!["x" => [1.0, 2.0], "y" => [0.0, 0.5]].unwrap();
        assert!(Dataset::from_frame(&df, "y").is_err());
    }

    #[test]
    fn test_unlabeled_uses_all_columns() {
        let dataset = Dataset::unlabeled(&prepared_frame()).unwrap();
        assert_eq!(dataset.n_features(), 4);
        assert!(dataset.labels().is_none());
    }

    #[test]
    fn test_train_test_split_sizes_and_determinism() {
        let features = Array2::from_shape_fn((10, 2), |(i, j)| (i * 10 + j) as f64);
        let labels = Array1::from_iter((0..10).map(|i| i % 2));
        let dataset =
            Dataset::new(features, Some(labels), vec!["a".into(), "b".into()]).unwrap();

        let (train, test) = dataset.train_test_split(0.25, 7).unwrap();
        assert_eq!(train.n_samples(), 7);
        assert_eq!(test.n_samples(), 3);

        let (train_again, test_again) = dataset.train_test_split(0.25, 7).unwrap();
        assert_eq!(train, train_again);
        assert_eq!(test, test_again);

        // Rows keep their label
        for (row, label) in train.features().rows().into_iter().zip(train.labels().unwrap()) {
            let original = (row[0] / 10.0) as i64;
            assert_eq!(original % 2, *label);
        }
    }

    #[test]
    fn test_train_test_split_rejects_bad_size() {
        let dataset = Dataset::unlabeled(&prepared_frame()).unwrap();
        assert!(dataset.train_test_split(0.0, 7).is_err());
        assert!(dataset.train_test_split(1.0, 7).is_err());
    }
}

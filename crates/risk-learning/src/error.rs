//! Error types for the risk-learning crate.
//!
//! This module defines [`TrainingError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, TrainingError>`.
//!
//! Non-fatal conditions (a logistic regression that ran out of iterations)
//! are not errors; they are recorded as
//! [`TrainingWarning`](crate::TrainingWarning)s on the fitted model.
//!
//! # Example
//!
//! ```no_run
//! use risk_learning::{TrainingConfig, TrainingError};
//!
//! fn configure() -> Result<TrainingConfig, TrainingError> {
//!     // Errors are automatically propagated with ?
//!     let config = TrainingConfig::builder()
//!         .random_seed(7)
//!         .build()?;
//!     Ok(config)
//! }
//! ```

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for risk-learning operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrainingError {
    /// Invalid configuration provided to a trainer.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training.
    ///
    /// Common causes:
    /// - Feature matrix contains NaN or infinite values
    /// - A DataFrame column is not numeric or contains nulls
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The feature matrix has no rows or no columns.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Feature rows and label count disagree.
    #[error("Shape mismatch: {features} feature rows but {labels} labels")]
    ShapeMismatch {
        /// Number of rows in the feature matrix.
        features: usize,
        /// Length of the label vector.
        labels: usize,
    },

    /// A fitted model was given a matrix with the wrong number of columns.
    #[error("Feature mismatch: model expects {expected} features, got {found}")]
    FeatureMismatch {
        /// Features seen during fitting.
        expected: usize,
        /// Columns of the matrix passed in.
        found: usize,
    },

    /// Labels are not binary `{0, 1}`.
    #[error("Invalid labels: expected binary {{0, 1}} labels, found {found:?}")]
    InvalidLabels {
        /// Distinct offending label values, sorted.
        found: Vec<i64>,
    },

    /// The specified column was not found in the DataFrame.
    ///
    /// Column names are case-sensitive.
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// Training failed inside a learner.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// Polars error while converting a DataFrame.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl TrainingError {
    /// Get a stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::FeatureMismatch { .. } => "FEATURE_MISMATCH",
            Self::InvalidLabels { .. } => "INVALID_LABELS",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }

    /// Check if the error is caused by the values or shape of the input,
    /// as opposed to configuration or a learner failure.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidData(_)
                | Self::EmptyDataset(_)
                | Self::ShapeMismatch { .. }
                | Self::FeatureMismatch { .. }
                | Self::InvalidLabels { .. }
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for TrainingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TrainingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;

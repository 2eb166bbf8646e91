//! Custom error types for the data preparation pipeline.
//!
//! This module provides the error hierarchy using `thiserror` so that every
//! failure of [`DataPreparer`](crate::DataPreparer) carries enough context to
//! tell which column or value caused it.
//!
//! Errors are serializable as `{ code, message }` pairs so callers can forward
//! them to logs or reports without matching on every variant.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the preparation pipeline.
#[derive(Error, Debug)]
pub enum PreparationError {
    /// A required column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A categorical value has no entry in the fixed encoding map.
    #[error("Unknown value {value} in column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// A generated column name is already taken by another column.
    #[error("Column '{0}' already exists in dataset")]
    ColumnCollision(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Type conversion failed.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreparationError>,
    },
}

impl PreparationError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreparationError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build an [`UnknownCategory`](Self::UnknownCategory) error, quoting the
    /// offending value or marking it as missing.
    pub fn unknown_category(column: impl Into<String>, value: Option<&str>) -> Self {
        PreparationError::UnknownCategory {
            column: column.into(),
            value: match value {
                Some(v) => format!("'{}'", v),
                None => "<missing>".to_string(),
            },
        }
    }

    /// Get a stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Self::ColumnCollision(_) => "COLUMN_COLLISION",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by the dataset's shape (a missing or
    /// clashing column).
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) | Self::ColumnCollision(_) => true,
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }

    /// Check if this error was caused by a value outside a fixed encoding map.
    pub fn is_encoding_error(&self) -> bool {
        match self {
            Self::UnknownCategory { .. } => true,
            Self::WithContext { source, .. } => source.is_encoding_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreparationError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreparationError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PreparationError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreparationError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PreparationError::ColumnNotFound("loan_grade".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PreparationError::unknown_category("loan_grade", Some("H")).error_code(),
            "UNKNOWN_CATEGORY"
        );

        let collision = PreparationError::ColumnCollision("loan_intent_VENTURE".to_string());
        assert_eq!(collision.error_code(), "COLUMN_COLLISION");
        assert!(collision.is_schema_error());
        assert!(!collision.is_encoding_error());
    }

    #[test]
    fn test_unknown_category_message() {
        let err = PreparationError::unknown_category("loan_grade", Some("H"));
        assert_eq!(err.to_string(), "Unknown value 'H' in column 'loan_grade'");

        let err = PreparationError::unknown_category("loan_grade", None);
        assert!(err.to_string().contains("<missing>"));
    }

    #[test]
    fn test_error_kinds_survive_context() {
        let err = PreparationError::ColumnNotFound("person_age".to_string())
            .with_context("While validating schema");
        assert!(err.is_schema_error());
        assert!(!err.is_encoding_error());
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(err.to_string().contains("While validating schema"));
    }

    #[test]
    fn test_error_serialization() {
        let error = PreparationError::ColumnNotFound("loan_int_rate".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("loan_int_rate"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PreparationError = io.into();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}

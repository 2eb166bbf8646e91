//! Configuration types for the data preparation pipeline.
//!
//! The cleaning rules themselves (outlier thresholds, encoding maps) are
//! fixed; what a caller may configure is the column schema, for datasets
//! that use different headers for the same fields.

use serde::{Deserialize, Serialize};

/// Rows with an applicant age at or above this value are dropped.
pub const MAX_PERSON_AGE: f64 = 100.0;

/// Rows with an employment length (in years) at or above this value are dropped.
pub const MAX_EMPLOYMENT_YEARS: f64 = 60.0;

/// Names of the columns the preparer reads and rewrites.
///
/// Defaults match the public credit-risk dataset headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Applicant age in years.
    pub age: String,
    /// Employment length in years, possibly missing.
    pub employment_length: String,
    /// Loan grade, `A` (safest) through `G`.
    pub loan_grade: String,
    /// Home ownership status (nominal).
    pub home_ownership: String,
    /// Loan intent (nominal).
    pub loan_intent: String,
    /// Interest rate, possibly missing.
    pub interest_rate: String,
    /// Prior default on file, `Y` or `N`.
    pub prior_default: String,
    /// Binary default outcome.
    pub default_label: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            age: "person_age".to_string(),
            employment_length: "person_emp_length".to_string(),
            loan_grade: "loan_grade".to_string(),
            home_ownership: "person_home_ownership".to_string(),
            loan_intent: "loan_intent".to_string(),
            interest_rate: "loan_int_rate".to_string(),
            prior_default: "cb_person_default_on_file".to_string(),
            default_label: "loan_status".to_string(),
        }
    }
}

impl ColumnSchema {
    /// All required columns, in the order they are checked.
    pub fn required(&self) -> [&str; 8] {
        [
            self.age.as_str(),
            self.employment_length.as_str(),
            self.loan_grade.as_str(),
            self.home_ownership.as_str(),
            self.loan_intent.as_str(),
            self.interest_rate.as_str(),
            self.prior_default.as_str(),
            self.default_label.as_str(),
        ]
    }

    /// Nominal columns expanded into indicator columns.
    pub fn nominal(&self) -> [&str; 2] {
        [self.home_ownership.as_str(), self.loan_intent.as_str()]
    }
}

/// Configuration for [`DataPreparer`](crate::DataPreparer).
///
/// Use [`PreparerConfig::builder()`] to override individual column names.
///
/// # Example
///
/// ```rust,ignore
/// use risk_processing::PreparerConfig;
///
/// let config = PreparerConfig::builder()
///     .interest_rate_column("rate")
///     .default_label_column("defaulted")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparerConfig {
    /// Column names of the raw dataset.
    pub columns: ColumnSchema,
}

impl PreparerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreparerConfigBuilder {
        PreparerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let required = self.columns.required();

        if let Some(empty) = required.iter().position(|name| name.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyColumnName { position: empty });
        }

        for (i, name) in required.iter().enumerate() {
            if required[..i].contains(name) {
                return Err(ConfigValidationError::DuplicateColumn(name.to_string()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Required column at position {position} has an empty name")]
    EmptyColumnName { position: usize },

    #[error("Column '{0}' is mapped to more than one field")]
    DuplicateColumn(String),
}

/// Builder for [`PreparerConfig`].
#[derive(Debug, Clone, Default)]
pub struct PreparerConfigBuilder {
    config: PreparerConfig,
}

impl PreparerConfigBuilder {
    /// Replace the whole column schema.
    pub fn columns(mut self, columns: ColumnSchema) -> Self {
        self.config.columns = columns;
        self
    }

    pub fn age_column(mut self, name: impl Into<String>) -> Self {
        self.config.columns.age = name.into();
        self
    }

    pub fn employment_length_column(mut self, name: impl Into<String>) -> Self {
        self.config.columns.employment_length = name.into();
        self
    }

    pub fn loan_grade_column(mut self, name: impl Into<String>) -> Self {
        self.config.columns.loan_grade = name.into();
        self
    }

    pub fn home_ownership_column(mut self, name: impl Into<String>) -> Self {
        self.config.columns.home_ownership = name.into();
        self
    }

    pub fn loan_intent_column(mut self, name: impl Into<String>) -> Self {
        self.config.columns.loan_intent = name.into();
        self
    }

    pub fn interest_rate_column(mut self, name: impl Into<String>) -> Self {
        self.config.columns.interest_rate = name.into();
        self
    }

    pub fn prior_default_column(mut self, name: impl Into<String>) -> Self {
        self.config.columns.prior_default = name.into();
        self
    }

    pub fn default_label_column(mut self, name: impl Into<String>) -> Self {
        self.config.columns.default_label = name.into();
        self
    }

    /// Build the configuration, validating all values.
    pub fn build(self) -> Result<PreparerConfig, ConfigValidationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//! Credit-Risk Data Preparation Library
//!
//! Turns the raw credit-risk table into a fully numeric frame ready for
//! model fitting, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Outlier Removal**: drops applicants aged 100 or more and employment
//!   lengths of 60 years or more
//! - **Segmented Imputation**: fills missing interest rates with the median of
//!   the loan grade, missing employment lengths with the median of the home
//!   ownership status
//! - **Encoding**: loan grade `A..G` → `0..6`, prior default `Y/N` → `1/0`,
//!   indicator columns for home ownership and loan intent
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use risk_processing::{DataPreparer, PreparerConfig};
//!
//! // Default column names
//! let df = risk_processing::prepare("credit_risk_dataset.csv")?;
//!
//! // Custom column names, with a summary of the run
//! let config = PreparerConfig::builder()
//!     .default_label_column("defaulted")
//!     .build()?;
//! let prepared = DataPreparer::new(config)?.prepare_with_summary("loans.csv")?;
//! println!("Removed {} outlier rows", prepared.summary.outlier_rows_removed);
//! ```
//!
//! # Errors
//!
//! Every step returns [`PreparationError`]. Unknown grade or flag values are
//! rejected with [`PreparationError::UnknownCategory`] instead of being
//! silently turned into nulls.

pub mod config;
pub mod encoders;
pub mod error;
pub mod imputers;
pub mod outliers;
pub mod preparer;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ColumnSchema, ConfigValidationError, MAX_EMPLOYMENT_YEARS, MAX_PERSON_AGE, PreparerConfig,
    PreparerConfigBuilder,
};
pub use encoders::{OneHotEncoder, OrdinalEncoder};
pub use error::{PreparationError, Result as PreparationResult, ResultExt};
pub use imputers::GroupMedians;
pub use outliers::OutlierFilter;
pub use preparer::{DataPreparer, prepare};
pub use types::{PreparationSummary, PreparedData};

//! The credit-risk preparation pipeline.
//!
//! [`DataPreparer`] runs, in order:
//!
//! 1. outlier removal ([`OutlierFilter`])
//! 2. group-median imputation of interest rate (by loan grade) and employment
//!    length (by home ownership) ([`GroupMedians`])
//! 3. ordinal encoding of loan grade and the prior-default flag, one-hot
//!    encoding of home ownership and loan intent
//! 4. boolean → integer normalization

use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{debug, info};

use crate::config::PreparerConfig;
use crate::encoders::{OneHotEncoder, OrdinalEncoder};
use crate::error::{PreparationError, Result, ResultExt};
use crate::imputers::GroupMedians;
use crate::outliers::OutlierFilter;
use crate::types::{PreparationSummary, PreparedData};
use crate::utils::{normalize_boolean_columns, require_columns};

/// Loads, cleans and encodes a credit-risk dataset.
///
/// # Example
///
/// ```rust,ignore
/// use risk_processing::DataPreparer;
///
/// let preparer = DataPreparer::default();
/// let prepared = preparer.prepare_with_summary("data/credit_risk_dataset.csv")?;
///
/// println!("{} rows kept", prepared.summary.rows_after);
/// for step in &prepared.summary.processing_steps {
///     println!("  - {}", step);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataPreparer {
    config: PreparerConfig,
}

impl DataPreparer {
    /// Create a preparer with a validated configuration.
    pub fn new(config: PreparerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PreparerConfig {
        &self.config
    }

    /// Read a CSV file with a header row. Empty fields are loaded as nulls.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        // Bad paths surface as IO errors rather than Polars errors
        std::fs::File::open(path)?;
        if !path.is_file() {
            return Err(PreparationError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("'{}' is not a file", path.display()),
            )));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))
            .context(format!("Failed to open '{}'", path.display()))?
            .finish()
            .context(format!("Failed to parse '{}'", path.display()))?;

        debug!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(df)
    }

    /// Load and prepare a dataset, returning the fully numeric frame.
    pub fn prepare(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        self.prepare_with_summary(path).map(|prepared| prepared.frame)
    }

    /// Load and prepare a dataset, returning the frame and a summary of
    /// what was changed.
    pub fn prepare_with_summary(&self, path: impl AsRef<Path>) -> Result<PreparedData> {
        let df = self.load(path)?;
        self.prepare_frame(df)
    }

    /// Prepare an already loaded frame.
    pub fn prepare_frame(&self, mut df: DataFrame) -> Result<PreparedData> {
        let start = Instant::now();
        let columns = &self.config.columns;
        require_columns(&df, columns.required())?;

        let mut summary = PreparationSummary {
            rows_before: df.height(),
            ..Default::default()
        };
        let steps = &mut summary.processing_steps;

        summary.outlier_rows_removed =
            OutlierFilter::remove_invalid_rows(&mut df, columns, steps)?;

        // Both medians are computed on the filtered frame before either fill
        let rate_medians =
            GroupMedians::compute(&df, &columns.interest_rate, &columns.loan_grade)?;
        let employment_medians =
            GroupMedians::compute(&df, &columns.employment_length, &columns.home_ownership)?;

        let filled = rate_medians.apply(&mut df, steps)?;
        summary
            .imputed_values
            .insert(columns.interest_rate.clone(), filled);
        let filled = employment_medians.apply(&mut df, steps)?;
        summary
            .imputed_values
            .insert(columns.employment_length.clone(), filled);

        OrdinalEncoder::loan_grade().encode(&mut df, &columns.loan_grade, steps)?;
        OrdinalEncoder::yes_no().encode(&mut df, &columns.prior_default, steps)?;

        for nominal in columns.nominal() {
            let created = OneHotEncoder::expand(&mut df, nominal, steps)?;
            summary.indicator_columns.extend(created);
        }

        summary.boolean_columns_cast = normalize_boolean_columns(&mut df)?;
        if !summary.boolean_columns_cast.is_empty() {
            steps.push(format!(
                "Cast boolean columns to integers: {}",
                summary.boolean_columns_cast.join(", ")
            ));
        }

        summary.rows_after = df.height();
        info!(
            "Prepared {} of {} rows into {} columns in {:?}",
            summary.rows_after,
            summary.rows_before,
            df.width(),
            start.elapsed()
        );

        Ok(PreparedData { frame: df, summary })
    }
}

/// Load and prepare a credit-risk CSV with the default column schema.
pub fn prepare(path: impl AsRef<Path>) -> Result<DataFrame> {
    DataPreparer::default().prepare(path)
}

//! Configuration for the model trainers.
//!
//! [`TrainingConfig`] holds every knob of the three trainers. The defaults
//! are the fixed settings of the credit-risk models; the random seed is an
//! explicit field so that every fit can be reproduced in isolation.
//!
//! # Example
//!
//! ```
//! use risk_learning::TrainingConfig;
//!
//! let config = TrainingConfig::builder()
//!     .random_seed(7)
//!     .n_estimators(200)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.contamination, 0.05);
//! ```

use crate::error::TrainingError;

/// Default random seed shared by all trainers.
pub const DEFAULT_RANDOM_SEED: u64 = 7;

/// Configuration shared by the three trainers.
///
/// Use [`TrainingConfig::builder()`] to construct a validated configuration.
///
/// # Validation
///
/// The builder validates the following constraints on [`build()`](TrainingConfigBuilder::build):
/// - `max_iter` must be at least 1
/// - `tol` and `c` must be finite and positive
/// - `n_estimators` must be at least 1
/// - `contamination` must be in range `(0.0, 0.5]`
/// - `max_samples` must be at least 2
/// - `n_jobs`, when set, must be at least 1
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Seed for every random draw (default: 7).
    pub random_seed: u64,

    /// Iteration budget of the logistic regression solver (default: 1000).
    pub max_iter: usize,

    /// Relative gradient-norm tolerance of the logistic regression (default: 1e-4).
    pub tol: f64,

    /// Inverse regularization strength of the logistic regression (default: 1.0).
    pub c: f64,

    /// Number of trees in the random forest and the isolation forest (default: 100).
    pub n_estimators: usize,

    /// Expected fraction of anomalous rows (default: 0.05).
    pub contamination: f64,

    /// Rows drawn for each isolation tree, capped at the dataset size (default: 256).
    pub max_samples: usize,

    /// Threads used to build tree ensembles.
    ///
    /// `None` uses the global rayon pool. Results do not depend on this value.
    pub n_jobs: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            random_seed: DEFAULT_RANDOM_SEED,
            max_iter: 1000,
            tol: 1e-4,
            c: 1.0,
            n_estimators: 100,
            contamination: 0.05,
            max_samples: 256,
            n_jobs: None,
        }
    }
}

impl TrainingConfig {
    /// Create a new builder for `TrainingConfig`.
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.max_iter == 0 {
            return Err(TrainingError::InvalidConfig(
                "max_iter must be at least 1".to_string(),
            ));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "tol must be positive, got {}",
                self.tol
            )));
        }
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "c must be positive, got {}",
                self.c
            )));
        }
        if self.n_estimators == 0 {
            return Err(TrainingError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(TrainingError::InvalidConfig(format!(
                "contamination must be in (0.0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.max_samples < 2 {
            return Err(TrainingError::InvalidConfig(format!(
                "max_samples must be at least 2, got {}",
                self.max_samples
            )));
        }
        if self.n_jobs == Some(0) {
            return Err(TrainingError::InvalidConfig(
                "n_jobs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
///
/// Created via [`TrainingConfig::builder()`]. All setters return `self` to allow
/// method chaining.
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the logistic regression iteration budget.
    #[must_use]
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter;
        self
    }

    /// Set the logistic regression convergence tolerance.
    #[must_use]
    pub fn tol(mut self, tol: f64) -> Self {
        self.config.tol = tol;
        self
    }

    /// Set the inverse regularization strength.
    #[must_use]
    pub fn c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set the number of trees per ensemble.
    #[must_use]
    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.config.n_estimators = n_estimators;
        self
    }

    /// Set the expected anomaly fraction.
    #[must_use]
    pub fn contamination(mut self, contamination: f64) -> Self {
        self.config.contamination = contamination;
        self
    }

    /// Set the subsample size of each isolation tree.
    #[must_use]
    pub fn max_samples(mut self, max_samples: usize) -> Self {
        self.config.max_samples = max_samples;
        self
    }

    /// Set the number of threads for ensemble building.
    #[must_use]
    pub fn n_jobs(mut self, n_jobs: usize) -> Self {
        self.config.n_jobs = Some(n_jobs);
        self
    }

    /// Build the configuration, validating all values.
    pub fn build(self) -> Result<TrainingConfig, TrainingError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

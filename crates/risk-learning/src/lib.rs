//! risk-learning: credit-risk models on prepared data.
//!
//! Three independent trainers fit models on the numeric frame produced by
//! `risk-processing`:
//!
//! - **Linear baseline**: L2-regularized logistic regression
//! - **Ensemble classifier**: random forest with balanced class weights
//! - **Anomaly detector**: isolation forest flagging the most isolated rows
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use risk_learning::{Dataset, TrainingConfig, train_ensemble_classifier};
//!
//! let frame = risk_processing::prepare("credit_risk_dataset.csv")?;
//! let dataset = Dataset::from_frame(&frame, "loan_status")?;
//! let (train, test) = dataset.train_test_split(0.2, 7)?;
//!
//! let config = TrainingConfig::default();
//! let labels = train.labels().expect("labeled");
//! let forest = train_ensemble_classifier(train.features().view(), labels.view(), &config)?;
//! let predicted = forest.predict(test.features().view())?;
//! ```
//!
//! # Determinism
//!
//! Every random draw derives from [`TrainingConfig::random_seed`]. Tree
//! ensembles draw one seed per tree up front, so the fitted model does not
//! depend on [`TrainingConfig::n_jobs`].
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, TrainingError>`]:
//!
//! - [`TrainingError::EmptyDataset`] - no rows or no columns
//! - [`TrainingError::InvalidData`] - NaN or infinite features
//! - [`TrainingError::ShapeMismatch`] - feature rows and labels disagree
//! - [`TrainingError::InvalidLabels`] - labels outside `{0, 1}`
//!
//! A logistic regression that runs out of iterations is not an error; see
//! [`TrainingWarning`].

pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod trainers;
pub mod types;

// Configuration types
pub use config::{DEFAULT_RANDOM_SEED, TrainingConfig, TrainingConfigBuilder};
// Feature matrices
pub use data::Dataset;
// Error types
pub use error::{Result, TrainingError};
// Model types
pub use models::{DecisionTree, IsolationForest, LogisticRegression, RandomForest};
// Trainers
pub use trainers::{train_anomaly_detector, train_ensemble_classifier, train_linear_baseline};
// Shared types
pub use types::{FittedModel, ModelKind, TrainingWarning};

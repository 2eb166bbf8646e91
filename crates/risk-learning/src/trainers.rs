//! Entry points that validate inputs and fit each model.
//!
//! All three trainers reject empty or non-finite feature matrices. The two
//! supervised trainers also require one `{0, 1}` label per row. Each call is
//! independent: the seed comes from the [`TrainingConfig`], so repeating a
//! call with the same inputs yields an identical model.

use ndarray::{ArrayView1, ArrayView2};
use tracing::{info, warn};

use crate::config::TrainingConfig;
use crate::error::{Result, TrainingError};
use crate::models::{
    ForestParams, IsolationForest, IsolationParams, LogisticRegression, NewtonParams, RandomForest,
};

/// Fit the L2-regularized logistic regression baseline.
///
/// A solver that exhausts `max_iter` still returns its model; the condition
/// is logged and recorded in [`LogisticRegression::warnings`].
///
/// # Errors
///
/// - [`TrainingError::EmptyDataset`] if `features` has no rows or columns
/// - [`TrainingError::InvalidData`] if `features` holds NaN or infinity
/// - [`TrainingError::ShapeMismatch`] if row and label counts differ
/// - [`TrainingError::InvalidLabels`] if a label is not 0 or 1
pub fn train_linear_baseline(
    features: ArrayView2<'_, f64>,
    labels: ArrayView1<'_, i64>,
    config: &TrainingConfig,
) -> Result<LogisticRegression> {
    config.validate()?;
    validate_features(features)?;
    validate_labels(features, labels)?;

    let model = LogisticRegression::fit(
        features,
        labels,
        NewtonParams {
            c: config.c,
            tol: config.tol,
            max_iter: config.max_iter,
        },
    )?;

    for warning in model.warnings() {
        warn!("Logistic regression: {}", warning);
    }
    info!(
        "Fitted logistic regression on {} rows x {} features in {} iterations",
        features.nrows(),
        features.ncols(),
        model.n_iter()
    );

    Ok(model)
}

/// Fit the class-weighted random forest.
///
/// # Errors
///
/// Same conditions as [`train_linear_baseline`].
pub fn train_ensemble_classifier(
    features: ArrayView2<'_, f64>,
    labels: ArrayView1<'_, i64>,
    config: &TrainingConfig,
) -> Result<RandomForest> {
    config.validate()?;
    validate_features(features)?;
    validate_labels(features, labels)?;

    let model = RandomForest::fit(
        features,
        labels,
        ForestParams {
            n_estimators: config.n_estimators,
            random_seed: config.random_seed,
            n_jobs: config.n_jobs,
        },
    )?;

    info!(
        "Fitted random forest of {} trees on {} rows (class weights {:.3} / {:.3})",
        model.n_trees(),
        features.nrows(),
        model.class_weight(0).unwrap_or_default(),
        model.class_weight(1).unwrap_or_default()
    );

    Ok(model)
}

/// Fit the isolation forest on unlabeled features.
///
/// # Errors
///
/// - [`TrainingError::EmptyDataset`] if `features` has fewer than two rows
///   or no columns
/// - [`TrainingError::InvalidData`] if `features` holds NaN or infinity
pub fn train_anomaly_detector(
    features: ArrayView2<'_, f64>,
    config: &TrainingConfig,
) -> Result<IsolationForest> {
    config.validate()?;
    validate_features(features)?;

    let model = IsolationForest::fit(
        features,
        IsolationParams {
            n_estimators: config.n_estimators,
            max_samples: config.max_samples,
            contamination: config.contamination,
            random_seed: config.random_seed,
            n_jobs: config.n_jobs,
        },
    )?;

    info!(
        "Fitted isolation forest of {} trees on {} rows (sample size {}, threshold {:.4})",
        model.n_trees(),
        features.nrows(),
        model.sample_size(),
        model.threshold()
    );

    Ok(model)
}

fn validate_features(features: ArrayView2<'_, f64>) -> Result<()> {
    if features.nrows() == 0 || features.ncols() == 0 {
        return Err(TrainingError::EmptyDataset(format!(
            "feature matrix has shape ({}, {})",
            features.nrows(),
            features.ncols()
        )));
    }

    if let Some(((row, column), value)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(TrainingError::InvalidData(format!(
            "non-finite value {} at row {}, column {}",
            value, row, column
        )));
    }

    Ok(())
}

fn validate_labels(features: ArrayView2<'_, f64>, labels: ArrayView1<'_, i64>) -> Result<()> {
    if features.nrows() != labels.len() {
        return Err(TrainingError::ShapeMismatch {
            features: features.nrows(),
            labels: labels.len(),
        });
    }

    let mut found: Vec<i64> = labels
        .iter()
        .copied()
        .filter(|l| *l != 0 && *l != 1)
        .collect();
    if !found.is_empty() {
        found.sort_unstable();
        found.dedup();
        return Err(TrainingError::InvalidLabels { found });
    }

    Ok(())
}

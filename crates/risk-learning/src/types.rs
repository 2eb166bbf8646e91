//! Common types used throughout the risk-learning crate.
//!
//! - [`TrainingWarning`]: non-fatal conditions recorded on a fitted model
//! - [`ModelKind`]: which of the three learners produced a model
//! - [`FittedModel`]: owned handle to exactly one fitted model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{IsolationForest, LogisticRegression, RandomForest};

/// A non-fatal condition raised while fitting.
///
/// The model is still usable; callers decide whether to accept it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TrainingWarning {
    /// The solver used its whole iteration budget without meeting the
    /// tolerance.
    Convergence {
        /// Iterations performed.
        iterations: usize,
        /// Gradient norm when the solver stopped.
        gradient_norm: f64,
        /// Gradient norm the solver had to reach.
        target_norm: f64,
    },
}

impl fmt::Display for TrainingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingWarning::Convergence {
                iterations,
                gradient_norm,
                target_norm,
            } => write!(
                f,
                "solver did not converge after {} iterations (gradient norm {:.3e} > {:.3e}); \
                 increase max_iter or scale the features",
                iterations, gradient_norm, target_norm
            ),
        }
    }
}

/// The learner behind a [`FittedModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Regularized logistic regression.
    LinearBaseline,
    /// Class-weighted random forest.
    EnsembleClassifier,
    /// Isolation forest.
    AnomalyDetector,
}

impl ModelKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LinearBaseline => "linear_baseline",
            ModelKind::EnsembleClassifier => "ensemble_classifier",
            ModelKind::AnomalyDetector => "anomaly_detector",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fitted model of one of the three kinds.
///
/// Models are immutable once fitted: there is no method that refits or
/// updates one in place.
#[derive(Debug, Clone)]
pub enum FittedModel {
    LinearBaseline(LogisticRegression),
    EnsembleClassifier(RandomForest),
    AnomalyDetector(IsolationForest),
}

impl FittedModel {
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::LinearBaseline(_) => ModelKind::LinearBaseline,
            FittedModel::EnsembleClassifier(_) => ModelKind::EnsembleClassifier,
            FittedModel::AnomalyDetector(_) => ModelKind::AnomalyDetector,
        }
    }

    /// Number of features the model was fitted on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        match self {
            FittedModel::LinearBaseline(m) => m.n_features(),
            FittedModel::EnsembleClassifier(m) => m.n_features(),
            FittedModel::AnomalyDetector(m) => m.n_features(),
        }
    }

    /// Warnings raised while fitting.
    #[must_use]
    pub fn warnings(&self) -> &[TrainingWarning] {
        match self {
            FittedModel::LinearBaseline(m) => m.warnings(),
            FittedModel::EnsembleClassifier(_) | FittedModel::AnomalyDetector(_) => &[],
        }
    }

    pub fn as_linear_baseline(&self) -> Option<&LogisticRegression> {
        match self {
            FittedModel::LinearBaseline(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_ensemble_classifier(&self) -> Option<&RandomForest> {
        match self {
            FittedModel::EnsembleClassifier(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_anomaly_detector(&self) -> Option<&IsolationForest> {
        match self {
            FittedModel::AnomalyDetector(m) => Some(m),
            _ => None,
        }
    }
}

impl From<LogisticRegression> for FittedModel {
    fn from(model: LogisticRegression) -> Self {
        FittedModel::LinearBaseline(model)
    }
}

impl From<RandomForest> for FittedModel {
    fn from(model: RandomForest) -> Self {
        FittedModel::EnsembleClassifier(model)
    }
}

impl From<IsolationForest> for FittedModel {
    fn from(model: IsolationForest) -> Self {
        FittedModel::AnomalyDetector(model)
    }
}

static_assertions::assert_impl_all!(FittedModel: Send, Sync);

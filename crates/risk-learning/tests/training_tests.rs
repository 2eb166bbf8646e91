//! Integration tests for the three trainers.
//!
//! Synthetic matrices exercise the documented guarantees of each trainer;
//! the last section runs the preparation pipeline on the shared CSV fixture
//! and fits every model on its output.

use std::path::PathBuf;

use ndarray::{Array1, Array2, array};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use risk_learning::{
    Dataset, FittedModel, ModelKind, TrainingConfig, TrainingError, TrainingWarning,
    train_anomaly_detector, train_ensemble_classifier, train_linear_baseline,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn config() -> TrainingConfig {
    TrainingConfig::builder()
        .n_estimators(25)
        .build()
        .expect("valid config")
}

/// Two overlapping clusters: label 1 rows sit around (2, 2), label 0 around (0, 0).
fn two_clusters(n: usize, seed: u64) -> (Array2<f64>, Array1<i64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let labels = Array1::from_iter((0..n).map(|i| i64::from(i % 4 == 0)));
    let features = Array2::from_shape_fn((n, 2), |(i, _)| {
        let center = if labels[i] == 1 { 2.0 } else { 0.0 };
        center + rng.gen_range(-1.5..1.5)
    });
    (features, labels)
}

fn uniform_cloud(n: usize, p: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n, p), |_| rng.gen_range(0.0..1.0))
}

fn credit_risk_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../risk-processing/tests/fixtures/credit_risk_sample.csv")
}

// ============================================================================
// Input Validation
// ============================================================================

#[test]
fn test_linear_baseline_shape_mismatch() {
    let x = Array2::<f64>::zeros((4, 2));
    let y = array![0i64, 1, 0];

    let err = train_linear_baseline(x.view(), y.view(), &config()).unwrap_err();

    assert!(matches!(
        err,
        TrainingError::ShapeMismatch {
            features: 4,
            labels: 3
        }
    ));
}

#[test]
fn test_ensemble_classifier_shape_mismatch() {
    let x = Array2::<f64>::zeros((4, 2));
    let y = array![0i64, 1, 0, 1, 1];

    let err = train_ensemble_classifier(x.view(), y.view(), &config()).unwrap_err();

    assert_eq!(err.error_code(), "SHAPE_MISMATCH");
    assert!(err.is_value_error());
}

#[test]
fn test_non_binary_labels_rejected() {
    let (x, _) = two_clusters(6, 1);
    let y = array![0i64, 1, 2, 1, -1, 2];

    for err in [
        train_linear_baseline(x.view(), y.view(), &config()).unwrap_err(),
        train_ensemble_classifier(x.view(), y.view(), &config()).unwrap_err(),
    ] {
        assert!(matches!(err, TrainingError::InvalidLabels { ref found } if *found == vec![-1i64, 2]));
    }
}

#[test]
fn test_non_finite_features_rejected() {
    let x = array![[1.0, 2.0], [f64::INFINITY, 0.0], [0.5, 0.5]];
    let y = array![0i64, 1, 0];

    assert!(matches!(
        train_linear_baseline(x.view(), y.view(), &config()),
        Err(TrainingError::InvalidData(_))
    ));
    assert!(matches!(
        train_anomaly_detector(x.view(), &config()),
        Err(TrainingError::InvalidData(_))
    ));
}

#[test]
fn test_empty_features_rejected() {
    let x = Array2::<f64>::zeros((0, 3));
    let y = Array1::<i64>::zeros(0);

    assert!(matches!(
        train_ensemble_classifier(x.view(), y.view(), &config()),
        Err(TrainingError::EmptyDataset(_))
    ));
    assert!(matches!(
        train_anomaly_detector(x.view(), &config()),
        Err(TrainingError::EmptyDataset(_))
    ));
}

// ============================================================================
// Linear Baseline
// ============================================================================

#[test]
fn test_linear_baseline_learns_cluster_direction() {
    let (x, y) = two_clusters(200, 3);

    let model = train_linear_baseline(x.view(), y.view(), &config()).unwrap();

    assert!(model.converged());
    assert!(model.warnings().is_empty());
    assert!(model.coefficients().iter().all(|&w| w > 0.0));

    let proba = model.predict_proba(array![[-1.0, -1.0], [3.0, 3.0]].view()).unwrap();
    assert!(proba[0] < 0.5);
    assert!(proba[1] > 0.5);
}

#[test]
fn test_exhausted_iterations_warn_but_return_model() {
    let (x, y) = two_clusters(200, 3);
    let scaled = &x * 1000.0;
    let config = TrainingConfig::builder().max_iter(1).build().unwrap();

    let model = train_linear_baseline(scaled.view(), y.view(), &config).unwrap();

    assert!(!model.converged());
    assert_eq!(model.n_iter(), 1);
    assert!(matches!(
        model.warnings(),
        [TrainingWarning::Convergence { iterations: 1, .. }]
    ));
    assert_eq!(model.predict(scaled.view()).unwrap().len(), 200);

    let fitted = FittedModel::from(model);
    assert_eq!(fitted.kind(), ModelKind::LinearBaseline);
    assert_eq!(fitted.warnings().len(), 1);
}

// ============================================================================
// Ensemble Classifier
// ============================================================================

#[test]
fn test_minority_class_weighs_more() {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let y = array![0i64, 0, 0, 1];

    let forest = train_ensemble_classifier(x.view(), y.view(), &config()).unwrap();

    let minority = forest.class_weight(1).unwrap();
    let majority = forest.class_weight(0).unwrap();
    assert!(minority > majority);
    assert!((minority - 2.0).abs() < 1e-12);
    assert!((majority - 4.0 / 6.0).abs() < 1e-12);
}

#[test]
fn test_ensemble_classifier_probabilities() {
    let (x, y) = two_clusters(200, 5);

    let forest = train_ensemble_classifier(x.view(), y.view(), &config()).unwrap();
    let proba = forest.predict_proba(x.view()).unwrap();

    assert_eq!(forest.n_trees(), 25);
    assert_eq!(forest.n_features(), 2);
    assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));

    let accuracy = forest
        .predict(x.view())
        .unwrap()
        .iter()
        .zip(y.iter())
        .filter(|(p, t)| p == t)
        .count() as f64
        / 200.0;
    assert!(accuracy > 0.9, "training accuracy {}", accuracy);
}

#[test]
fn test_ensemble_classifier_rejects_wrong_width() {
    let (x, y) = two_clusters(40, 5);
    let forest = train_ensemble_classifier(x.view(), y.view(), &config()).unwrap();

    let err = forest.predict(Array2::<f64>::zeros((2, 3)).view()).unwrap_err();
    assert!(matches!(
        err,
        TrainingError::FeatureMismatch {
            expected: 2,
            found: 3
        }
    ));
}

// ============================================================================
// Anomaly Detector
// ============================================================================

#[test]
fn test_anomaly_detector_flags_contamination_share() {
    let x = uniform_cloud(1000, 4, 11);
    let config = TrainingConfig::default();

    let detector = train_anomaly_detector(x.view(), &config).unwrap();
    let flagged = detector.predict(x.view()).unwrap().iter().filter(|&&f| f).count();

    assert_eq!(detector.n_trees(), 100);
    assert_eq!(detector.sample_size(), 256);
    assert!((45..=55).contains(&flagged), "flagged {} rows", flagged);
}

#[test]
fn test_anomaly_detector_ranks_injected_outliers() {
    let mut x = uniform_cloud(300, 3, 13);
    for i in 0..5 {
        x.row_mut(i).fill(10.0 + i as f64);
    }

    let detector = train_anomaly_detector(x.view(), &config()).unwrap();
    let flags = detector.predict(x.view()).unwrap();

    assert!(flags.iter().take(5).all(|&f| f));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_same_seed_same_models() {
    let (x, y) = two_clusters(120, 17);
    let config = config();

    assert_eq!(
        train_linear_baseline(x.view(), y.view(), &config).unwrap(),
        train_linear_baseline(x.view(), y.view(), &config).unwrap()
    );
    assert_eq!(
        train_ensemble_classifier(x.view(), y.view(), &config).unwrap(),
        train_ensemble_classifier(x.view(), y.view(), &config).unwrap()
    );
    assert_eq!(
        train_anomaly_detector(x.view(), &config).unwrap(),
        train_anomaly_detector(x.view(), &config).unwrap()
    );
}

#[test]
fn test_thread_count_does_not_change_ensembles() {
    let (x, y) = two_clusters(120, 19);
    let single = TrainingConfig::builder()
        .n_estimators(25)
        .n_jobs(1)
        .build()
        .unwrap();
    let several = TrainingConfig::builder()
        .n_estimators(25)
        .n_jobs(3)
        .build()
        .unwrap();

    assert_eq!(
        train_ensemble_classifier(x.view(), y.view(), &single).unwrap(),
        train_ensemble_classifier(x.view(), y.view(), &several).unwrap()
    );
    assert_eq!(
        train_anomaly_detector(x.view(), &single).unwrap(),
        train_anomaly_detector(x.view(), &several).unwrap()
    );
}

#[test]
fn test_different_seed_different_forest() {
    let (x, y) = two_clusters(120, 23);
    let other = TrainingConfig {
        random_seed: 8,
        ..config()
    };

    assert_ne!(
        train_ensemble_classifier(x.view(), y.view(), &config()).unwrap(),
        train_ensemble_classifier(x.view(), y.view(), &other).unwrap()
    );
}

// ============================================================================
// Prepared Data
// ============================================================================

#[test]
fn test_models_fit_on_prepared_fixture() -> anyhow::Result<()> {
    let frame = risk_processing::prepare(credit_risk_fixture())?;
    let dataset = Dataset::from_frame(&frame, "loan_status")?;
    let labels = dataset.labels().expect("labeled dataset");

    assert_eq!(dataset.n_samples(), 24);
    assert!(!dataset.feature_names().iter().any(|c| c == "loan_status"));

    let config = config();
    let baseline = train_linear_baseline(dataset.features().view(), labels.view(), &config)?;
    let forest = train_ensemble_classifier(dataset.features().view(), labels.view(), &config)?;
    let detector = train_anomaly_detector(dataset.features().view(), &config)?;

    let baseline_proba = baseline.predict_proba(dataset.features().view())?;
    assert!(baseline_proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    assert_eq!(forest.predict(dataset.features().view())?.len(), 24);

    let flagged = detector
        .predict(dataset.features().view())?
        .iter()
        .filter(|&&f| f)
        .count();
    assert!((1..=3).contains(&flagged), "flagged {} rows", flagged);

    let models: Vec<FittedModel> = vec![baseline.into(), forest.into(), detector.into()];
    for model in &models {
        assert_eq!(model.n_features(), dataset.n_features());
    }

    Ok(())
}

#[test]
fn test_split_then_predict_on_held_out_rows() -> anyhow::Result<()> {
    let frame = risk_processing::prepare(credit_risk_fixture())?;
    let dataset = Dataset::from_frame(&frame, "loan_status")?;
    let (train, test) = dataset.train_test_split(0.25, 7)?;

    let forest = train_ensemble_classifier(
        train.features().view(),
        train.labels().expect("labeled").view(),
        &config(),
    )?;

    assert_eq!(test.n_samples(), 6);
    assert_eq!(forest.predict(test.features().view())?.len(), 6);
    Ok(())
}

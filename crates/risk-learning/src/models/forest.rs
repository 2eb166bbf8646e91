//! Random forest classifier with balanced class weights.
//!
//! Each tree is grown on a bootstrap sample of the rows and considers
//! `floor(sqrt(n_features))` candidate features per split. Row weights are
//! the bootstrap count times the weight of the row's class, where class `c`
//! weighs `n_samples / (2 * n_c)`.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::tree::DecisionTree;
use super::{in_pool, tree_seeds};
use crate::error::{Result, TrainingError};

/// Settings for [`RandomForest::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub random_seed: u64,
    pub n_jobs: Option<usize>,
}

/// A fitted class-weighted random forest.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    class_weights: [f64; 2],
    n_features: usize,
}

impl RandomForest {
    /// Fit on `features` and `{0, 1}` labels.
    ///
    /// Inputs are assumed validated. A class absent from `labels` gets
    /// weight `0.0`.
    pub fn fit(
        features: ArrayView2<'_, f64>,
        labels: ArrayView1<'_, i64>,
        params: ForestParams,
    ) -> Result<Self> {
        let class_weights = balanced_class_weights(labels);
        let max_features = ((features.ncols() as f64).sqrt().floor() as usize).max(1);
        let seeds = tree_seeds(params.random_seed, params.n_estimators);

        let trees = in_pool(params.n_jobs, || {
            seeds
                .par_iter()
                .map(|&seed| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let weights = bootstrap_weights(labels, &class_weights, &mut rng);
                    DecisionTree::grow(features, labels, &weights, max_features, &mut rng)
                })
                .collect::<Vec<_>>()
        })?;

        Ok(Self {
            trees,
            class_weights,
            n_features: features.ncols(),
        })
    }

    /// Mean class-1 probability over all trees.
    pub fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if features.ncols() != self.n_features {
            return Err(TrainingError::FeatureMismatch {
                expected: self.n_features,
                found: features.ncols(),
            });
        }

        let n_trees = self.trees.len() as f64;
        Ok(features
            .rows()
            .into_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }

    /// Majority vote, with ties going to class 0.
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        Ok(self
            .predict_proba(features)?
            .mapv(|p| if p > 0.5 { 1 } else { 0 }))
    }

    /// Weights of class 0 and class 1.
    pub fn class_weights(&self) -> [f64; 2] {
        self.class_weights
    }

    /// Weight applied to rows of `class` (0 or 1).
    pub fn class_weight(&self, class: i64) -> Option<f64> {
        match class {
            0 => Some(self.class_weights[0]),
            1 => Some(self.class_weights[1]),
            _ => None,
        }
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

/// `n / (2 * n_c)` for each class present, `0.0` for an absent class.
fn balanced_class_weights(labels: ArrayView1<'_, i64>) -> [f64; 2] {
    let n = labels.len() as f64;
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    let present = [negatives, positives].iter().filter(|&&c| c > 0).count() as f64;

    [negatives, positives].map(|count| {
        if count == 0 {
            0.0
        } else {
            n / (present * count as f64)
        }
    })
}

fn bootstrap_weights(
    labels: ArrayView1<'_, i64>,
    class_weights: &[f64; 2],
    rng: &mut StdRng,
) -> Vec<f64> {
    let n = labels.len();
    let mut counts = vec![0usize; n];
    for _ in 0..n {
        counts[rng.gen_range(0..n)] += 1;
    }

    counts
        .iter()
        .zip(labels.iter())
        .map(|(&count, &label)| count as f64 * class_weights[usize::from(label == 1)])
        .collect()
}

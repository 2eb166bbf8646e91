//! Isolation forest anomaly detector.
//!
//! Each tree isolates a random subsample by splitting on a random feature at
//! a uniform threshold between the feature's bounds, down to a depth of
//! `ceil(log2(sample_size))`. Rows that are isolated in few splits are
//! anomalous:
//!
//! ```text
//! score(x) = 2 ^ (-E[h(x)] / c(sample_size))
//! ```
//!
//! where `h(x)` is the path length in one tree and `c(n)` the average path
//! length of an unsuccessful binary-search-tree lookup among `n` keys.
//! Scores lie in `(0, 1]` and higher means more anomalous. The fitted
//! threshold is the `1 - contamination` quantile of the training scores.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::{in_pool, tree_seeds};
use crate::error::{Result, TrainingError};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Settings for [`IsolationForest::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsolationParams {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub random_seed: u64,
    pub n_jobs: Option<usize>,
}

/// Average path length `c(n)` of an unsuccessful search among `n` rows.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum IsolationNode {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct IsolationTree {
    nodes: Vec<IsolationNode>,
}

impl IsolationTree {
    fn grow(
        features: ArrayView2<'_, f64>,
        rows: Vec<usize>,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Self {
        let mut candidates: Vec<usize> = (0..features.ncols()).collect();
        let mut nodes = vec![IsolationNode::Leaf { size: 0 }];
        let mut pending = vec![(0usize, rows, 0usize)];

        while let Some((id, rows, depth)) = pending.pop() {
            if depth >= height_limit || rows.len() <= 1 {
                nodes[id] = IsolationNode::Leaf { size: rows.len() };
                continue;
            }

            candidates.shuffle(rng);
            let bounds = candidates.iter().find_map(|&feature| {
                let (low, high) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, &i| {
                    let v = features[[i, feature]];
                    (acc.0.min(v), acc.1.max(v))
                });
                (low < high).then_some((feature, low, high))
            });

            let Some((feature, low, high)) = bounds else {
                nodes[id] = IsolationNode::Leaf { size: rows.len() };
                continue;
            };

            let threshold = rng.gen_range(low..high);
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&i| features[[i, feature]] <= threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(IsolationNode::Leaf { size: 0 });
            nodes.push(IsolationNode::Leaf { size: 0 });
            nodes[id] = IsolationNode::Split {
                feature,
                threshold,
                left,
                right,
            };
            pending.push((left, left_rows, depth + 1));
            pending.push((right, right_rows, depth + 1));
        }

        Self { nodes }
    }

    /// Splits to reach a leaf plus `c(leaf size)` for the unbuilt subtree.
    fn path_length(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[id] {
                IsolationNode::Leaf { size } => return depth + average_path_length(*size),
                IsolationNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                    depth += 1.0;
                }
            }
        }
    }
}

/// A fitted isolation forest.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    threshold: f64,
    n_features: usize,
}

impl IsolationForest {
    /// Fit on `features` and set the threshold from the training scores.
    ///
    /// Needs at least two rows.
    pub fn fit(features: ArrayView2<'_, f64>, params: IsolationParams) -> Result<Self> {
        let n = features.nrows();
        let sample_size = params.max_samples.min(n);
        if sample_size < 2 {
            return Err(TrainingError::EmptyDataset(format!(
                "isolation forest needs at least 2 rows, got {}",
                n
            )));
        }
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let seeds = tree_seeds(params.random_seed, params.n_estimators);

        let trees = in_pool(params.n_jobs, || {
            seeds
                .par_iter()
                .map(|&seed| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let rows = sample(&mut rng, n, sample_size).into_vec();
                    IsolationTree::grow(features, rows, height_limit, &mut rng)
                })
                .collect::<Vec<_>>()
        })?;

        let mut forest = Self {
            trees,
            sample_size,
            threshold: f64::INFINITY,
            n_features: features.ncols(),
        };
        let scores = forest.score_samples(features)?;
        forest.threshold = quantile(scores.to_vec(), 1.0 - params.contamination);

        Ok(forest)
    }

    /// Anomaly score in `(0, 1]` for each row; higher is more anomalous.
    pub fn score_samples(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if features.ncols() != self.n_features {
            return Err(TrainingError::FeatureMismatch {
                expected: self.n_features,
                found: features.ncols(),
            });
        }

        let normalizer = average_path_length(self.sample_size);
        let n_trees = self.trees.len() as f64;
        Ok(features
            .rows()
            .into_iter()
            .map(|row| {
                let mean_path = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>() / n_trees;
                2f64.powf(-mean_path / normalizer)
            })
            .collect())
    }

    /// `threshold - score`: negative for anomalies.
    pub fn decision_function(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        Ok(self.score_samples(features)?.mapv(|s| self.threshold - s))
    }

    /// `true` for rows scoring above the fitted threshold.
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<bool>> {
        Ok(self.score_samples(features)?.mapv(|s| s > self.threshold))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Rows drawn for each tree.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

/// Linearly interpolated `q` quantile.
fn quantile(mut values: Vec<f64>, q: f64) -> f64 {
    values.sort_by(f64::total_cmp);
    let position = q * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    values[lower] + (values[upper] - values[lower]) * (position - lower as f64)
}

//! Weighted CART classification tree.
//!
//! Trees are grown to purity on the rows with positive weight, drawing a
//! random subset of candidate features at every node and choosing the split
//! with the largest weighted Gini decrease. Leaves store the weighted share
//! of class 1.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        proba: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    improvement: f64,
}

/// Weighted class totals of a set of rows.
#[derive(Debug, Clone, Copy, Default)]
struct ClassWeights {
    negative: f64,
    positive: f64,
}

impl ClassWeights {
    fn add(&mut self, label: i64, weight: f64) {
        if label == 1 {
            self.positive += weight;
        } else {
            self.negative += weight;
        }
    }

    fn total(&self) -> f64 {
        self.negative + self.positive
    }

    fn is_pure(&self) -> bool {
        self.negative == 0.0 || self.positive == 0.0
    }

    /// Total weight times Gini impurity.
    fn weighted_gini(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        total - (self.negative * self.negative + self.positive * self.positive) / total
    }
}

/// A fitted classification tree stored as a flat node arena.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows of `features` whose `weights` entry is positive.
    pub(crate) fn grow(
        features: ArrayView2<'_, f64>,
        labels: ArrayView1<'_, i64>,
        weights: &[f64],
        max_features: usize,
        rng: &mut StdRng,
    ) -> Self {
        let rows: Vec<usize> = (0..features.nrows())
            .filter(|&i| weights[i] > 0.0)
            .collect();
        let mut candidates: Vec<usize> = (0..features.ncols()).collect();

        let mut nodes = vec![Node::Leaf { proba: 0.0 }];
        let mut pending = vec![(0usize, rows)];

        while let Some((id, rows)) = pending.pop() {
            let mut totals = ClassWeights::default();
            for &i in &rows {
                totals.add(labels[i], weights[i]);
            }
            let proba = if totals.total() > 0.0 {
                totals.positive / totals.total()
            } else {
                0.0
            };

            if rows.len() < 2 || totals.is_pure() {
                nodes[id] = Node::Leaf { proba };
                continue;
            }

            let Some(split) = best_split(
                features,
                labels,
                weights,
                &rows,
                totals,
                &mut candidates,
                max_features,
                rng,
            ) else {
                nodes[id] = Node::Leaf { proba };
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&i| features[[i, split.feature]] <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { proba: 0.0 });
            nodes.push(Node::Leaf { proba: 0.0 });
            nodes[id] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            pending.push((left, left_rows));
            pending.push((right, right_rows));
        }

        Self { nodes }
    }

    /// Class-1 probability of the leaf `row` falls into.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
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
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

/// Search up to `max_features` non-constant features in random order.
#[allow(clippy::too_many_arguments)]
fn best_split(
    features: ArrayView2<'_, f64>,
    labels: ArrayView1<'_, i64>,
    weights: &[f64],
    rows: &[usize],
    totals: ClassWeights,
    candidates: &mut [usize],
    max_features: usize,
    rng: &mut StdRng,
) -> Option<Split> {
    candidates.shuffle(rng);
    let parent_impurity = totals.weighted_gini();

    let mut best: Option<Split> = None;
    let mut visited = 0;
    let mut order = rows.to_vec();

    for &feature in candidates.iter() {
        if visited >= max_features {
            break;
        }

        order.sort_by(|&a, &b| features[[a, feature]].total_cmp(&features[[b, feature]]));
        let first = features[[order[0], feature]];
        let last = features[[order[order.len() - 1], feature]];
        if first == last {
            continue;
        }
        visited += 1;

        let mut left = ClassWeights::default();
        for k in 0..order.len() - 1 {
            let i = order[k];
            left.add(labels[i], weights[i]);

            let current = features[[i, feature]];
            let next = features[[order[k + 1], feature]];
            if current == next {
                continue;
            }

            let right = ClassWeights {
                negative: totals.negative - left.negative,
                positive: totals.positive - left.positive,
            };
            let improvement = parent_impurity - left.weighted_gini() - right.weighted_gini();

            if best.is_none_or(|b| improvement > b.improvement) {
                best = Some(Split {
                    feature,
                    threshold: midpoint(current, next),
                    improvement,
                });
            }
        }
    }

    best
}

/// Threshold between two adjacent distinct values that keeps `low` on the left.
fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low / 2.0 + high / 2.0;
    if mid >= high || !mid.is_finite() {
        low
    } else {
        mid
    }
}

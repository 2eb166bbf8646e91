//! Fitted model types.
//!
//! - [`LogisticRegression`]: linear baseline
//! - [`RandomForest`]: class-weighted ensemble of [`DecisionTree`]s
//! - [`IsolationForest`]: unsupervised anomaly detector
//!
//! Models are produced by the functions in [`crate::trainers`], which
//! validate their inputs first.

mod forest;
mod isolation;
mod logistic;
mod tree;

pub use forest::{ForestParams, RandomForest};
pub use isolation::{IsolationForest, IsolationParams, average_path_length};
pub use logistic::{LogisticRegression, NewtonParams};
pub use tree::DecisionTree;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, TrainingError};

/// One seed per tree, drawn from a generator seeded with `seed`.
///
/// Trees built from these seeds are identical whatever the thread count.
pub(crate) fn tree_seeds(seed: u64, n_trees: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_trees).map(|_| rng.r#gen::<u64>()).collect()
}

/// Run `op` on a dedicated pool of `n_jobs` threads, or on the global pool.
pub(crate) fn in_pool<T, F>(n_jobs: Option<usize>, op: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match n_jobs {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| {
                    TrainingError::TrainingFailed(format!("failed to start thread pool: {}", e))
                })?;
            Ok(pool.install(op))
        }
        None => Ok(op()),
    }
}

static_assertions::assert_impl_all!(LogisticRegression: Send, Sync, Clone);
static_assertions::assert_impl_all!(RandomForest: Send, Sync, Clone);
static_assertions::assert_impl_all!(IsolationForest: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_seeds_are_reproducible() {
        assert_eq!(tree_seeds(7, 5), tree_seeds(7, 5));
        assert_ne!(tree_seeds(7, 5), tree_seeds(8, 5));
    }

    #[test]
    fn test_in_pool_runs_with_explicit_threads() {
        let value = in_pool(Some(2), rayon::current_num_threads).unwrap();
        assert_eq!(value, 2);
    }
}

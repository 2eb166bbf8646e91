//! L2-regularized logistic regression fitted with a primal Newton method.
//!
//! The objective is
//!
//! ```text
//! f(w) = 0.5 * |w|^2 + C * sum_i log(1 + exp(-y_i * w.x_i))
//! ```
//!
//! with `y_i` in `{-1, +1}` and a constant `1.0` appended to every row, so the
//! intercept is regularized together with the coefficients.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use tracing::debug;

use crate::error::{Result, TrainingError};
use crate::types::TrainingWarning;

/// Armijo sufficient-decrease constant of the line search.
const ARMIJO: f64 = 1e-4;

/// Step halvings tried before a Newton step is abandoned.
const MAX_LINE_SEARCH: usize = 30;

/// Solver settings for [`LogisticRegression::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonParams {
    pub c: f64,
    pub tol: f64,
    pub max_iter: usize,
}

/// A fitted binary logistic regression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    coefficients: Array1<f64>,
    intercept: f64,
    n_iter: usize,
    converged: bool,
    warnings: Vec<TrainingWarning>,
}

impl LogisticRegression {
    /// Fit on `features` and `{0, 1}` labels.
    ///
    /// Inputs are assumed validated. Running out of iterations is not an
    /// error: the model is returned with a [`TrainingWarning::Convergence`].
    pub fn fit(
        features: ArrayView2<'_, f64>,
        labels: ArrayView1<'_, i64>,
        params: NewtonParams,
    ) -> Result<Self> {
        let n = features.nrows();
        let bias = Array2::<f64>::ones((n, 1));
        let x = ndarray::concatenate(Axis(1), &[features.view(), bias.view()])
            .map_err(|e| TrainingError::TrainingFailed(e.to_string()))?;
        let y: Array1<f64> = labels.mapv(|l| if l == 1 { 1.0 } else { -1.0 });

        let positives = y.iter().filter(|&&v| v > 0.0).count();
        let negatives = n - positives;
        let eps = params.tol * positives.min(negatives).max(1) as f64 / n as f64;

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut loss = objective(&x, &y, &w, params.c);
        let mut grad = gradient(&x, &y, &w, params.c);
        let target_norm = eps * norm(&grad);

        let mut n_iter = 0;
        let mut converged = norm(&grad) <= target_norm;

        while !converged && n_iter < params.max_iter {
            let direction = newton_direction(&x, &y, &w, &grad, params.c)?;
            let slope = grad.dot(&direction);

            let mut step = 1.0;
            let mut accepted = false;
            for _ in 0..MAX_LINE_SEARCH {
                let candidate = &w + &(&direction * step);
                let candidate_loss = objective(&x, &y, &candidate, params.c);
                if candidate_loss <= loss + ARMIJO * step * slope {
                    w = candidate;
                    loss = candidate_loss;
                    accepted = true;
                    break;
                }
                step *= 0.5;
            }

            n_iter += 1;
            grad = gradient(&x, &y, &w, params.c);
            converged = norm(&grad) <= target_norm;

            if !accepted {
                debug!("Line search made no progress at iteration {}", n_iter);
                break;
            }
        }

        let mut warnings = Vec::new();
        if !converged {
            warnings.push(TrainingWarning::Convergence {
                iterations: n_iter,
                gradient_norm: norm(&grad),
                target_norm,
            });
        }

        let p = features.ncols();
        Ok(Self {
            coefficients: w.slice(s![..p]).to_owned(),
            intercept: w[p],
            n_iter,
            converged,
            warnings,
        })
    }

    /// Probability of class 1 for each row.
    pub fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        self.check_width(features.ncols())?;
        Ok(features
            .dot(&self.coefficients)
            .mapv(|z| sigmoid(z + self.intercept)))
    }

    /// Class labels, thresholding the probability at 0.5.
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        Ok(self
            .predict_proba(features)?
            .mapv(|p| if p > 0.5 { 1 } else { 0 }))
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Newton iterations performed.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn warnings(&self) -> &[TrainingWarning] {
        &self.warnings
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn check_width(&self, found: usize) -> Result<()> {
        if found != self.n_features() {
            return Err(TrainingError::FeatureMismatch {
                expected: self.n_features(),
                found,
            });
        }
        Ok(())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + exp(-m))` without overflow.
fn log_loss(margin: f64) -> f64 {
    if margin > 0.0 {
        (-margin).exp().ln_1p()
    } else {
        -margin + margin.exp().ln_1p()
    }
}

fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

fn objective(x: &Array2<f64>, y: &Array1<f64>, w: &Array1<f64>, c: f64) -> f64 {
    let margins = x.dot(w) * y;
    0.5 * w.dot(w) + c * margins.iter().map(|&m| log_loss(m)).sum::<f64>()
}

fn gradient(x: &Array2<f64>, y: &Array1<f64>, w: &Array1<f64>, c: f64) -> Array1<f64> {
    let margins = x.dot(w) * y;
    let residuals = Array1::from_iter(
        margins
            .iter()
            .zip(y.iter())
            .map(|(&m, &yi)| (sigmoid(m) - 1.0) * yi),
    );
    w + &(x.t().dot(&residuals) * c)
}

/// Solve `H d = -g` with `H = I + C * X^T D X`.
fn newton_direction(
    x: &Array2<f64>,
    y: &Array1<f64>,
    w: &Array1<f64>,
    grad: &Array1<f64>,
    c: f64,
) -> Result<Array1<f64>> {
    let margins = x.dot(w) * y;
    let curvature = margins.mapv(|m| {
        let s = sigmoid(m);
        s * (1.0 - s)
    });

    let weighted = x * &curvature.insert_axis(Axis(1));
    let mut hessian = x.t().dot(&weighted) * c;
    hessian.diag_mut().mapv_inplace(|d| d + 1.0);

    let k = hessian.nrows();
    let h = DMatrix::from_fn(k, k, |i, j| hessian[[i, j]]);
    let rhs = DVector::from_iterator(k, grad.iter().map(|g| -g));

    let cholesky = h.cholesky().ok_or_else(|| {
        TrainingError::TrainingFailed("Hessian is not positive definite".to_string())
    })?;
    let direction = cholesky.solve(&rhs);

    Ok(Array1::from_iter(direction.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params() -> NewtonParams {
        NewtonParams {
            c: 1.0,
            tol: 1e-4,
            max_iter: 1000,
        }
    }

    #[test]
    fn test_separates_one_dimensional_classes() {
        let x = array![[-3.0], [-2.0], [-1.5], [-1.0], [1.0], [1.5], [2.0], [3.0]];
        let y = array![0i64, 0, 0, 0, 1, 1, 1, 1];

        let model = LogisticRegression::fit(x.view(), y.view(), params()).unwrap();

        assert!(model.converged());
        assert!(model.warnings().is_empty());
        assert!(model.coefficients()[0] > 0.0);
        assert_eq!(model.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0], [3.0, 1.0]];
        let y = array![0i64, 0, 1, 1];

        let model = LogisticRegression::fit(x.view(), y.view(), params()).unwrap();
        let proba = model.predict_proba(x.view()).unwrap();

        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert!(proba[3] > proba[0]);
    }

    #[test]
    fn test_single_iteration_budget_warns() {
        let x = array![[-2.0], [-1.0], [1.0], [2.0]];
        let y = array![0i64, 0, 1, 1];
        let budget = NewtonParams {
            max_iter: 1,
            tol: 1e-12,
            ..params()
        };

        let model = LogisticRegression::fit(x.view(), y.view(), budget).unwrap();

        assert!(!model.converged());
        assert_eq!(model.n_iter(), 1);
        assert!(matches!(
            model.warnings(),
            [TrainingWarning::Convergence { iterations: 1, .. }]
        ));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let x = array![[-1.0], [1.0]];
        let y = array![0i64, 1];
        let model = LogisticRegression::fit(x.view(), y.view(), params()).unwrap();

        let err = model.predict(array![[1.0, 2.0]].view()).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::FeatureMismatch {
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn test_log_loss_is_stable() {
        assert!(log_loss(1000.0).abs() < 1e-12);
        assert!((log_loss(-1000.0) - 1000.0).abs() < 1e-9);
        assert!((log_loss(0.0) - std::f64::consts::LN_2).abs() < 1e-12);
    }
}

//! Ordinary least squares regression

use super::models::{validate_fit_input, validate_predict_input, Regressor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Relative size below which a Cholesky pivot marks a dependent column
const RANK_TOL: f64 = 1e-9;

/// Least squares through the normal equations `(XᵀX) w = Xᵀy`.
///
/// The Cholesky factorisation skips any column whose pivot collapses
/// relative to its own squared norm and pins its weight to zero. Centered
/// one-hot blocks are always rank deficient by one.
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Array1<f64> {
    let gram = x.t().dot(x);
    let rhs = x.t().dot(y);
    let n = gram.nrows();

    let mut l = Array2::<f64>::zeros((n, n));
    let mut active = vec![true; n];

    for j in 0..n {
        let pivot = gram[[j, j]] - (0..j).map(|k| l[[j, k]] * l[[j, k]]).sum::<f64>();
        if pivot <= RANK_TOL * gram[[j, j]].max(f64::MIN_POSITIVE) {
            active[j] = false;
            continue;
        }
        let d = pivot.sqrt();
        l[[j, j]] = d;
        for i in (j + 1)..n {
            let dot: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            l[[i, j]] = (gram[[i, j]] - dot) / d;
        }
    }

    // forward: L z = Xᵀy
    let mut z = Array1::<f64>::zeros(n);
    for i in (0..n).filter(|&i| active[i]) {
        let dot: f64 = (0..i).map(|k| l[[i, k]] * z[k]).sum();
        z[i] = (rhs[i] - dot) / l[[i, i]];
    }

    // backward: Lᵀ w = z
    let mut w = Array1::<f64>::zeros(n);
    for i in (0..n).rev().filter(|&i| active[i]) {
        let dot: f64 = ((i + 1)..n).map(|k| l[[k, i]] * w[k]).sum();
        w[i] = (z[i] - dot) / l[[i, i]];
    }

    w
}

/// Linear regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
    /// Whether to fit intercept
    pub fit_intercept: bool,
    n_features: Option<usize>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Create a new linear regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            n_features: None,
        }
    }

    /// Enable/disable fitting intercept
    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_fit_input(x, y)?;

        // Center data if fitting intercept
        let (x_centered, y_centered, means) = if self.fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .ok_or_else(|| ScorecastError::DataError("empty feature matrix".to_string()))?;
            let y_mean = y.mean().unwrap_or(0.0);

            let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
            let y_centered = y - y_mean;

            (x_centered, y_centered, Some((x_mean, y_mean)))
        } else {
            (x.clone(), y.clone(), None)
        };

        let coefficients = solve_least_squares(&x_centered, &y_centered);

        let intercept = match means {
            Some((x_mean, y_mean)) => y_mean - coefficients.dot(&x_mean),
            None => 0.0,
        };

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        self.n_features = Some(x.ncols());

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        validate_predict_input(x, self.n_features)?;
        let coefficients = self.coefficients.as_ref().ok_or(ScorecastError::ModelNotFitted)?;
        let intercept = self.intercept.unwrap_or(0.0);

        Ok(x.dot(coefficients) + intercept)
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

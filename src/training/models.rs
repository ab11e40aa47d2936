//! Model traits and regression metrics

use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Metrics for a regression model scored on held-out data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Number of scored samples
    pub n_samples: usize,
}

impl ModelMetrics {
    /// Compute regression metrics
    pub fn compute_regression(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        let r2 = r2_score(y_true, y_pred)?;
        let n = y_true.len() as f64;

        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse: f64 = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae: f64 = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
            n_samples: y_true.len(),
        })
    }
}

/// Coefficient of determination: `1 - SS_res / SS_tot`.
///
/// A constant `y_true` has no variance to explain: the score is `1.0` when
/// the predictions match exactly and `0.0` otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(ScorecastError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(ScorecastError::DataError(
            "R² is undefined for an empty target".to_string(),
        ));
    }

    let y_mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// A regression algorithm that learns in place.
///
/// Implemented by every concrete model in [`crate::training`].
pub trait Regressor: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Number of feature columns seen during fit
    fn n_features(&self) -> Option<usize>;
}

/// Anything that turns a feature matrix into predictions
pub trait Predictor {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// An unfitted model specification that produces a fitted [`Predictor`]
/// without being mutated itself.
pub trait Estimator: Send + Sync {
    type Fitted: Predictor + Send;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self::Fitted>;
}

/// Shared input checks for `Regressor::fit`
pub(crate) fn validate_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    let n_samples = x.nrows();

    if n_samples != y.len() {
        return Err(ScorecastError::ShapeError {
            expected: format!("y length = {}", n_samples),
            actual: format!("y length = {}", y.len()),
        });
    }
    if n_samples == 0 {
        return Err(ScorecastError::DataError(
            "cannot fit on an empty training set".to_string(),
        ));
    }
    if x.ncols() == 0 {
        return Err(ScorecastError::DataError(
            "cannot fit without feature columns".to_string(),
        ));
    }
    if let Some((row, col)) = x
        .indexed_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(idx, _)| idx)
    {
        return Err(ScorecastError::DataError(format!(
            "non-finite feature value at row {}, column {}",
            row, col
        )));
    }
    if let Some(row) = y.iter().position(|v| !v.is_finite()) {
        return Err(ScorecastError::DataError(format!(
            "non-finite target value at row {}",
            row
        )));
    }

    Ok(())
}

/// Shared input checks for `Regressor::predict`
pub(crate) fn validate_predict_input(x: &Array2<f64>, n_features: Option<usize>) -> Result<usize> {
    let expected = n_features.ok_or(ScorecastError::ModelNotFitted)?;
    if x.ncols() != expected {
        return Err(ScorecastError::ShapeError {
            expected: format!("{} feature columns", expected),
            actual: format!("{} feature columns", x.ncols()),
        });
    }
    Ok(expected)
}

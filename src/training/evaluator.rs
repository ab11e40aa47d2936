//! Fit-and-score for a single candidate

use super::catalog::Candidate;
use super::models::{Estimator, ModelMetrics, Predictor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2};
use tracing::debug;

/// Fit `candidate` on train, predict test, and return the fitted model with
/// its held-out R². Inputs are only borrowed.
pub fn evaluate<E: Estimator>(
    candidate: &Candidate<E>,
    train_x: &Array2<f64>,
    train_y: &Array1<f64>,
    test_x: &Array2<f64>,
    test_y: &Array1<f64>,
) -> Result<(E::Fitted, f64)> {
    let name = candidate.name.as_str();

    let model = candidate
        .algorithm
        .fit(train_x, train_y)
        .map_err(|e| ScorecastError::fit_failed(name, e))?;

    let score = score_model(name, &model, test_x, test_y)?;
    debug!(model = name, r2 = score, "candidate scored");

    Ok((model, score))
}

/// Held-out R² of an already fitted model. Non-finite predictions or scores
/// are prediction failures, so every returned score is a finite real.
pub fn score_model<P: Predictor + ?Sized>(
    name: &str,
    model: &P,
    test_x: &Array2<f64>,
    test_y: &Array1<f64>,
) -> Result<f64> {
    held_out_metrics(name, model, test_x, test_y).map(|metrics| metrics.r2)
}

/// Full regression metrics of a fitted model on held-out data
pub fn held_out_metrics<P: Predictor + ?Sized>(
    name: &str,
    model: &P,
    test_x: &Array2<f64>,
    test_y: &Array1<f64>,
) -> Result<ModelMetrics> {
    let prediction_error = |reason: String| ScorecastError::PredictionError {
        model: name.to_string(),
        reason,
        source: None,
    };

    if test_x.nrows() == 0 {
        return Err(prediction_error("test set is empty".to_string()));
    }

    let y_pred = model
        .predict(test_x)
        .map_err(|e| ScorecastError::prediction_failed(name, e))?;

    if let Some(row) = y_pred.iter().position(|p| !p.is_finite()) {
        return Err(prediction_error(format!("non-finite prediction at row {}", row)));
    }

    let metrics = ModelMetrics::compute_regression(test_y, &y_pred)
        .map_err(|e| ScorecastError::prediction_failed(name, e))?;
    if !metrics.r2.is_finite() {
        return Err(prediction_error(format!("R² is not finite ({})", metrics.r2)));
    }

    Ok(metrics)
}

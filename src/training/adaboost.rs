//! AdaBoost regressor (AdaBoost.R2)
//!
//! Each round fits a depth-3 tree on a bootstrap resample drawn with the
//! current sample weights, reweights samples by their normalized linear loss,
//! and predicts with the weighted median of the member trees.

use super::decision_tree::DecisionTree;
use super::models::{validate_fit_input, validate_predict_input, Regressor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, Axis};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostRegressor {
    estimators: Vec<DecisionTree>,
    estimator_weights: Vec<f64>,
    estimator_errors: Vec<f64>,
    pub n_estimators: usize,
    pub learning_rate: f64,
    /// Depth of each member tree
    pub max_depth: usize,
    pub random_state: Option<u64>,
    n_features: Option<usize>,
}

impl Default for AdaBoostRegressor {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            estimators: Vec::new(),
            estimator_weights: Vec::new(),
            estimator_errors: Vec::new(),
            n_estimators: n_estimators.max(1),
            learning_rate,
            max_depth: 3,
            random_state: None,
            n_features: None,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Number of boosting rounds actually kept
    pub fn n_fitted(&self) -> usize {
        self.estimators.len()
    }

    /// Weighted loss of each kept round
    pub fn estimator_errors(&self) -> &[f64] {
        &self.estimator_errors
    }

    /// Weighted median of the member predictions for one sample
    fn weighted_median(&self, predictions: &[f64]) -> f64 {
        let mut order: Vec<usize> = (0..predictions.len()).collect();
        order.sort_by(|&a, &b| predictions[a].total_cmp(&predictions[b]));

        let total: f64 = self.estimator_weights.iter().sum();
        let half = 0.5 * total;
        let mut cumulative = 0.0;
        for &idx in &order {
            cumulative += self.estimator_weights[idx];
            if cumulative >= half {
                return predictions[idx];
            }
        }
        order.last().map_or(0.0, |&idx| predictions[idx])
    }
}

impl Regressor for AdaBoostRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_fit_input(x, y)?;
        if self.learning_rate <= 0.0 {
            return Err(ScorecastError::ConfigError(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }

        let n_samples = x.nrows();
        let mut weights = Array1::from_elem(n_samples, 1.0 / n_samples as f64);
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(42));

        self.estimators.clear();
        self.estimator_weights.clear();
        self.estimator_errors.clear();

        for round in 0..self.n_estimators {
            let sampler = WeightedIndex::new(weights.iter())
                .map_err(|e| ScorecastError::DataError(format!("invalid sample weights: {}", e)))?;
            let sample_indices: Vec<usize> = (0..n_samples).map(|_| sampler.sample(&mut rng)).collect();

            let mut tree = DecisionTree::new().with_max_depth(self.max_depth);
            tree.fit(&x.select(Axis(0), &sample_indices), &y.select(Axis(0), &sample_indices))?;

            let y_pred = tree.predict(x)?;
            let mut losses: Array1<f64> = (&y_pred - y).mapv(f64::abs);
            let max_loss = losses.fold(0.0f64, |m, &v| m.max(v));
            if max_loss > 0.0 {
                losses /= max_loss;
            }

            let estimator_error = weights.dot(&losses);

            if estimator_error <= 0.0 {
                // Perfect fit
                self.estimators.push(tree);
                self.estimator_weights.push(1.0);
                self.estimator_errors.push(0.0);
                break;
            }

            if estimator_error >= 0.5 {
                // Keep a too-weak round only when it is the sole member
                if self.estimators.is_empty() {
                    self.estimators.push(tree);
                    self.estimator_weights.push(1.0);
                    self.estimator_errors.push(estimator_error);
                }
                break;
            }

            let beta = estimator_error / (1.0 - estimator_error);
            let estimator_weight = self.learning_rate * (1.0 / beta).ln();

            self.estimators.push(tree);
            self.estimator_weights.push(estimator_weight);
            self.estimator_errors.push(estimator_error);

            if round + 1 < self.n_estimators {
                weights.zip_mut_with(&losses, |w, &loss| {
                    *w *= beta.powf((1.0 - loss) * self.learning_rate);
                });
                let total = weights.sum();
                if total <= 0.0 || !total.is_finite() {
                    break;
                }
                weights /= total;
            }
        }

        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        validate_predict_input(x, self.n_features)?;
        if self.estimators.is_empty() {
            return Err(ScorecastError::ModelNotFitted);
        }

        let member_predictions: Vec<Array1<f64>> = self
            .estimators
            .iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<_>>()?;

        let predictions = (0..x.nrows())
            .map(|i| {
                let row: Vec<f64> = member_predictions.iter().map(|p| p[i]).collect();
                self.weighted_median(&row)
            })
            .collect();

        Ok(predictions)
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

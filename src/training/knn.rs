//! K-Nearest Neighbors regressor

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::models::{validate_fit_input, validate_predict_input, Regressor};
use crate::error::{Result, ScorecastError};

/// KNN configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNConfig {
    /// Number of neighbors
    pub n_neighbors: usize,
}

impl Default for KNNConfig {
    fn default() -> Self {
        Self { n_neighbors: 5 }
    }
}

/// Uniformly weighted Euclidean neighbors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNRegressor {
    config: KNNConfig,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl Default for KNNRegressor {
    fn default() -> Self {
        Self::new(KNNConfig::default())
    }
}

impl KNNRegressor {
    pub fn new(config: KNNConfig) -> Self {
        Self {
            config,
            x_train: None,
            y_train: None,
        }
    }

    /// Create with `k` neighbors
    pub fn with_k(k: usize) -> Self {
        Self::new(KNNConfig { n_neighbors: k })
    }

    /// Neighbors actually used: `k` clamped to the training size
    pub fn effective_k(&self) -> usize {
        let n_train = self.y_train.as_ref().map_or(0, |y| y.len());
        self.config.n_neighbors.clamp(1, n_train.max(1))
    }
}

impl Regressor for KNNRegressor {
    /// Stores the training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_fit_input(x, y)?;
        if self.config.n_neighbors == 0 {
            return Err(ScorecastError::ConfigError("n_neighbors must be at least 1".to_string()));
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Predict target values (parallelized over test samples)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        validate_predict_input(x, self.n_features())?;
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x_train), Some(y_train)) => (x_train, y_train),
            _ => return Err(ScorecastError::ModelNotFitted),
        };
        let k = self.effective_k();

        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let neighbors = find_k_nearest(x.row(i), x_train, y_train, k);
                neighbors.iter().sum::<f64>() / neighbors.len() as f64
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn n_features(&self) -> Option<usize> {
        self.x_train.as_ref().map(|x| x.ncols())
    }
}

/// Max-heap entry keeping the k smallest `(distance, train index)` pairs.
/// Equal distances resolve to the lower training index.
struct Neighbor {
    dist: f64,
    index: usize,
    target: f64,
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Targets of the k nearest training rows, found with a max-heap in O(n log k)
fn find_k_nearest(
    point: ArrayView1<f64>,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<f64> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (index, row) in x_train.rows().into_iter().enumerate() {
        let candidate = Neighbor {
            dist: euclidean(point, row),
            index,
            target: y_train[index],
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().map_or(false, |top| candidate < *top) {
            heap.pop();
            heap.push(candidate);
        }
    }

    heap.into_sorted_vec().into_iter().map(|n| n.target).collect()
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| (ai - bi).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((10, 2), (0..20).map(|i| i as f64).collect()).unwrap();
        let y: Array1<f64> = x.rows().into_iter().map(|row| row[0] + row[1]).collect();
        (x, y)
    }

    #[test]
    fn test_knn_regressor() {
        let (x, y) = create_regression_data();

        let mut knn = KNNRegressor::with_k(3);
        knn.fit(&x, &y).unwrap();

        let predictions = knn.predict(&x).unwrap();
        let mse: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(yi, pi)| (yi - pi).powi(2))
            .sum::<f64>()
            / y.len() as f64;

        assert!(mse < 10.0, "MSE ({}) should be low", mse);
    }

    #[test]
    fn test_uniform_mean_of_five() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [100.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0, 1000.0];

        let mut knn = KNNRegressor::default();
        knn.fit(&x, &y).unwrap();

        let pred = knn.predict(&array![[2.0]]).unwrap();
        assert!((pred[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_clamps_to_training_size() {
        let x = array![[0.0], [10.0]];
        let y = array![2.0, 4.0];

        let mut knn = KNNRegressor::default();
        knn.fit(&x, &y).unwrap();

        assert_eq!(knn.effective_k(), 2);
        let pred = knn.predict(&array![[0.0]]).unwrap();
        assert!((pred[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_distances_prefer_lower_index() {
        // rows 1 and 2 are both at distance 1 from the query; k = 2 keeps rows 0 and 1
        let x = array![[0.0], [1.0], [-1.0], [5.0]];
        let y = array![10.0, 20.0, 40.0, 80.0];

        let mut knn = KNNRegressor::with_k(2);
        knn.fit(&x, &y).unwrap();

        let pred = knn.predict(&array![[0.0]]).unwrap();
        assert_eq!(pred[0], 15.0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert!((euclidean(a.view(), b.view()) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_before_fit() {
        let knn = KNNRegressor::default();
        assert!(matches!(knn.predict(&array![[1.0]]), Err(ScorecastError::ModelNotFitted)));
    }
}

//! Extra Trees (Extremely Randomized Trees) regressor
//!
//! Unlike Random Forest, which searches for the best threshold, Extra Trees
//! draws one threshold per candidate feature uniformly between the feature's
//! min and max, then keeps the draw with the lowest squared error. Every tree
//! sees the full training set.

use super::models::{validate_fit_input, validate_predict_input, Regressor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum ExtraTreeNode {
    Leaf { value: f64 },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<ExtraTreeNode>,
        right: Box<ExtraTreeNode>,
    },
}

impl ExtraTreeNode {
    fn predict_sample(&self, sample: ArrayView1<f64>) -> f64 {
        match self {
            ExtraTreeNode::Leaf { value } => *value,
            ExtraTreeNode::Split { feature, threshold, left, right } => {
                if sample[*feature] <= *threshold {
                    left.predict_sample(sample)
                } else {
                    right.predict_sample(sample)
                }
            }
        }
    }
}

/// Growth limits shared by every tree of one fit
#[derive(Debug, Clone, Copy)]
struct GrowthParams {
    max_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraTrees {
    trees: Vec<ExtraTreeNode>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features to consider per split (None = all)
    pub max_features: Option<usize>,
    pub random_state: Option<u64>,
    n_features: Option<usize>,
}

impl Default for ExtraTrees {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ExtraTrees {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: n_estimators.max(1),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: None,
            n_features: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn with_max_features(mut self, mf: usize) -> Self {
        self.max_features = Some(mf);
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn build_tree(
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        params: GrowthParams,
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> ExtraTreeNode {
        let n = indices.len();
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n as f64;

        if n < params.min_samples_split || params.max_depth.map_or(false, |d| depth >= d) {
            return ExtraTreeNode::Leaf { value: mean };
        }

        let first_y = y[indices[0]];
        if indices.iter().all(|&i| (y[i] - first_y).abs() < 1e-15) {
            return ExtraTreeNode::Leaf { value: first_y };
        }

        let n_features = x.ncols();
        let feature_indices: Vec<usize> = if params.max_features >= n_features {
            (0..n_features).collect()
        } else {
            index::sample(rng, n_features, params.max_features).into_vec()
        };

        let mut best: Option<(usize, f64, f64)> = None;

        for &f in &feature_indices {
            let (fmin, fmax) = indices.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &i| {
                let v = x[[i, f]];
                (lo.min(v), hi.max(v))
            });

            if fmax - fmin < 1e-15 {
                continue;
            }

            let threshold = fmin + rng.gen::<f64>() * (fmax - fmin);

            let mut stats = [(0usize, 0.0f64, 0.0f64); 2];
            for &i in indices {
                let side = usize::from(x[[i, f]] > threshold);
                stats[side].0 += 1;
                stats[side].1 += y[i];
                stats[side].2 += y[i] * y[i];
            }

            if stats[0].0 < params.min_samples_leaf || stats[1].0 < params.min_samples_leaf {
                continue;
            }

            let sse: f64 = stats
                .iter()
                .map(|&(count, sum, sq)| sq - sum * sum / count as f64)
                .sum();

            if best.map_or(true, |(_, _, b)| sse < b) {
                best = Some((f, threshold, sse));
            }
        }

        let (feature, threshold, _) = match best {
            Some(split) => split,
            None => return ExtraTreeNode::Leaf { value: mean },
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| x[[i, feature]] <= threshold);

        let left = Self::build_tree(x, y, &left_idx, params, depth + 1, rng);
        let right = Self::build_tree(x, y, &right_idx, params, depth + 1, rng);

        ExtraTreeNode::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl Regressor for ExtraTrees {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_fit_input(x, y)?;

        let n_features = x.ncols();
        let params = GrowthParams {
            max_features: self.max_features.map_or(n_features, |mf| mf.clamp(1, n_features)),
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split.max(2),
            min_samples_leaf: self.min_samples_leaf.max(1),
        };
        let all_indices: Vec<usize> = (0..x.nrows()).collect();
        let base_seed = self.random_state.unwrap_or(42);

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));
                Self::build_tree(x, y, &all_indices, params, 0, &mut rng)
            })
            .collect();
        self.n_features = Some(n_features);

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        validate_predict_input(x, self.n_features)?;
        if self.trees.is_empty() {
            return Err(ScorecastError::ModelNotFitted);
        }

        let n_trees = self.trees.len() as f64;
        let predictions: Vec<f64> = x
            .rows()
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_sample(row)).sum::<f64>() / n_trees)
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

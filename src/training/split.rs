//! Feature/target datasets and the train/test split

use crate::error::{Result, ScorecastError};
use ndarray::{s, Array1, Array2};

/// A feature matrix paired with its target vector
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    target: Array1<f64>,
}

impl Dataset {
    /// Pair features with targets, checking one target per row
    pub fn new(features: Array2<f64>, target: Array1<f64>) -> Result<Self> {
        if features.nrows() != target.len() {
            return Err(ScorecastError::ShapeError {
                expected: format!("{} target values", features.nrows()),
                actual: format!("{} target values", target.len()),
            });
        }
        Ok(Self { features, target })
    }

    /// Take the last column as the target and the rest as features
    pub fn from_array(array: &Array2<f64>) -> Result<Self> {
        let n_cols = array.ncols();
        if n_cols < 2 {
            return Err(ScorecastError::ShapeError {
                expected: "at least 2 columns (features + target)".to_string(),
                actual: format!("{} columns", n_cols),
            });
        }

        let features = array.slice(s![.., ..n_cols - 1]).to_owned();
        let target = array.column(n_cols - 1).to_owned();
        Self::new(features, target)
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Held-out evaluation split; both sides share the feature layout
#[derive(Debug, Clone)]
pub struct Split {
    train: Dataset,
    test: Dataset,
}

impl Split {
    pub fn new(train: Dataset, test: Dataset) -> Result<Self> {
        if train.n_features() != test.n_features() {
            return Err(ScorecastError::ShapeError {
                expected: format!("{} test feature columns", train.n_features()),
                actual: format!("{} test feature columns", test.n_features()),
            });
        }
        Ok(Self { train, test })
    }

    /// Build from transformed arrays whose final column is the target
    pub fn from_arrays(train_array: &Array2<f64>, test_array: &Array2<f64>) -> Result<Self> {
        Self::new(Dataset::from_array(train_array)?, Dataset::from_array(test_array)?)
    }

    pub fn train(&self) -> &Dataset {
        &self.train
    }

    pub fn test(&self) -> &Dataset {
        &self.test
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_last_column_is_target() {
        let array = array![[1.0, 2.0, 10.0], [3.0, 4.0, 20.0]];
        let dataset = Dataset::from_array(&array).unwrap();

        assert_eq!(dataset.features(), &array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(dataset.target(), &array![10.0, 20.0]);
    }

    #[test]
    fn test_single_column_rejected() {
        let array = array![[1.0], [2.0]];
        assert!(matches!(Dataset::from_array(&array), Err(ScorecastError::ShapeError { .. })));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = Dataset::new(array![[1.0], [2.0]], array![1.0]);
        assert!(matches!(result, Err(ScorecastError::ShapeError { .. })));
    }

    #[test]
    fn test_split_requires_matching_widths() {
        let train = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let test = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(Split::from_arrays(&train, &test).is_err());
    }
}

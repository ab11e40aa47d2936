//! The fixed, ordered set of regression candidates

use super::adaboost::AdaBoostRegressor;
use super::decision_tree::DecisionTree;
use super::engine::TrainedModel;
use super::extra_trees::ExtraTrees;
use super::gradient_boosting::GradientBoostingRegressor;
use super::knn::KNNRegressor;
use super::linear_models::LinearRegression;
use super::models::Estimator;
use super::random_forest::RandomForest;
use super::xgboost::XGBoostRegressor;
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Regression algorithm families with library-default hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    RandomForest,
    GradientBoosting,
    AdaBoost,
    ExtraTrees,
    LinearRegression,
    KNeighbors,
    DecisionTree,
    XGBoost,
}

impl Algorithm {
    /// Every family, in default catalog order
    pub const ALL: [Algorithm; 8] = [
        Algorithm::RandomForest,
        Algorithm::GradientBoosting,
        Algorithm::AdaBoost,
        Algorithm::ExtraTrees,
        Algorithm::LinearRegression,
        Algorithm::KNeighbors,
        Algorithm::DecisionTree,
        Algorithm::XGBoost,
    ];

    /// Display name used in score reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Algorithm::RandomForest => "RandomForest Regressor",
            Algorithm::GradientBoosting => "GradientBoosting Regressor",
            Algorithm::AdaBoost => "AdaBoost Regressor",
            Algorithm::ExtraTrees => "ExtraTrees Regressor",
            Algorithm::LinearRegression => "Linear Regression",
            Algorithm::KNeighbors => "KNeighbors Regressor",
            Algorithm::DecisionTree => "DecisionTree Regressor",
            Algorithm::XGBoost => "XGBRegressor",
        }
    }

    /// Fresh, unfitted model
    pub fn build(&self) -> TrainedModel {
        match self {
            Algorithm::RandomForest => TrainedModel::RandomForest(RandomForest::default()),
            Algorithm::GradientBoosting => {
                TrainedModel::GradientBoosting(GradientBoostingRegressor::default())
            }
            Algorithm::AdaBoost => TrainedModel::AdaBoost(AdaBoostRegressor::default()),
            Algorithm::ExtraTrees => TrainedModel::ExtraTrees(ExtraTrees::default()),
            Algorithm::LinearRegression => {
                TrainedModel::LinearRegression(LinearRegression::default())
            }
            Algorithm::KNeighbors => TrainedModel::KNeighbors(KNNRegressor::default()),
            Algorithm::DecisionTree => TrainedModel::DecisionTree(DecisionTree::default()),
            Algorithm::XGBoost => TrainedModel::XGBoost(XGBoostRegressor::default()),
        }
    }
}

impl Estimator for Algorithm {
    type Fitted = TrainedModel;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<TrainedModel> {
        let mut model = self.build();
        model.as_regressor_mut().fit(x, y)?;
        Ok(model)
    }
}

/// A named, unfitted estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate<E = Algorithm> {
    pub name: String,
    pub algorithm: E,
}

impl<E> Candidate<E> {
    pub fn new(name: impl Into<String>, algorithm: E) -> Self {
        Self {
            name: name.into(),
            algorithm,
        }
    }
}

/// Ordered candidates with unique names; immutable once built
#[derive(Debug, Clone)]
pub struct Catalog<E = Algorithm> {
    entries: Vec<Candidate<E>>,
}

impl<E> Catalog<E> {
    pub fn new(entries: Vec<Candidate<E>>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ScorecastError::ConfigError(
                "catalog needs at least one candidate".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = entries.iter().find(|c| !seen.insert(c.name.as_str())) {
            return Err(ScorecastError::ConfigError(format!(
                "duplicate candidate name '{}'",
                dup.name
            )));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Candidate<E>] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog<Algorithm> {
    /// The eight default regressors in reporting order
    pub fn default_regressors() -> Self {
        Self {
            entries: Algorithm::ALL
                .iter()
                .map(|a| Candidate::new(a.display_name(), *a))
                .collect(),
        }
    }

    /// Restrict the default catalog to the given families, keeping order
    pub fn from_algorithms(algorithms: &[Algorithm]) -> Result<Self> {
        Self::new(
            algorithms
                .iter()
                .map(|a| Candidate::new(a.display_name(), *a))
                .collect(),
        )
    }
}

impl Default for Catalog<Algorithm> {
    fn default() -> Self {
        Self::default_regressors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_default_catalog_order_and_names() {
        let catalog = Catalog::default_regressors();
        assert_eq!(
            catalog.names(),
            vec![
                "RandomForest Regressor",
                "GradientBoosting Regressor",
                "AdaBoost Regressor",
                "ExtraTrees Regressor",
                "Linear Regression",
                "KNeighbors Regressor",
                "DecisionTree Regressor",
                "XGBRegressor",
            ]
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Catalog::new(vec![
            Candidate::new("A", Algorithm::LinearRegression),
            Candidate::new("A", Algorithm::DecisionTree),
        ]);
        assert!(matches!(result, Err(ScorecastError::ConfigError(_))));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let result: Result<Catalog> = Catalog::new(Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_estimator_fit_does_not_mutate_spec() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];

        let algorithm = Algorithm::LinearRegression;
        let fitted = algorithm.fit(&x, &y).unwrap();

        assert_eq!(fitted.algorithm(), Algorithm::LinearRegression);
        assert_eq!(algorithm, Algorithm::LinearRegression);
    }
}

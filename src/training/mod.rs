//! Model training and selection
//!
//! Provides the regressors scored during selection:
//! - Linear regression (OLS)
//! - Decision trees, Random Forests and Extra Trees
//! - Gradient boosting, AdaBoost.R2 and XGBoost-style boosting
//! - K-Nearest Neighbors
//!
//! and the selection pipeline built on top of them: [`evaluate`] one
//! candidate, [`select`] the best of a [`Catalog`], and gate and persist the
//! winner with [`ModelTrainer`].

mod config;
mod engine;
mod models;
pub mod adaboost;
pub mod catalog;
pub mod decision_tree;
pub mod evaluator;
pub mod extra_trees;
pub mod gradient_boosting;
pub mod knn;
pub mod linear_models;
pub mod random_forest;
pub mod selector;
pub mod split;
pub mod xgboost;

pub use adaboost::AdaBoostRegressor;
pub use catalog::{Algorithm, Candidate, Catalog};
pub use config::{ModelTrainerConfig, DEFAULT_MIN_SCORE, MODEL_FILE_NAME};
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{check_quality, FileModelStore, ModelStore, ModelTrainer, TrainedModel, TrainingReport};
pub use evaluator::{evaluate, held_out_metrics, score_model};
pub use extra_trees::ExtraTrees;
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use knn::{KNNConfig, KNNRegressor};
pub use linear_models::LinearRegression;
pub use models::{r2_score, Estimator, ModelMetrics, Predictor, Regressor};
pub use random_forest::RandomForest;
pub use selector::{select, select_with_config, ScoreReport, SelectionResult, SelectorConfig};
pub use split::{Dataset, Split};
pub use xgboost::{XGBoostConfig, XGBoostRegressor};

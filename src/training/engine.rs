//! Model trainer: selection, quality gate and persistence

use super::adaboost::AdaBoostRegressor;
use super::catalog::{Algorithm, Catalog};
use super::config::ModelTrainerConfig;
use super::decision_tree::DecisionTree;
use super::evaluator::held_out_metrics;
use super::extra_trees::ExtraTrees;
use super::gradient_boosting::GradientBoostingRegressor;
use super::knn::KNNRegressor;
use super::linear_models::LinearRegression;
use super::models::{Estimator, ModelMetrics, Predictor, Regressor};
use super::random_forest::RandomForest;
use super::selector::{select_with_config, ScoreReport};
use super::split::Split;
use super::xgboost::XGBoostRegressor;
use crate::error::{Result, ResultExt, ScorecastError};
use crate::export::{save_object, ModelMetadata};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span, warn, Span};

/// Enum to hold trained model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoostingRegressor),
    AdaBoost(AdaBoostRegressor),
    ExtraTrees(ExtraTrees),
    LinearRegression(LinearRegression),
    KNeighbors(KNNRegressor),
    DecisionTree(DecisionTree),
    XGBoost(XGBoostRegressor),
}

impl TrainedModel {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            TrainedModel::RandomForest(_) => Algorithm::RandomForest,
            TrainedModel::GradientBoosting(_) => Algorithm::GradientBoosting,
            TrainedModel::AdaBoost(_) => Algorithm::AdaBoost,
            TrainedModel::ExtraTrees(_) => Algorithm::ExtraTrees,
            TrainedModel::LinearRegression(_) => Algorithm::LinearRegression,
            TrainedModel::KNeighbors(_) => Algorithm::KNeighbors,
            TrainedModel::DecisionTree(_) => Algorithm::DecisionTree,
            TrainedModel::XGBoost(_) => Algorithm::XGBoost,
        }
    }

    pub fn as_regressor(&self) -> &dyn Regressor {
        match self {
            TrainedModel::RandomForest(m) => m,
            TrainedModel::GradientBoosting(m) => m,
            TrainedModel::AdaBoost(m) => m,
            TrainedModel::ExtraTrees(m) => m,
            TrainedModel::LinearRegression(m) => m,
            TrainedModel::KNeighbors(m) => m,
            TrainedModel::DecisionTree(m) => m,
            TrainedModel::XGBoost(m) => m,
        }
    }

    pub fn as_regressor_mut(&mut self) -> &mut dyn Regressor {
        match self {
            TrainedModel::RandomForest(m) => m,
            TrainedModel::GradientBoosting(m) => m,
            TrainedModel::AdaBoost(m) => m,
            TrainedModel::ExtraTrees(m) => m,
            TrainedModel::LinearRegression(m) => m,
            TrainedModel::KNeighbors(m) => m,
            TrainedModel::DecisionTree(m) => m,
            TrainedModel::XGBoost(m) => m,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.as_regressor().n_features().is_some()
    }
}

impl Predictor for TrainedModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.as_regressor().predict(x)
    }
}

/// Destination for the winning model
pub trait ModelStore<M> {
    fn persist(&self, model: &M, metadata: ModelMetadata, path: &Path) -> Result<()>;
}

/// Writes models with [`save_object`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileModelStore;

impl<M: Serialize> ModelStore<M> for FileModelStore {
    fn persist(&self, model: &M, metadata: ModelMetadata, path: &Path) -> Result<()> {
        save_object(model, path, metadata)
    }
}

/// Fail when the best score is below `threshold`. Equality passes.
pub fn check_quality(best_model: &str, score: f64, threshold: f64) -> Result<()> {
    if score < threshold {
        return Err(ScorecastError::InsufficientModelQuality {
            best_model: best_model.to_string(),
            score,
            threshold,
        });
    }
    Ok(())
}

/// Outcome of a successful training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub best_model: String,
    /// Held-out R² of the persisted model
    pub score: f64,
    /// Held-out error metrics of the persisted model
    pub metrics: ModelMetrics,
    /// Every candidate's score in catalog order
    pub report: ScoreReport,
    pub model_path: PathBuf,
    pub training_time_secs: f64,
}

/// Chooses, gates and persists the best regressor for a train/test split
pub struct ModelTrainer<E: Estimator = Algorithm, S = FileModelStore> {
    config: ModelTrainerConfig,
    catalog: Catalog<E>,
    store: S,
    span: Span,
}

impl ModelTrainer {
    /// Default catalog, writing to disk
    pub fn new(config: ModelTrainerConfig) -> Self {
        Self::with_parts(config, Catalog::default_regressors(), FileModelStore)
    }
}

impl Default for ModelTrainer {
    fn default() -> Self {
        Self::new(ModelTrainerConfig::default())
    }
}

impl<E, S> ModelTrainer<E, S>
where
    E: Estimator,
    S: ModelStore<E::Fitted>,
{
    pub fn with_parts(config: ModelTrainerConfig, catalog: Catalog<E>, store: S) -> Self {
        Self {
            config,
            catalog,
            store,
            span: info_span!("model_trainer"),
        }
    }

    /// Emit every event of this trainer inside `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &ModelTrainerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog<E> {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Split each array into features and its last-column target, then train.
    /// Returns the held-out R² of the persisted model.
    pub fn initiate_model_trainer(&self, train_array: &Array2<f64>, test_array: &Array2<f64>) -> Result<f64> {
        let _enter = self.span.enter();
        info!("splitting training and test input data");

        let split = Split::from_arrays(train_array, test_array)
            .context("splitting training and test input data")?;
        self.train_split(&split)
    }

    /// Train on an already split dataset and return the held-out R²
    pub fn train_split(&self, split: &Split) -> Result<f64> {
        self.train_with_report(split).map(|report| report.score)
    }

    /// Train and return the full report
    pub fn train_with_report(&self, split: &Split) -> Result<TrainingReport> {
        let _enter = self.span.enter();
        let start = Instant::now();

        self.config.validate().context("validating trainer configuration")?;

        info!(
            state = "evaluating",
            candidates = self.catalog.len(),
            train_rows = split.train().n_samples(),
            test_rows = split.test().n_samples(),
            features = split.train().n_features(),
            "evaluating candidate models"
        );
        let selection = select_with_config(&self.catalog, split, &self.config.selector)
            .context("selecting the best model")?;

        info!(
            state = "selected",
            best_model = %selection.name,
            r2 = selection.score,
            "best model found on both training and testing dataset"
        );

        if let Err(e) = check_quality(&selection.name, selection.score, self.config.min_score) {
            warn!(
                state = "gated_fail",
                best_model = %selection.name,
                r2 = selection.score,
                threshold = self.config.min_score,
                "best model below quality threshold"
            );
            return Err(e.context("applying the quality gate"));
        }

        let metrics = held_out_metrics(
            &selection.name,
            &selection.model,
            split.test().features(),
            split.test().target(),
        )
        .context("scoring the best model")?;

        let path = &self.config.trained_model_file_path;
        let metadata = ModelMetadata::new(selection.name.as_str())
            .with_model_type(std::any::type_name::<E::Fitted>())
            .add_metric("r2", metrics.r2)
            .add_metric("mse", metrics.mse)
            .add_metric("rmse", metrics.rmse)
            .add_metric("mae", metrics.mae);
        self.store
            .persist(&selection.model, metadata, path)
            .with_context(|| format!("saving trained model to {}", path.display()))?;
        info!(state = "persisted", path = %path.display(), rmse = metrics.rmse, "trained model saved");

        Ok(TrainingReport {
            best_model: selection.name,
            score: metrics.r2,
            metrics,
            report: selection.report,
            model_path: path.clone(),
            training_time_secs: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::load_object;
    use crate::training::catalog::Candidate;
    use ndarray::array;
    use tempfile::tempdir;

    fn arrays() -> (Array2<f64>, Array2<f64>) {
        // Last column = 3*x0 - x1 + 2
        let train = array![
            [1.0, 0.0, 5.0],
            [2.0, 1.0, 7.0],
            [3.0, 4.0, 7.0],
            [4.0, 2.0, 12.0],
            [5.0, 5.0, 12.0],
            [6.0, 1.0, 19.0],
        ];
        let test = array![[1.5, 1.0, 5.5], [2.5, 3.0, 6.5], [5.5, 2.0, 16.5]];
        (train, test)
    }

    #[test]
    fn test_quality_gate_boundary() {
        assert!(check_quality("A", 0.6, 0.6).is_ok());
        let err = check_quality("A", 0.599_999, 0.6).unwrap_err();
        assert!(err.to_string().contains("No best model found"));
    }

    #[test]
    fn test_trainer_persists_winner() {
        let dir = tempdir().unwrap();
        let config = ModelTrainerConfig::new(dir.path());
        let catalog = Catalog::new(vec![Candidate::new("Linear Regression", Algorithm::LinearRegression)]).unwrap();
        let trainer = ModelTrainer::with_parts(config, catalog, FileModelStore);

        let (train, test) = arrays();
        let score = trainer.initiate_model_trainer(&train, &test).unwrap();
        assert!(score > 0.999);

        let model: TrainedModel = load_object(dir.path().join("model.bin")).unwrap();
        assert_eq!(model.algorithm(), Algorithm::LinearRegression);
        assert!(model.is_fitted());
    }

    #[test]
    fn test_report_carries_held_out_metrics() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(vec![Candidate::new("Linear Regression", Algorithm::LinearRegression)]).unwrap();
        let trainer = ModelTrainer::with_parts(ModelTrainerConfig::new(dir.path()), catalog, FileModelStore);

        let (train, test) = arrays();
        let split = Split::from_arrays(&train, &test).unwrap();
        let report = trainer.train_with_report(&split).unwrap();

        assert_eq!(report.metrics.n_samples, 3);
        assert_eq!(report.metrics.r2, report.score);
        assert!(report.metrics.rmse < 1e-6);
    }

    #[test]
    fn test_single_column_arrays_rejected_with_context() {
        let trainer = ModelTrainer::default();
        let err = trainer
            .initiate_model_trainer(&array![[1.0], [2.0]], &array![[1.0]])
            .unwrap_err();
        assert_eq!(err.context_chain(), vec!["splitting training and test input data"]);
        assert!(matches!(err.root_cause(), ScorecastError::ShapeError { .. }));
    }
}

//! Integration test: candidate evaluation, selection, quality gate and persistence

use ndarray::{array, Array1, Array2};
use scorecast::error::{Result, ScorecastError};
use scorecast::export::{load_object, read_metadata, ModelMetadata};
use scorecast::training::{
    evaluate, r2_score, select, Algorithm, Candidate, Catalog, Dataset, Estimator, ModelStore,
    ModelTrainer, ModelTrainerConfig, Predictor, Split, TrainedModel,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ============================================================================
// Scripted candidates: predictions are the test target plus fixed residuals,
// so each candidate's R² is known in advance.
// ============================================================================

/// Test target with mean 0 and SS_tot = 100
fn scripted_target() -> Array1<f64> {
    array![-5.0, 5.0, -5.0, 5.0]
}

#[derive(Debug, Clone)]
struct Scripted {
    residuals: Array1<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct ScriptedModel {
    predictions: Vec<f64>,
}

impl Predictor for ScriptedModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.predictions.iter().take(x.nrows()).copied().collect())
    }
}

impl Estimator for Scripted {
    type Fitted = ScriptedModel;

    fn fit(&self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<ScriptedModel> {
        Ok(ScriptedModel {
            predictions: (&scripted_target() + &self.residuals).to_vec(),
        })
    }
}

/// Residuals whose squares sum to `1 - score` times SS_tot
fn scripted(name: &str, residuals: [f64; 4]) -> Candidate<Scripted> {
    Candidate::new(name, Scripted { residuals: Array1::from_vec(residuals.to_vec()) })
}

fn scripted_split() -> Split {
    let train = Dataset::new(Array2::zeros((4, 1)), array![1.0, 2.0, 3.0, 4.0]).unwrap();
    let test = Dataset::new(Array2::zeros((4, 1)), scripted_target()).unwrap();
    Split::new(train, test).unwrap()
}

/// Remembers what it was asked to persist
#[derive(Default)]
struct RecordingStore {
    saved: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingStore {
    fn saved(&self) -> Vec<(String, PathBuf)> {
        self.saved.lock().unwrap().clone()
    }
}

impl ModelStore<ScriptedModel> for RecordingStore {
    fn persist(&self, _model: &ScriptedModel, metadata: ModelMetadata, path: &Path) -> Result<()> {
        self.saved.lock().unwrap().push((metadata.name, path.to_path_buf()));
        Ok(())
    }
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
}

// ============================================================================
// Selection scenarios
// ============================================================================

#[test]
fn test_higher_scoring_candidate_is_persisted() {
    // A: Σr² = 45 -> 0.55, B: Σr² = 30 -> 0.70
    let catalog = Catalog::new(vec![
        scripted("A", [3.0, 6.0, 0.0, 0.0]),
        scripted("B", [5.0, 1.0, 2.0, 0.0]),
    ])
    .unwrap();
    let trainer = ModelTrainer::with_parts(
        ModelTrainerConfig::new("artifacts"),
        catalog,
        RecordingStore::default(),
    );

    let score = trainer.train_split(&scripted_split()).unwrap();

    assert_close(score, 0.70);
    let saved = trainer.store().saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "B");
    assert_eq!(saved[0].1, PathBuf::from("artifacts").join("model.bin"));
}

#[test]
fn test_best_below_threshold_is_not_persisted() {
    // A: Σr² = 60 -> 0.40, B: Σr² = 41 -> 0.59
    let catalog = Catalog::new(vec![
        scripted("A", [6.0, 4.0, 2.0, 2.0]),
        scripted("B", [5.0, 4.0, 0.0, 0.0]),
    ])
    .unwrap();
    let trainer = ModelTrainer::with_parts(
        ModelTrainerConfig::default(),
        catalog,
        RecordingStore::default(),
    );

    let err = trainer.train_split(&scripted_split()).unwrap_err();

    assert!(err.is_quality_gate());
    match err.root_cause() {
        ScorecastError::InsufficientModelQuality { best_model, score, threshold } => {
            assert_eq!(best_model, "B");
            assert_close(*score, 0.59);
            assert_eq!(*threshold, 0.6);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(trainer.store().saved().is_empty());
}

#[test]
fn test_tie_goes_to_first_in_catalog_order() {
    // A and B: Σr² = 20 -> 0.80, C: Σr² = 25 -> 0.75
    let catalog = Catalog::new(vec![
        scripted("A", [4.0, 2.0, 0.0, 0.0]),
        scripted("B", [4.0, 2.0, 0.0, 0.0]),
        scripted("C", [5.0, 0.0, 0.0, 0.0]),
    ])
    .unwrap();

    let result = select(&catalog, &scripted_split()).unwrap();

    assert_eq!(result.name, "A");
    assert_close(result.score, 0.80);
    let names: Vec<&str> = result.report.entries().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn test_unique_maximum_wins_regardless_of_order() {
    let forward = Catalog::new(vec![
        scripted("low", [5.0, 0.0, 0.0, 0.0]),
        scripted("high", [1.0, 0.0, 0.0, 0.0]),
    ])
    .unwrap();
    let reverse = Catalog::new(vec![
        scripted("high", [1.0, 0.0, 0.0, 0.0]),
        scripted("low", [5.0, 0.0, 0.0, 0.0]),
    ])
    .unwrap();

    assert_eq!(select(&forward, &scripted_split()).unwrap().name, "high");
    assert_eq!(select(&reverse, &scripted_split()).unwrap().name, "high");
}

#[test]
fn test_selected_score_is_report_maximum() {
    let catalog = Catalog::new(vec![
        scripted("A", [3.0, 0.0, 0.0, 0.0]),
        scripted("B", [1.0, 1.0, 0.0, 0.0]),
        scripted("C", [2.0, 2.0, 2.0, 0.0]),
    ])
    .unwrap();

    let result = select(&catalog, &scripted_split()).unwrap();
    let max = result
        .report
        .entries()
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(result.score, max);
    assert_eq!(result.report.get(&result.name), Some(max));
}

#[test]
fn test_score_equal_to_threshold_passes() {
    let split = scripted_split();
    let residuals = [4.0, 2.0, 0.0, 0.0];
    let expected = r2_score(
        split.test().target(),
        &(&scripted_target() + &Array1::from_vec(residuals.to_vec())),
    )
    .unwrap();

    let catalog = Catalog::new(vec![scripted("A", residuals)]).unwrap();
    let trainer = ModelTrainer::with_parts(
        ModelTrainerConfig::default().with_min_score(expected),
        catalog,
        RecordingStore::default(),
    );

    assert_eq!(trainer.train_split(&split).unwrap(), expected);
    assert_eq!(trainer.store().saved().len(), 1);
}

// ============================================================================
// Real regressors
// ============================================================================

/// y = 3*x0 - 2*x1 + 0.5*x2 + small deterministic wobble
fn linear_arrays(n: usize, offset: usize) -> Array2<f64> {
    let mut data = Array2::zeros((n, 4));
    for i in 0..n {
        let t = (i + offset) as f64;
        let x0 = (t * 0.37).sin() * 10.0;
        let x1 = (t * 0.11).cos() * 5.0;
        let x2 = (t % 7.0) - 3.0;
        data[[i, 0]] = x0;
        data[[i, 1]] = x1;
        data[[i, 2]] = x2;
        data[[i, 3]] = 3.0 * x0 - 2.0 * x1 + 0.5 * x2 + 0.01 * (t * 1.3).sin();
    }
    data
}

#[test]
fn test_all_nan_feature_fails_with_fit_error() {
    let mut train = linear_arrays(20, 0);
    train.column_mut(1).fill(f64::NAN);
    let split = Split::from_arrays(&train, &linear_arrays(10, 100)).unwrap();

    let catalog = Catalog::from_algorithms(&[Algorithm::LinearRegression, Algorithm::DecisionTree]).unwrap();
    let err = select(&catalog, &split).unwrap_err();

    match err.root_cause() {
        ScorecastError::FitError { model, source, .. } => {
            assert_eq!(model, "Linear Regression");
            assert!(matches!(source.as_deref(), Some(ScorecastError::DataError(_))));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_linear_regression_evaluation_is_repeatable() {
    let split = Split::from_arrays(&linear_arrays(40, 0), &linear_arrays(15, 200)).unwrap();
    let candidate = Candidate::new("Linear Regression", Algorithm::LinearRegression);
    let (train, test) = (split.train(), split.test());

    let (_, first) = evaluate(&candidate, train.features(), train.target(), test.features(), test.target()).unwrap();
    let (_, second) = evaluate(&candidate, train.features(), train.target(), test.features(), test.target()).unwrap();

    assert_eq!(first, second);
    assert!(first > 0.999);
}

#[test]
fn test_default_catalog_selection_is_repeatable() {
    let split = Split::from_arrays(&linear_arrays(60, 0), &linear_arrays(20, 500)).unwrap();
    let catalog = Catalog::default_regressors();

    let first = select(&catalog, &split).unwrap();
    let second = select(&catalog, &split).unwrap();

    assert_eq!(first.report.entries(), second.report.entries());
    assert_eq!(first.name, second.name);
    assert_eq!(first.report.len(), 8);
    assert_eq!(first.report.entries()[0].0, "RandomForest Regressor");
    assert_eq!(first.report.entries()[7].0, "XGBRegressor");
}

#[test]
fn test_trainer_persists_loadable_model() {
    let dir = tempfile::tempdir().unwrap();
    let train = linear_arrays(60, 0);
    let test = linear_arrays(20, 300);

    let trainer = ModelTrainer::new(ModelTrainerConfig::new(dir.path()));
    let score = trainer.initiate_model_trainer(&train, &test).unwrap();
    assert!(score >= 0.6);

    let model_path = dir.path().join("model.bin");
    let model: TrainedModel = load_object(&model_path).unwrap();
    let metadata = read_metadata(&model_path).unwrap();
    assert_eq!(metadata.name, model.algorithm().display_name());
    assert_eq!(metadata.metrics.get("r2").copied(), Some(score));
    let mse = metadata.metrics["mse"];
    assert!((metadata.metrics["rmse"] - mse.sqrt()).abs() < 1e-12);
    assert!(metadata.metrics["mae"] >= 0.0);

    // reloaded model scores identically
    let split = Split::from_arrays(&train, &test).unwrap();
    let reloaded = r2_score(split.test().target(), &model.predict(split.test().features()).unwrap()).unwrap();
    assert_eq!(reloaded, score);
}

//! Integration test: Full pipeline (CSV → transform → select → persist → reload)

use clap::Parser;
use ndarray::s;
use polars::prelude::*;
use scorecast::cli::{cmd_train, report_json, Cli, Commands};
use scorecast::export::load_object;
use scorecast::preprocessing::{DataPreprocessor, DataTransformation, DataTransformationConfig};
use scorecast::training::{
    Algorithm, Catalog, FileModelStore, ModelTrainer, ModelTrainerConfig, Predictor, Split, TrainedModel,
};
use scorecast::utils::{read_table, write_table};
use std::path::{Path, PathBuf};

const GENDERS: [&str; 2] = ["female", "male"];
const GROUPS: [&str; 5] = ["group A", "group B", "group C", "group D", "group E"];
const EDUCATION: [&str; 6] = [
    "some high school",
    "high school",
    "some college",
    "associate's degree",
    "bachelor's degree",
    "master's degree",
];
const LUNCH: [&str; 2] = ["free/reduced", "standard"];
const PREP: [&str; 2] = ["completed", "none"];

/// Student table where math tracks reading and writing closely
fn students(n: usize, offset: usize) -> DataFrame {
    let mut gender = Vec::with_capacity(n);
    let mut group = Vec::with_capacity(n);
    let mut education = Vec::with_capacity(n);
    let mut lunch = Vec::with_capacity(n);
    let mut prep = Vec::with_capacity(n);
    let mut math = Vec::with_capacity(n);
    let mut reading = Vec::with_capacity(n);
    let mut writing = Vec::with_capacity(n);

    for i in offset..offset + n {
        let t = i as f64;
        let r = 60.0 + 25.0 * (t * 0.73).sin();
        let w = r + 6.0 * (t * 1.91).cos();
        let l = i % 3 != 0;
        let p = i % 4 == 0;
        let m = 0.5 * r + 0.45 * w + if l { 4.0 } else { -4.0 } + if p { 3.0 } else { 0.0 } + 2.0 * (t * 2.7).sin();

        gender.push(GENDERS[i % 2]);
        group.push(GROUPS[i % 5]);
        education.push(EDUCATION[(i / 2) % 6]);
        lunch.push(LUNCH[l as usize]);
        prep.push(PREP[(!p) as usize]);
        math.push(m.round());
        reading.push(r.round());
        writing.push(w.round());
    }

    df!(
        "gender" => gender,
        "race_ethnicity" => group,
        "parental_level_of_education" => education,
        "lunch" => lunch,
        "test_preparation_course" => prep,
        "math_score" => math,
        "reading_score" => reading,
        "writing_score" => writing
    )
    .unwrap()
}

fn write_tables(dir: &Path) -> (PathBuf, PathBuf) {
    let train_path = dir.join("data").join("train.csv");
    let test_path = dir.join("data").join("test.csv");
    write_table(&mut students(90, 0), &train_path).unwrap();
    write_table(&mut students(30, 1000), &test_path).unwrap();
    (train_path, test_path)
}

#[test]
fn test_full_pipeline_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let (train_path, test_path) = write_tables(dir.path());
    let artifacts = dir.path().join("artifacts");

    let output = DataTransformation::new(DataTransformationConfig::new(&artifacts))
        .initiate_data_transformation(&train_path, &test_path)
        .unwrap();
    assert_eq!(output.train_array.nrows(), 90);
    assert_eq!(output.test_array.nrows(), 30);
    // 2 numerical + 2 + 5 + 6 + 2 + 2 one-hot columns + target
    assert_eq!(output.train_array.ncols(), 20);

    let trainer = ModelTrainer::new(ModelTrainerConfig::new(&artifacts));
    let score = trainer
        .initiate_model_trainer(&output.train_array, &output.test_array)
        .unwrap();
    assert!(score >= 0.6, "score {score}");

    // Reload both artifacts and reproduce the score on the raw test table
    let preprocessor: DataPreprocessor = load_object(&output.preprocessor_path).unwrap();
    let model: TrainedModel = load_object(artifacts.join("model.bin")).unwrap();

    let test_df = read_table(&test_path).unwrap();
    let x = preprocessor.transform(&test_df).unwrap();
    let n = x.ncols();
    assert_eq!(x, output.test_array.slice(s![.., ..n]));

    let y_true = output.test_array.column(n).to_owned();
    let y_pred = model.predict(&x).unwrap();
    let r2 = scorecast::training::r2_score(&y_true, &y_pred).unwrap();
    assert_eq!(r2, score);
}

#[test]
fn test_unreachable_threshold_fails_without_model() {
    let dir = tempfile::tempdir().unwrap();
    let (train_path, test_path) = write_tables(dir.path());
    let artifacts = dir.path().join("artifacts");

    let output = DataTransformation::new(DataTransformationConfig::new(&artifacts))
        .initiate_data_transformation(&train_path, &test_path)
        .unwrap();
    let trainer = ModelTrainer::new(ModelTrainerConfig::new(&artifacts).with_min_score(1.5));
    let err = trainer
        .initiate_model_trainer(&output.train_array, &output.test_array)
        .unwrap_err();

    assert!(err.is_quality_gate());
    assert!(!artifacts.join("model.bin").exists());
    assert!(artifacts.join("preprocessor.bin").exists());
}

#[test]
fn test_missing_input_table_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = DataTransformation::new(DataTransformationConfig::new(dir.path()))
        .initiate_data_transformation(dir.path().join("nope.csv"), dir.path().join("nope.csv"))
        .unwrap_err();
    assert!(err.to_string().starts_with("reading train table"));
}

#[test]
fn test_cli_run_alias_and_defaults() {
    let cli = Cli::try_parse_from(["scorecast", "run", "--train", "a.csv", "--test", "b.csv"]).unwrap();
    assert_eq!(cli.log_dir, PathBuf::from("logs"));
    match cli.command {
        Commands::Train { train, artifacts, min_score, parallel, json, .. } => {
            assert_eq!(train, PathBuf::from("a.csv"));
            assert_eq!(artifacts, PathBuf::from("artifacts"));
            assert_eq!(min_score, 0.6);
            assert!(!parallel);
            assert!(!json);
        }
        _ => panic!("expected the train command"),
    }

    assert!(Cli::try_parse_from(["scorecast", "transform", "--train", "a.csv"]).is_err());
}

#[test]
fn test_cli_train_command_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let (train_path, test_path) = write_tables(dir.path());
    let artifacts = dir.path().join("artifacts");

    cmd_train(&train_path, &test_path, &artifacts, 0.6, true, true).unwrap();

    assert!(artifacts.join("model.bin").exists());
    assert!(artifacts.join("preprocessor.bin").exists());
}

#[test]
fn test_json_report_names_winner_and_final_score() {
    let dir = tempfile::tempdir().unwrap();
    let (train_path, test_path) = write_tables(dir.path());
    let artifacts = dir.path().join("artifacts");

    let output = DataTransformation::new(DataTransformationConfig::new(&artifacts))
        .initiate_data_transformation(&train_path, &test_path)
        .unwrap();
    let catalog = Catalog::from_algorithms(&[Algorithm::LinearRegression, Algorithm::DecisionTree]).unwrap();
    let trainer = ModelTrainer::with_parts(ModelTrainerConfig::new(&artifacts), catalog, FileModelStore);
    let split = Split::from_arrays(&output.train_array, &output.test_array).unwrap();
    let report = trainer.train_with_report(&split).unwrap();

    let json: serde_json::Value = serde_json::from_str(&report_json(&report).unwrap()).unwrap();
    assert_eq!(json["best_model"], report.best_model.as_str());
    assert!((json["score"].as_f64().unwrap() - report.score).abs() < 1e-12);
    assert_eq!(json["metrics"]["n_samples"], split.test().n_samples());
    let scores = json["report"].as_object().unwrap();
    assert_eq!(scores.len(), 2);
    assert!(scores.contains_key("Linear Regression"));
}

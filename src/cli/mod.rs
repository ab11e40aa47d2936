//! Scorecast CLI Module
//!
//! Command-line interface for the transformation and training stages.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::preprocessing::{DataTransformation, DataTransformationConfig, TransformationOutput};
use crate::training::{ModelTrainer, ModelTrainerConfig, Split, TrainingReport, DEFAULT_MIN_SCORE};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_failed(detail: &str) {
    println!("{} {}", "failed".red(), dim(detail));
}

/// Close a running step with the marker matching `result`
fn step_end<T, E>(result: &Result<T, E>, detail: &str) -> &'static str {
    if result.is_ok() {
        step_done(detail);
        "done"
    } else {
        step_failed(detail);
        "failed"
    }
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "scorecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predict student math scores: preprocess, select the best regressor, persist it")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory for timestamped log files
    #[arg(long, global = true, default_value = "logs")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the preprocessor on the train table and transform both tables
    Transform {
        /// Train table (CSV)
        #[arg(long)]
        train: PathBuf,

        /// Test table (CSV)
        #[arg(long)]
        test: PathBuf,

        /// Artifacts directory
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
    },

    /// Transform both tables, then select, gate and persist the best model
    #[command(visible_alias = "run")]
    Train {
        /// Train table (CSV)
        #[arg(long)]
        train: PathBuf,

        /// Test table (CSV)
        #[arg(long)]
        test: PathBuf,

        /// Artifacts directory
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Minimum held-out R² for the winning model
        #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
        min_score: f64,

        /// Evaluate candidates in parallel
        #[arg(long)]
        parallel: bool,

        /// Print the training report as JSON
        #[arg(long)]
        json: bool,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn run_transformation(train: &Path, test: &Path, artifacts: &Path) -> anyhow::Result<TransformationOutput> {
    step_run("Transforming data");
    let start = Instant::now();
    let stage = DataTransformation::new(DataTransformationConfig::new(artifacts));
    let output = stage.initiate_data_transformation(train, test);
    let detail = match &output {
        Ok(output) => format!(
            "{} train × {} test rows, {} features in {:?}",
            output.train_array.nrows(),
            output.test_array.nrows(),
            output.train_array.ncols().saturating_sub(1),
            start.elapsed()
        ),
        Err(_) => format!("{:?}", start.elapsed()),
    };
    step_end(&output, &detail);
    Ok(output?)
}

pub fn cmd_transform(train: &Path, test: &Path, artifacts: &Path) -> anyhow::Result<()> {
    section("Transform");
    let output = run_transformation(train, test, artifacts)?;

    println!();
    kv("Preprocessor", &output.preprocessor_path.display().to_string());
    println!();
    Ok(())
}

pub fn cmd_train(
    train: &Path,
    test: &Path,
    artifacts: &Path,
    min_score: f64,
    parallel: bool,
    json: bool,
) -> anyhow::Result<()> {
    section("Train");
    let output = run_transformation(train, test, artifacts)?;

    step_run("Selecting the best model");
    let start = Instant::now();
    let config = ModelTrainerConfig::new(artifacts)
        .with_min_score(min_score)
        .with_parallel(parallel);
    let trainer = ModelTrainer::new(config);
    let split = Split::from_arrays(&output.train_array, &output.test_array)?;
    let report = trainer.train_with_report(&split);
    step_end(&report, &format!("{:?}", start.elapsed()));

    let report = report?;
    if json {
        println!("{}", report_json(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// The whole training report as pretty JSON
pub fn report_json(report: &TrainingReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

fn print_report(report: &TrainingReport) {
    println!();
    println!("  {:<28} {:>10}", muted("Model"), muted("R²"));
    println!("  {}", dim(&"─".repeat(40)));
    for (name, score) in report.report.entries() {
        let line = format!("  {:<28} {:>10.4}", name, score);
        if *name == report.best_model {
            println!("{}", line.white().bold());
        } else {
            println!("{}", line);
        }
    }
    println!("  {}", dim(&"─".repeat(40)));

    println!();
    println!(
        "  {} {} {} {:.4}",
        ok("best"),
        report.best_model.white().bold(),
        muted("R²:"),
        report.score
    );
    kv("RMSE", &format!("{:.4}", report.metrics.rmse));
    kv("MAE", &format!("{:.4}", report.metrics.mae));
    kv("Model", &report.model_path.display().to_string());
    kv("Time", &format!("{:.3}s", report.training_time_secs));
    println!();
}

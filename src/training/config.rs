//! Model trainer configuration

use super::selector::SelectorConfig;
use crate::error::{Result, ScorecastError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Minimum held-out R² a winner must reach
pub const DEFAULT_MIN_SCORE: f64 = 0.6;

/// File name of the persisted winning model
pub const MODEL_FILE_NAME: &str = "model.bin";

/// Where the trainer writes and what it accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTrainerConfig {
    /// Root directory for artifacts
    pub artifacts_dir: PathBuf,
    /// Destination of the winning fitted model
    pub trained_model_file_path: PathBuf,
    /// Quality gate threshold (strict `<` fails)
    pub min_score: f64,
    /// Candidate evaluation settings
    pub selector: SelectorConfig,
}

impl Default for ModelTrainerConfig {
    fn default() -> Self {
        Self::new("artifacts")
    }
}

impl ModelTrainerConfig {
    /// Config rooted at `artifacts_dir`
    pub fn new(artifacts_dir: impl AsRef<Path>) -> Self {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        Self {
            trained_model_file_path: artifacts_dir.join(MODEL_FILE_NAME),
            artifacts_dir,
            min_score: DEFAULT_MIN_SCORE,
            selector: SelectorConfig::default(),
        }
    }

    /// Override the model destination
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trained_model_file_path = path.into();
        self
    }

    /// Set the quality gate threshold
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    /// Evaluate candidates on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.selector.parallel = parallel;
        self
    }

    /// Per-candidate wall-clock budget
    pub fn with_candidate_budget(mut self, budget: Duration) -> Self {
        self.selector.candidate_budget = Some(budget);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_score.is_finite() {
            return Err(ScorecastError::ConfigError(format!(
                "min_score must be finite, got {}",
                self.min_score
            )));
        }
        if self.trained_model_file_path.as_os_str().is_empty() {
            return Err(ScorecastError::ConfigError(
                "trained_model_file_path is empty".to_string(),
            ));
        }
        Ok(())
    }
}

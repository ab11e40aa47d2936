//! Data transformation configuration

use super::ImputeStrategy;
use crate::error::{Result, ScorecastError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the persisted preprocessor
pub const PREPROCESSOR_FILE_NAME: &str = "preprocessor.bin";

/// Which columns to transform, how, and where the preprocessor is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformationConfig {
    /// Continuous inputs: imputed then standardized
    pub numerical_columns: Vec<String>,

    /// Categorical inputs: imputed, one-hot encoded, then scaled without centering
    pub categorical_columns: Vec<String>,

    /// Column appended as the last column of each output array
    pub target_column: String,

    /// Strategy for missing numeric values
    pub numeric_impute_strategy: ImputeStrategy,

    /// Strategy for missing categorical values
    pub categorical_impute_strategy: ImputeStrategy,

    pub artifacts_dir: PathBuf,

    /// Destination of the fitted preprocessor
    pub preprocessor_obj_file_path: PathBuf,
}

impl Default for DataTransformationConfig {
    fn default() -> Self {
        Self::new("artifacts")
    }
}

impl DataTransformationConfig {
    /// Student-performance columns, rooted at `artifacts_dir`
    pub fn new(artifacts_dir: impl AsRef<Path>) -> Self {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        Self {
            numerical_columns: vec!["writing_score".into(), "reading_score".into()],
            categorical_columns: vec![
                "gender".into(),
                "race_ethnicity".into(),
                "parental_level_of_education".into(),
                "lunch".into(),
                "test_preparation_course".into(),
            ],
            target_column: "math_score".into(),
            numeric_impute_strategy: ImputeStrategy::Median,
            categorical_impute_strategy: ImputeStrategy::MostFrequent,
            preprocessor_obj_file_path: artifacts_dir.join(PREPROCESSOR_FILE_NAME),
            artifacts_dir,
        }
    }

    pub fn with_numerical_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.numerical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categorical_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.categorical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = column.into();
        self
    }

    /// Override the preprocessor destination
    pub fn with_preprocessor_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preprocessor_obj_file_path = path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.numerical_columns.is_empty() && self.categorical_columns.is_empty() {
            return Err(ScorecastError::ConfigError("no input columns configured".to_string()));
        }
        let inputs = self.numerical_columns.iter().chain(&self.categorical_columns);
        let mut seen = std::collections::HashSet::new();
        for col in inputs {
            if col == &self.target_column {
                return Err(ScorecastError::ConfigError(format!(
                    "target column '{}' is also listed as an input",
                    col
                )));
            }
            if !seen.insert(col.as_str()) {
                return Err(ScorecastError::ConfigError(format!("column '{}' listed twice", col)));
            }
        }
        Ok(())
    }
}

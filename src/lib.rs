//! Scorecast - student math-score regression
//!
//! This crate turns the student-performance tables into numeric arrays,
//! evaluates a fixed catalog of regressors on a held-out split, keeps the
//! best one when it clears a quality bar, and persists it.
//!
//! # Modules
//!
//! - [`preprocessing`] - Imputation, scaling, one-hot encoding and the
//!   transformation stage
//! - [`training`] - Regressors, evaluation, selection and the model trainer
//! - [`export`] - Artifact persistence with metadata and checksums
//! - [`utils`] - CSV loading and DataFrame to array conversion
//! - [`logging`] - Timestamped log files
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use scorecast::prelude::*;
//!
//! # fn main() -> scorecast::Result<()> {
//! let output = DataTransformation::default()
//!     .initiate_data_transformation("data/train.csv", "data/test.csv")?;
//! let r2 = ModelTrainer::default()
//!     .initiate_model_trainer(&output.train_array, &output.test_array)?;
//! println!("R² = {r2:.4}");
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod training;

// Utilities
pub mod export;
pub mod logging;
pub mod utils;

// Services
pub mod cli;

pub use error::{Result, ResultExt, ScorecastError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, ResultExt, ScorecastError};

    // Preprocessing
    pub use crate::preprocessing::{
        DataPreprocessor, DataTransformation, DataTransformationConfig, TransformationOutput,
    };

    // Training
    pub use crate::training::{
        evaluate, r2_score, select, Algorithm, Candidate, Catalog, Dataset, Estimator,
        ModelTrainer, ModelTrainerConfig, Predictor, Regressor, ScoreReport, SelectionResult,
        Split, TrainedModel,
    };

    // Export
    pub use crate::export::{load_object, save_object, ModelMetadata};

    // Data loading
    pub use crate::utils::read_table;

    // Logging
    pub use crate::logging::{init_file_logging, LogGuard};
}

//! Data preprocessing module
//!
//! Turns the raw student-performance tables into numeric arrays:
//! - Missing value imputation (median, most frequent)
//! - Standard scaling, optionally without centering
//! - One-hot encoding with sorted categories
//! - A two-branch column pipeline ([`DataPreprocessor`]) and the stage that
//!   fits, applies and persists it ([`DataTransformation`])

mod config;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;
mod transformation;

pub use config::{DataTransformationConfig, PREPROCESSOR_FILE_NAME};
pub use encoder::OneHotEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::DataPreprocessor;
pub use scaler::StandardScaler;
pub use transformation::{DataTransformation, TransformationOutput};

//! Data transformation stage: raw train/test tables to numeric arrays

use super::config::DataTransformationConfig;
use super::pipeline::DataPreprocessor;
use crate::error::{Result, ResultExt, ScorecastError};
use crate::export::{save_object, ModelMetadata};
use crate::utils::{column_to_array, read_table};
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, Span};

/// Arrays ready for training; the last column of each is the target
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    pub train_array: Array2<f64>,
    pub test_array: Array2<f64>,
    pub preprocessor_path: PathBuf,
}

/// Fits the preprocessor on the train table, applies it to both tables and
/// persists it
pub struct DataTransformation {
    config: DataTransformationConfig,
    span: Span,
}

impl Default for DataTransformation {
    fn default() -> Self {
        Self::new(DataTransformationConfig::default())
    }
}

impl DataTransformation {
    pub fn new(config: DataTransformationConfig) -> Self {
        Self {
            config,
            span: info_span!("data_transformation"),
        }
    }

    pub fn config(&self) -> &DataTransformationConfig {
        &self.config
    }

    /// Unfitted preprocessor for the configured columns
    pub fn get_data_transformer_object(&self) -> DataPreprocessor {
        DataPreprocessor::from_config(&self.config)
    }

    /// Read both CSV tables and transform them
    pub fn initiate_data_transformation(
        &self,
        train_path: impl AsRef<Path>,
        test_path: impl AsRef<Path>,
    ) -> Result<TransformationOutput> {
        let _enter = self.span.enter();
        let (train_path, test_path) = (train_path.as_ref(), test_path.as_ref());

        let train_df = read_table(train_path)
            .with_context(|| format!("reading train table {}", train_path.display()))?;
        let test_df = read_table(test_path)
            .with_context(|| format!("reading test table {}", test_path.display()))?;
        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            "read train and test data completed"
        );

        self.transform_frames(&train_df, &test_df)
    }

    /// Transform already loaded tables
    pub fn transform_frames(&self, train_df: &DataFrame, test_df: &DataFrame) -> Result<TransformationOutput> {
        let _enter = self.span.enter();
        self.config.validate().context("validating transformation configuration")?;

        let target = self.config.target_column.as_str();
        let train_target = column_to_array(train_df, target).context("reading train target")?;
        let test_target = column_to_array(test_df, target).context("reading test target")?;

        info!("obtaining preprocessor object");
        let mut preprocessor = self.get_data_transformer_object();

        info!("applying preprocessor object on training and test dataframes");
        let train_features = preprocessor
            .fit_transform(train_df)
            .context("fitting preprocessor on train data")?;
        let test_features = preprocessor
            .transform(test_df)
            .context("transforming test data")?;

        let train_array = append_target(train_features, train_target.insert_axis(Axis(1)))?;
        let test_array = append_target(test_features, test_target.insert_axis(Axis(1)))?;

        let path = &self.config.preprocessor_obj_file_path;
        let metadata = ModelMetadata::new("preprocessor")
            .with_model_type(std::any::type_name::<DataPreprocessor>())
            .with_features(preprocessor.feature_names().to_vec());
        save_object(&preprocessor, path, metadata)
            .with_context(|| format!("saving preprocessor to {}", path.display()))?;
        info!(
            path = %path.display(),
            features = preprocessor.n_features_out(),
            "saved preprocessing object"
        );

        Ok(TransformationOutput {
            train_array,
            test_array,
            preprocessor_path: path.clone(),
        })
    }
}

fn append_target(features: Array2<f64>, target: Array2<f64>) -> Result<Array2<f64>> {
    concatenate(Axis(1), &[features.view(), target.view()]).map_err(|e| ScorecastError::ShapeError {
        expected: format!("{} target rows", features.nrows()),
        actual: e.to_string(),
    })
}

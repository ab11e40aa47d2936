//! Column-transform preprocessing pipeline

use super::config::DataTransformationConfig;
use super::encoder::OneHotEncoder;
use super::imputer::{ImputeStrategy, Imputer};
use super::scaler::StandardScaler;
use crate::error::{Result, ResultExt, ScorecastError};
use crate::utils::columns_to_array;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Two-branch column transformer.
///
/// Numerical columns: impute, then standardize.
/// Categorical columns: impute, one-hot encode, then scale without centering.
///
/// The output matrix holds the numerical block first, then the one-hot block,
/// in the order given by [`DataPreprocessor::feature_names`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPreprocessor {
    numerical_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_imputer: Imputer,
    categorical_imputer: Imputer,
    numeric_scaler: StandardScaler,
    encoder: OneHotEncoder,
    categorical_scaler: StandardScaler,
    feature_names: Vec<String>,
    is_fitted: bool,
    /// Seconds spent in the last fit call
    fit_time: Option<f64>,
}

impl DataPreprocessor {
    pub fn new<S: Into<String>>(
        numerical_columns: impl IntoIterator<Item = S>,
        categorical_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            numerical_columns: numerical_columns.into_iter().map(Into::into).collect(),
            categorical_columns: categorical_columns.into_iter().map(Into::into).collect(),
            numeric_imputer: Imputer::new(ImputeStrategy::Median),
            categorical_imputer: Imputer::new(ImputeStrategy::MostFrequent),
            numeric_scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
            categorical_scaler: StandardScaler::new().with_mean(false),
            feature_names: Vec::new(),
            is_fitted: false,
            fit_time: None,
        }
    }

    /// Columns and imputation strategies taken from `config`
    pub fn from_config(config: &DataTransformationConfig) -> Self {
        let mut preprocessor = Self::new(
            config.numerical_columns.iter().cloned(),
            config.categorical_columns.iter().cloned(),
        );
        preprocessor.numeric_imputer = Imputer::new(config.numeric_impute_strategy.clone());
        preprocessor.categorical_imputer = Imputer::new(config.categorical_impute_strategy.clone());
        preprocessor
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn numerical_columns(&self) -> &[String] {
        &self.numerical_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Output column names; empty until fitted
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features_out(&self) -> usize {
        self.feature_names.len()
    }

    pub fn fit_time(&self) -> Option<f64> {
        self.fit_time
    }

    /// Learn imputation values, scaling parameters and categories from `df`
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();
        let numerical: Vec<&str> = self.numerical_columns.iter().map(String::as_str).collect();
        let categorical: Vec<&str> = self.categorical_columns.iter().map(String::as_str).collect();

        let imputed = self
            .numeric_imputer
            .fit_transform(df, &numerical)
            .context("imputing numerical columns")?;
        let imputed = self
            .categorical_imputer
            .fit_transform(&imputed, &categorical)
            .context("imputing categorical columns")?;

        self.numeric_scaler
            .fit(&imputed, &numerical)
            .context("scaling numerical columns")?;

        let encoded = self
            .encoder
            .fit_transform(&imputed, &categorical)
            .context("encoding categorical columns")?;
        let onehot_names = self.encoder.feature_names();
        let onehot: Vec<&str> = onehot_names.iter().map(String::as_str).collect();
        self.categorical_scaler
            .fit(&encoded, &onehot)
            .context("scaling categorical columns")?;

        self.feature_names = self
            .numerical_columns
            .iter()
            .cloned()
            .chain(onehot_names)
            .collect();
        self.is_fitted = true;
        self.fit_time = Some(start.elapsed().as_secs_f64());

        debug!(
            numerical = self.numerical_columns.len(),
            categorical = self.categorical_columns.len(),
            features_out = self.feature_names.len(),
            "preprocessor fitted"
        );
        Ok(self)
    }

    /// Apply the fitted pipeline and return the feature matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(ScorecastError::ModelNotFitted);
        }

        let frame = self.numeric_imputer.transform(df)?;
        let frame = self.categorical_imputer.transform(&frame)?;
        let frame = self.numeric_scaler.transform(&frame)?;
        let frame = self.encoder.transform(&frame)?;
        let frame = self.categorical_scaler.transform(&frame)?;

        columns_to_array(&frame, self.feature_names.as_slice())
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }
}

//! Feature scaling

use crate::error::{Result, ScorecastError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted parameters for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    center: f64,
    scale: f64,
}

/// Standard scaler: `(x - mean) / std` using the population std.
///
/// With `with_mean` disabled the column is only divided by its std, which
/// keeps sparse one-hot blocks non-negative. A constant column scales by 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    with_mean: bool,
    params: Vec<(String, ScalerParams)>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Centering and scaling
    pub fn new() -> Self {
        Self {
            with_mean: true,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.with_mean = with_mean;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fitted `(mean, std)` of a column
    pub fn params_for(&self, column: &str) -> Option<(f64, f64)> {
        self.params
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, p)| (p.center, p.scale))
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut params = Vec::with_capacity(columns.len());
        for col_name in columns {
            let series = df
                .column(col_name)
                .map_err(|_| ScorecastError::FeatureNotFound(col_name.to_string()))?
                .as_materialized_series();
            params.push((col_name.to_string(), Self::compute_params(col_name, series)?));
        }

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Scale every fitted column; other columns pass through
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(ScorecastError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, params) in &self.params {
            let series = df
                .column(col_name)
                .map_err(|_| ScorecastError::FeatureNotFound(col_name.clone()))?
                .as_materialized_series();
            let scaled = self.scale_series(series, params)?;
            result.with_column(scaled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    fn compute_params(col_name: &str, series: &Series) -> Result<ScalerParams> {
        let numeric = series.cast(&DataType::Float64)?;
        let ca = numeric.f64()?;
        if ca.null_count() > 0 {
            return Err(ScorecastError::PreprocessingError(format!(
                "column '{}' has missing values; impute before scaling",
                col_name
            )));
        }

        let mean = ca.mean().ok_or_else(|| {
            ScorecastError::PreprocessingError(format!("column '{}' is empty", col_name))
        })?;
        let std = ca.std(0).unwrap_or(0.0);

        Ok(ScalerParams {
            center: mean,
            scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
        })
    }

    fn scale_series(&self, series: &Series, params: &ScalerParams) -> Result<Series> {
        let numeric = series.cast(&DataType::Float64)?;
        let center = if self.with_mean { params.center } else { 0.0 };
        let scaled: Float64Chunked = numeric
            .f64()?
            .into_iter()
            .map(|opt| opt.map(|v| (v - center) / params.scale))
            .collect();
        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

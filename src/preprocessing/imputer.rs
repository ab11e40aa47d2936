//! Missing value imputation strategies

use crate::error::{Result, ScorecastError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with mean (numeric only)
    Mean,
    /// Replace with median (numeric only)
    Median,
    /// Replace with mode; ties resolve to the smallest value
    MostFrequent,
    /// Replace with a constant value
    Constant(f64),
    /// Replace with a constant string (categorical)
    ConstantString(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ImputeValue {
    Numeric(f64),
    String(String),
}

/// Imputer for handling missing values, fitted per column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: Vec<(String, ImputeValue)>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut fill_values = Vec::with_capacity(columns.len());
        for col_name in columns {
            let series = df
                .column(col_name)
                .map_err(|_| ScorecastError::FeatureNotFound(col_name.to_string()))?
                .as_materialized_series();

            let fill_value = self.compute_fill_value(series).map_err(|e| {
                ScorecastError::PreprocessingError(format!("imputing '{}': {}", col_name, e))
            })?;
            fill_values.push((col_name.to_string(), fill_value));
        }

        self.fill_values = fill_values;
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace nulls in every fitted column; other columns pass through
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(ScorecastError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, fill_value) in &self.fill_values {
            let series = df
                .column(col_name)
                .map_err(|_| ScorecastError::FeatureNotFound(col_name.clone()))?
                .as_materialized_series();
            let filled = Self::fill_series(series, fill_value)?;
            result.with_column(filled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    fn compute_fill_value(&self, series: &Series) -> Result<ImputeValue> {
        let empty = || ScorecastError::DataError("column has no observed values".to_string());

        match &self.strategy {
            ImputeStrategy::Mean => {
                let numeric = series.cast(&DataType::Float64)?;
                let mean = numeric.f64()?.mean().ok_or_else(empty)?;
                Ok(ImputeValue::Numeric(mean))
            }
            ImputeStrategy::Median => {
                let numeric = series.cast(&DataType::Float64)?;
                let median = numeric.f64()?.median().ok_or_else(empty)?;
                Ok(ImputeValue::Numeric(median))
            }
            ImputeStrategy::MostFrequent => {
                if is_numeric_dtype(series.dtype()) {
                    let numeric = series.cast(&DataType::Float64)?;
                    let mut counts: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
                    for val in numeric.f64()?.into_iter().flatten() {
                        counts.entry(val.to_bits()).or_insert((val, 0)).1 += 1;
                    }
                    let mode = counts
                        .into_values()
                        .reduce(|best, cur| {
                            if cur.1 > best.1 || (cur.1 == best.1 && cur.0 < best.0) {
                                cur
                            } else {
                                best
                            }
                        })
                        .map(|(v, _)| v)
                        .ok_or_else(empty)?;
                    Ok(ImputeValue::Numeric(mode))
                } else {
                    let strings = series.cast(&DataType::String)?;
                    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
                    for val in strings.str()?.into_iter().flatten() {
                        *counts.entry(val.to_string()).or_insert(0) += 1;
                    }
                    // BTreeMap iterates in sorted order, so the first max is the smallest key
                    let max_count = counts.values().copied().max().ok_or_else(empty)?;
                    let mode = counts
                        .into_iter()
                        .find(|(_, c)| *c == max_count)
                        .map(|(k, _)| k)
                        .ok_or_else(empty)?;
                    Ok(ImputeValue::String(mode))
                }
            }
            ImputeStrategy::Constant(val) => Ok(ImputeValue::Numeric(*val)),
            ImputeStrategy::ConstantString(val) => Ok(ImputeValue::String(val.clone())),
        }
    }

    fn fill_series(series: &Series, fill_value: &ImputeValue) -> Result<Series> {
        match fill_value {
            ImputeValue::Numeric(val) => {
                let numeric = series.cast(&DataType::Float64)?;
                let filled: Float64Chunked = numeric
                    .f64()?
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*val)))
                    .collect();
                Ok(filled.with_name(series.name().clone()).into_series())
            }
            ImputeValue::String(val) => {
                let strings = series.cast(&DataType::String)?;
                let filled: StringChunked = strings
                    .str()?
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(val.as_str())))
                    .collect();
                Ok(filled.with_name(series.name().clone()).into_series())
            }
        }
    }
}

/// Integer and float dtypes
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

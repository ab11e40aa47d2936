//! One-hot encoding of categorical columns

use crate::error::{Result, ScorecastError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder.
///
/// Each fitted column is replaced by one `f64` indicator column per category,
/// named `{column}_{category}`, with categories in sorted order. A category
/// not seen during `fit` is rejected by `transform`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Sorted categories learned for `column`
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cats)| cats.as_slice())
    }

    /// Output column names in emission order
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(col, cats)| cats.iter().map(move |cat| format!("{}_{}", col, cat)))
            .collect()
    }

    /// Learn the category set of every column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut categories = Vec::with_capacity(columns.len());
        for col_name in columns {
            let series = df
                .column(col_name)
                .map_err(|_| ScorecastError::FeatureNotFound(col_name.to_string()))?
                .as_materialized_series();
            let strings = series.cast(&DataType::String)?;

            let mut seen = BTreeSet::new();
            for val in strings.str()?.into_iter() {
                match val {
                    Some(v) => {
                        seen.insert(v.to_string());
                    }
                    None => {
                        return Err(ScorecastError::PreprocessingError(format!(
                            "column '{}' has missing values; impute before encoding",
                            col_name
                        )))
                    }
                }
            }
            if seen.is_empty() {
                return Err(ScorecastError::PreprocessingError(format!(
                    "column '{}' has no categories",
                    col_name
                )));
            }
            categories.push((col_name.to_string(), seen.into_iter().collect()));
        }

        self.categories = categories;
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column by its indicator columns
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(ScorecastError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, cats) in &self.categories {
            let series = df
                .column(col_name)
                .map_err(|_| ScorecastError::FeatureNotFound(col_name.clone()))?
                .as_materialized_series();
            let strings = series.cast(&DataType::String)?;
            let ca = strings.str()?;

            let mut indices = Vec::with_capacity(ca.len());
            for (row, val) in ca.into_iter().enumerate() {
                let val = val.ok_or_else(|| {
                    ScorecastError::PreprocessingError(format!(
                        "missing value in column '{}' at row {}",
                        col_name, row
                    ))
                })?;
                let idx = cats.binary_search_by(|c| c.as_str().cmp(val)).map_err(|_| {
                    ScorecastError::PreprocessingError(format!(
                        "unknown category '{}' in column '{}'",
                        val, col_name
                    ))
                })?;
                indices.push(idx);
            }

            for (cat_idx, cat) in cats.iter().enumerate() {
                let values: Vec<f64> = indices
                    .iter()
                    .map(|&i| if i == cat_idx { 1.0 } else { 0.0 })
                    .collect();
                let name = format!("{}_{}", col_name, cat);
                result.with_column(Series::new(name.into(), values))?;
            }
            result = result.drop(col_name)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_indicator_columns() {
        let df = df!("lunch" => &["standard", "free/reduced", "standard"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        let result = encoder.fit_transform(&df, &["lunch"]).unwrap();

        assert_eq!(
            encoder.feature_names(),
            vec!["lunch_free/reduced".to_string(), "lunch_standard".to_string()]
        );
        assert!(result.column("lunch").is_err());

        let standard: Vec<f64> = result
            .column("lunch_standard")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(standard, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let train = df!("gender" => &["female", "male"]).unwrap();
        let test = df!("gender" => &["other"]).unwrap();

        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["gender"]).unwrap();
        let err = encoder.transform(&test).unwrap_err();
        assert!(err.to_string().contains("unknown category 'other'"));
    }

    #[test]
    fn test_column_count_is_sum_of_categories() {
        let df = df!(
            "a" => &["x", "y", "z", "x"],
            "b" => &["p", "q", "p", "p"]
        )
        .unwrap();
        let mut encoder = OneHotEncoder::new();
        let result = encoder.fit_transform(&df, &["a", "b"]).unwrap();
        assert_eq!(result.width(), 5);
        assert_eq!(encoder.categories("b").unwrap(), &["p".to_string(), "q".to_string()]);
    }
}

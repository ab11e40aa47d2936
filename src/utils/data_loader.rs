//! Data loading utilities

use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Read a headed CSV table
pub fn read_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()?;

    if df.height() == 0 {
        return Err(ScorecastError::DataError(format!(
            "{} has no data rows",
            path.display()
        )));
    }
    Ok(df)
}

/// Write a DataFrame as a headed CSV table
pub fn write_table(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Column values as `f64`; nulls are an error
pub fn column_to_array(df: &DataFrame, column: &str) -> Result<Array1<f64>> {
    let series = df
        .column(column)
        .map_err(|_| ScorecastError::FeatureNotFound(column.to_string()))?
        .as_materialized_series();
    let numeric = series.cast(&DataType::Float64)?;
    let ca = numeric.f64()?;
    if ca.null_count() > 0 {
        return Err(ScorecastError::DataError(format!(
            "column '{}' has {} missing or non-numeric values",
            column,
            ca.null_count()
        )));
    }
    Ok(ca.into_no_null_iter().collect())
}

/// Stack the given columns, in order, into a row-major matrix
pub fn columns_to_array<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<Array2<f64>> {
    let mut out = Array2::zeros((df.height(), columns.len()));
    for (j, column) in columns.iter().enumerate() {
        let values = column_to_array(df, column.as_ref())?;
        out.column_mut(j).assign(&values);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "lunch,reading_score,math_score").unwrap();
        writeln!(file, "standard,72,70").unwrap();
        writeln!(file, "free/reduced,90,65").unwrap();
        writeln!(file, "standard,95,88").unwrap();
        file
    }

    #[test]
    fn test_read_table() {
        let file = create_test_csv();
        let df = read_table(file.path()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_table("no/such/table.csv").unwrap_err();
        assert!(matches!(err, ScorecastError::IoError(_)));
    }

    #[test]
    fn test_columns_to_array_keeps_order() {
        let file = create_test_csv();
        let df = read_table(file.path()).unwrap();
        let arr = columns_to_array(&df, &["math_score", "reading_score"]).unwrap();
        assert_eq!(arr.shape(), &[3, 2]);
        assert_eq!(arr[[1, 0]], 65.0);
        assert_eq!(arr[[1, 1]], 90.0);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut df = df!("a" => &[1.0, 2.0], "b" => &["x", "y"]).unwrap();
        write_table(&mut df, &path).unwrap();
        let loaded = read_table(&path).unwrap();
        assert_eq!(loaded.shape(), (2, 2));
    }
}

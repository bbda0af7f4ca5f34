//! CSV reading for the static reference tables

use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Read a headed CSV file into a DataFrame
pub fn read_csv<P: AsRef<Path>>(csv_path: P) -> Result<DataFrame, PolarsError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(csv_path.as_ref().to_path_buf()))?
        .finish()
}

/// Read headed CSV text held in memory
pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame, PolarsError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
}

/// Integer column values, casting whatever dtype polars inferred
pub fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, PolarsError> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

/// String column values; an all-empty column is inferred as null and cast here
pub fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, PolarsError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

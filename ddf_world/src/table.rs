//! Helpers for reading string columns out of polars frames.

use polars::prelude::*;

use crate::error::{DdfError, DdfResult};

/// Get a column, reporting the table it was expected in when missing.
pub fn required_column<'a>(df: &'a DataFrame, table: &str, column: &str) -> DdfResult<&'a Series> {
    df.column(column).map_err(|_| DdfError::MissingColumn {
        table: table.to_string(),
        column: column.to_string(),
    })
}

/// Values of a column as owned strings, casting non-string columns first.
pub fn string_values(df: &DataFrame, table: &str, column: &str) -> DdfResult<Vec<Option<String>>> {
    let series = required_column(df, table, column)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Like `string_values`, but an absent column yields all-null values.
pub fn optional_string_values(df: &DataFrame, column: &str) -> DdfResult<Vec<Option<String>>> {
    if df.get_column_names().contains(&column) {
        string_values(df, "", column)
    } else {
        Ok(vec![None; df.height()])
    }
}

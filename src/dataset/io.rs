use super::{
    Creature, Dataset, HEIGHT_COLUMN, IDENTITY_COLUMNS, NAME_COLUMN, TOTAL_COLUMN, TYPE_COLUMN,
    WEIGHT_COLUMN,
};
use crate::error::{DashboardError, Result};
use polars::prelude::*;
use std::path::Path;

/// Reads the delimited file at `path` into a polars frame.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(DashboardError::Load(format!(
            "file not found: {}",
            path.display()
        )));
    }

    LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_has_header(true)
        .finish()
        .and_then(LazyFrame::collect)
        .map_err(|e| DashboardError::Load(format!("{}: {e}", path.display())))
}

/// Converts a loaded frame into typed rows.
///
/// Every column other than the identity columns (and the reserved total) is a
/// statistic, kept in file order.
pub fn frame_to_dataset(df: &DataFrame) -> Result<Dataset> {
    let present: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
    for required in IDENTITY_COLUMNS {
        if !present.contains(&required) {
            return Err(DashboardError::Load(format!(
                "missing required column '{required}'"
            )));
        }
    }

    let statistic_columns: Vec<String> = present
        .iter()
        .copied()
        .filter(|c| !IDENTITY_COLUMNS.contains(c) && *c != TOTAL_COLUMN)
        .map(str::to_owned)
        .collect();

    let names = string_column(df, NAME_COLUMN)?;
    let types = string_column(df, TYPE_COLUMN)?;
    let heights = numeric_column(df, HEIGHT_COLUMN)?;
    let weights = numeric_column(df, WEIGHT_COLUMN)?;
    let stat_values = statistic_columns
        .iter()
        .map(|c| numeric_column(df, c))
        .collect::<Result<Vec<_>>>()?;

    let rows = names
        .into_iter()
        .zip(types)
        .zip(heights.into_iter().zip(weights))
        .enumerate()
        .map(|(i, ((name, type_name), (height, weight)))| {
            let stats = stat_values
                .iter()
                .map(|values| values.get(i).copied().unwrap_or(f64::NAN))
                .collect();
            Creature::new(name, type_name, height, weight, stats)
        })
        .collect();

    Dataset::from_rows(statistic_columns, rows)
}

/// Canonical frame of validated rows: identity columns, statistics in order,
/// then the derived total.
pub(super) fn rows_to_frame(statistic_columns: &[String], rows: &[Creature]) -> Result<DataFrame> {
    let mut columns = vec![
        Column::new(
            NAME_COLUMN.into(),
            rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            TYPE_COLUMN.into(),
            rows.iter().map(|r| r.type_name.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            HEIGHT_COLUMN.into(),
            rows.iter().map(|r| r.height).collect::<Vec<f64>>(),
        ),
        Column::new(
            WEIGHT_COLUMN.into(),
            rows.iter().map(|r| r.weight).collect::<Vec<f64>>(),
        ),
    ];
    for (i, statistic) in statistic_columns.iter().enumerate() {
        columns.push(Column::new(
            statistic.as_str().into(),
            rows.iter()
                .map(|r| r.stat(i).unwrap_or(f64::NAN))
                .collect::<Vec<f64>>(),
        ));
    }
    columns.push(Column::new(
        TOTAL_COLUMN.into(),
        rows.iter().map(|r| r.bst).collect::<Vec<f64>>(),
    ));
    Ok(DataFrame::new(columns)?)
}

fn materialized<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(Column::as_materialized_series)
        .map_err(|_| DashboardError::Load(format!("missing required column '{name}'")))
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = materialized(df, name)?.cast(&DataType::String)?;
    series
        .str()?
        .into_iter()
        .enumerate()
        .map(|(i, value)| value.map(str::to_owned).ok_or_else(|| empty_value(name, i)))
        .collect()
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = materialized(df, name)?
        .strict_cast(&DataType::Float64)
        .map_err(|e| DashboardError::Load(format!("column '{name}' is not numeric: {e}")))?;
    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, value)| value.ok_or_else(|| empty_value(name, i)))
        .collect()
}

fn empty_value(column: &str, row: usize) -> DashboardError {
    // +2: one for the header line, one for 1-based numbering
    DashboardError::Load(format!(
        "column '{column}' has an empty value on line {}",
        row + 2
    ))
}

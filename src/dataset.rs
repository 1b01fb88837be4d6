//! The in-memory Pokédex table.
//!
//! A [`Dataset`] is loaded once at startup and never mutated afterwards. Every
//! chart and table in the dashboard is a derived view over it (see
//! [`crate::engine`]).

use crate::error::{DashboardError, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

mod io;

pub use io::{frame_to_dataset, read_frame};

pub const NAME_COLUMN: &str = "Name";
pub const TYPE_COLUMN: &str = "Type";
pub const HEIGHT_COLUMN: &str = "Height";
pub const WEIGHT_COLUMN: &str = "Weight";

/// Columns that identify or describe a creature rather than rate it.
pub const IDENTITY_COLUMNS: [&str; 4] = [NAME_COLUMN, TYPE_COLUMN, HEIGHT_COLUMN, WEIGHT_COLUMN];

/// Name of the derived base stat total. Reserved: a source column with this
/// name is ignored and the total is recomputed from the statistic columns.
pub const TOTAL_COLUMN: &str = "BST";

/// One creature (a row of the table).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Creature {
    pub name: String,
    pub type_name: String,
    pub height: f64,
    pub weight: f64,
    /// Values aligned with [`Dataset::statistic_columns`].
    pub stats: Vec<f64>,
    /// Base stat total, the sum of `stats`.
    pub bst: f64,
}

impl Creature {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        height: f64,
        weight: f64,
        stats: Vec<f64>,
    ) -> Self {
        let bst = stats.iter().sum();
        Self {
            name: name.into(),
            type_name: type_name.into(),
            height,
            weight,
            stats,
            bst,
        }
    }

    /// Value of the statistic at `index` in the owning dataset's column list.
    pub fn stat(&self, index: usize) -> Option<f64> {
        self.stats.get(index).copied()
    }
}

#[derive(Clone, Debug)]
pub struct Dataset {
    statistic_columns: Vec<String>,
    rows: Vec<Creature>,
    by_name: HashMap<String, usize>,
    types_sorted: Vec<String>,
    types_in_order: Vec<String>,
    /// The same rows as a polars frame, for the aggregations in [`crate::engine`].
    frame: DataFrame,
}

impl Dataset {
    /// Reads and validates the CSV at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Load`] when the file is missing, lacks a required
    /// column, or holds a non-numeric, negative or empty value in a numeric column.
    pub fn load(path: &Path) -> Result<Self> {
        let timer = std::time::Instant::now();
        let df = read_frame(path)?;
        let dataset = frame_to_dataset(&df)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            statistics = dataset.statistic_columns.len(),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Builds a dataset from rows already in memory, applying the same checks as
    /// [`Dataset::load`].
    pub fn from_rows(statistic_columns: Vec<String>, rows: Vec<Creature>) -> Result<Self> {
        validate_statistic_columns(&statistic_columns)?;

        let mut by_name = HashMap::with_capacity(rows.len());
        let mut seen_types = BTreeSet::new();
        let mut types_in_order = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            validate_row(row, &statistic_columns)?;
            if by_name.insert(row.name.clone(), i).is_some() {
                return Err(DashboardError::Load(format!(
                    "duplicate {NAME_COLUMN} '{}'",
                    row.name
                )));
            }
            if seen_types.insert(row.type_name.clone()) {
                types_in_order.push(row.type_name.clone());
            }
        }

        let frame = io::rows_to_frame(&statistic_columns, &rows)?;

        Ok(Self {
            statistic_columns,
            rows,
            frame,
            by_name,
            types_sorted: seen_types.into_iter().collect(),
            types_in_order,
        })
    }

    pub fn rows(&self) -> &[Creature] {
        &self.rows
    }

    /// Columns `Name`, `Type`, `Height`, `Weight`, every statistic, then `BST`.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Creature> {
        self.by_name.get(name).and_then(|&i| self.rows.get(i))
    }

    /// Distinct type values in ascending order.
    pub fn all_types(&self) -> &[String] {
        &self.types_sorted
    }

    /// Distinct type values in order of first appearance.
    pub fn types_in_order(&self) -> &[String] {
        &self.types_in_order
    }

    /// Position of `type_name` in [`Dataset::all_types`]. Used to keep a type's
    /// colour stable across charts.
    pub fn type_index(&self, type_name: &str) -> Option<usize> {
        self.types_sorted
            .binary_search_by(|t| t.as_str().cmp(type_name))
            .ok()
    }

    /// Statistic column names in file order, identity columns excluded.
    pub fn statistic_columns(&self) -> &[String] {
        &self.statistic_columns
    }

    pub fn statistic_index(&self, statistic: &str) -> Option<usize> {
        self.statistic_columns.iter().position(|c| c == statistic)
    }

    /// Like [`Dataset::statistic_index`] but fails for unknown names.
    pub fn require_statistic(&self, statistic: &str) -> Result<usize> {
        self.statistic_index(statistic)
            .ok_or_else(|| DashboardError::invalid_statistic(statistic))
    }
}

fn validate_statistic_columns(columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(DashboardError::Load(
            "the table has no statistic columns".to_owned(),
        ));
    }
    let mut seen = BTreeSet::new();
    for column in columns {
        if IDENTITY_COLUMNS.contains(&column.as_str()) || column == TOTAL_COLUMN {
            return Err(DashboardError::Load(format!(
                "'{column}' cannot be used as a statistic column"
            )));
        }
        if !seen.insert(column.as_str()) {
            return Err(DashboardError::Load(format!(
                "statistic column '{column}' appears twice"
            )));
        }
    }
    Ok(())
}

fn validate_row(row: &Creature, statistic_columns: &[String]) -> Result<()> {
    if row.stats.len() != statistic_columns.len() {
        return Err(DashboardError::Load(format!(
            "'{}' has {} statistics, expected {}",
            row.name,
            row.stats.len(),
            statistic_columns.len()
        )));
    }
    for (column, value) in [(HEIGHT_COLUMN, row.height), (WEIGHT_COLUMN, row.weight)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(DashboardError::Load(format!(
                "'{}' has a non-positive {column} ({value})",
                row.name
            )));
        }
    }
    for (column, value) in statistic_columns.iter().zip(&row.stats) {
        if !value.is_finite() || *value < 0.0 {
            return Err(DashboardError::Load(format!(
                "'{}' has an invalid {column} value ({value})",
                row.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Vec<String> {
        vec!["HP".to_owned(), "Attack".to_owned()]
    }

    #[test]
    fn test_bst_is_sum_of_stats() {
        let row = Creature::new("Bulbasaur", "Grass", 0.7, 6.9, vec![45.0, 49.0]);
        assert!((row.bst - 94.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_types_sorted_and_in_order() {
        let ds = Dataset::from_rows(
            stats(),
            vec![
                Creature::new("Squirtle", "Water", 0.5, 9.0, vec![44.0, 48.0]),
                Creature::new("Charmander", "Fire", 0.6, 8.5, vec![39.0, 52.0]),
                Creature::new("Psyduck", "Water", 0.8, 19.6, vec![50.0, 52.0]),
            ],
        )
        .expect("valid rows");

        assert_eq!(ds.all_types(), ["Fire", "Water"]);
        assert_eq!(ds.types_in_order(), ["Water", "Fire"]);
        assert_eq!(ds.type_index("Water"), Some(1));
        assert_eq!(ds.type_index("Ghost"), None);
        assert_eq!(ds.get("Psyduck").map(|c| c.weight), Some(19.6));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = Dataset::from_rows(
            stats(),
            vec![
                Creature::new("Eevee", "Normal", 0.3, 6.5, vec![55.0, 55.0]),
                Creature::new("Eevee", "Normal", 0.3, 6.5, vec![55.0, 55.0]),
            ],
        )
        .expect_err("duplicate names must fail");
        assert!(matches!(err, DashboardError::Load(_)));
    }

    #[test]
    fn test_negative_statistic_rejected() {
        let err = Dataset::from_rows(
            stats(),
            vec![Creature::new("Ditto", "Normal", 0.3, 4.0, vec![48.0, -1.0])],
        )
        .expect_err("negative statistic must fail");
        assert!(err.to_string().contains("Attack"));
    }

    #[test]
    fn test_identity_column_is_not_a_statistic() {
        let err = Dataset::from_rows(vec!["Height".to_owned()], Vec::new())
            .expect_err("identity column cannot be a statistic");
        assert!(matches!(err, DashboardError::Load(_)));
    }

    #[test]
    fn test_require_statistic() {
        let ds = Dataset::from_rows(stats(), Vec::new()).expect("empty dataset is valid");
        assert_eq!(ds.require_statistic("Attack").ok(), Some(1));
        assert!(matches!(
            ds.require_statistic("NotAColumn"),
            Err(DashboardError::InvalidArgument { .. })
        ));
    }
}

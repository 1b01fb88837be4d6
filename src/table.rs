//! Query model for the paginated data table: per-column filters, a single sort
//! column and a page index, applied to the whole dataset.

use crate::dataset::{Creature, Dataset, NAME_COLUMN, TOTAL_COLUMN, TYPE_COLUMN};
use crate::utils::fmt_number;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableColumn {
    Name,
    Type,
    /// Index into [`Dataset::statistic_columns`].
    Statistic(usize),
    Total,
}

impl TableColumn {
    /// Name, type, every statistic, then the total.
    pub fn all(dataset: &Dataset) -> Vec<Self> {
        let mut columns = vec![Self::Name, Self::Type];
        columns.extend((0..dataset.statistic_columns().len()).map(Self::Statistic));
        columns.push(Self::Total);
        columns
    }

    pub fn header(self, dataset: &Dataset) -> &str {
        match self {
            Self::Name => NAME_COLUMN,
            Self::Type => TYPE_COLUMN,
            Self::Statistic(i) => dataset
                .statistic_columns()
                .get(i)
                .map_or("?", String::as_str),
            Self::Total => TOTAL_COLUMN,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Statistic(_) | Self::Total)
    }

    fn text(self, row: &Creature) -> Option<&str> {
        match self {
            Self::Name => Some(&row.name),
            Self::Type => Some(&row.type_name),
            Self::Statistic(_) | Self::Total => None,
        }
    }

    fn number(self, row: &Creature) -> Option<f64> {
        match self {
            Self::Statistic(i) => row.stat(i),
            Self::Total => Some(row.bst),
            Self::Name | Self::Type => None,
        }
    }

    pub fn display(self, row: &Creature) -> String {
        match self.text(row) {
            Some(text) => text.to_owned(),
            None => self.number(row).map(fmt_number).unwrap_or_default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn holds(self, value: f64, target: f64) -> bool {
        const TOLERANCE: f64 = 1e-9;
        match self {
            Self::Eq => (value - target).abs() < TOLERANCE,
            Self::Ne => (value - target).abs() >= TOLERANCE,
            Self::Lt => value < target,
            Self::Le => value <= target,
            Self::Gt => value > target,
            Self::Ge => value >= target,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ColumnFilter {
    /// Case-insensitive substring; stored lowercased.
    Contains(String),
    Compare(CompareOp, f64),
    /// A numeric filter that does not parse. Matches nothing.
    Invalid,
}

impl ColumnFilter {
    /// Parses the text typed into a column's filter box. Blank text means no
    /// filter.
    pub fn parse(raw: &str, numeric: bool) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if !numeric {
            return Some(Self::Contains(raw.to_lowercase()));
        }

        // two-character operators first
        let (op, rest) = [
            ("<=", CompareOp::Le),
            (">=", CompareOp::Ge),
            ("!=", CompareOp::Ne),
            ("<", CompareOp::Lt),
            (">", CompareOp::Gt),
            ("=", CompareOp::Eq),
        ]
        .into_iter()
        .find_map(|(prefix, op)| raw.strip_prefix(prefix).map(|rest| (op, rest)))
        .unwrap_or((CompareOp::Eq, raw));

        Some(
            rest.trim()
                .parse::<f64>()
                .map_or(Self::Invalid, |target| Self::Compare(op, target)),
        )
    }

    pub fn matches(&self, column: TableColumn, row: &Creature) -> bool {
        match self {
            Self::Contains(needle) => column
                .text(row)
                .is_some_and(|text| text.to_lowercase().contains(needle.as_str())),
            Self::Compare(op, target) => column
                .number(row)
                .is_some_and(|value| op.holds(value, *target)),
            Self::Invalid => false,
        }
    }
}

/// One page of query results.
#[derive(Debug)]
pub struct TablePage<'a> {
    pub rows: Vec<&'a Creature>,
    /// Zero-based, already clamped to the last page.
    pub page: usize,
    pub page_count: usize,
    /// Rows matching every filter, across all pages.
    pub matching: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableQuery {
    filters: BTreeMap<TableColumn, String>,
    sort: Option<(TableColumn, SortDirection)>,
    page: usize,
}

impl TableQuery {
    pub fn filter_text(&self, column: TableColumn) -> &str {
        self.filters.get(&column).map_or("", String::as_str)
    }

    /// Replaces a column's filter text and goes back to the first page.
    pub fn set_filter(&mut self, column: TableColumn, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            self.filters.remove(&column);
        } else {
            self.filters.insert(column, text);
        }
        self.page = 0;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 0;
    }

    pub fn sort(&self) -> Option<(TableColumn, SortDirection)> {
        self.sort
    }

    /// Cycles a column through ascending, descending and unsorted.
    pub fn toggle_sort(&mut self, column: TableColumn) {
        self.sort = match self.sort {
            Some((current, SortDirection::Ascending)) if current == column => {
                Some((column, SortDirection::Descending))
            }
            Some((current, SortDirection::Descending)) if current == column => None,
            _ => Some((column, SortDirection::Ascending)),
        };
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn apply<'a>(&self, dataset: &'a Dataset, page_size: usize) -> TablePage<'a> {
        let page_size = page_size.max(1);
        let filters: Vec<(TableColumn, ColumnFilter)> = self
            .filters
            .iter()
            .filter_map(|(&column, text)| {
                ColumnFilter::parse(text, column.is_numeric()).map(|f| (column, f))
            })
            .collect();

        let mut rows: Vec<&Creature> = dataset
            .rows()
            .iter()
            .filter(|row| filters.iter().all(|(column, f)| f.matches(*column, row)))
            .collect();

        if let Some((column, direction)) = self.sort {
            rows.sort_by(|a, b| {
                let ordering = compare_by(column, a, b);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let matching = rows.len();
        let page_count = matching.div_ceil(page_size).max(1);
        let page = self.page.min(page_count - 1);
        let rows = rows
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect();

        TablePage {
            rows,
            page,
            page_count,
            matching,
        }
    }
}

fn compare_by(column: TableColumn, a: &Creature, b: &Creature) -> Ordering {
    match (column.text(a), column.text(b)) {
        (Some(x), Some(y)) => x.cmp(y),
        _ => {
            let x = column.number(a).unwrap_or(f64::NAN);
            let y = column.number(b).unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
    }
}

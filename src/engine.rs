//! Filters and aggregations behind every chart.
//!
//! All functions are pure: they read an immutable [`Dataset`] (through a
//! [`Subset`]) and return a new derived view. Unknown type values select nothing,
//! while an unknown statistic is rejected with
//! [`DashboardError::InvalidArgument`](crate::error::DashboardError::InvalidArgument).

use crate::dataset::{Creature, Dataset, TYPE_COLUMN};
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A filtered view over a dataset. Row indices are kept in dataset order.
#[derive(Clone, Debug)]
pub struct Subset<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> Subset<'a> {
    /// Every row of `dataset`.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    fn matching(dataset: &'a Dataset, predicate: impl Fn(&Creature) -> bool) -> Self {
        let indices = dataset
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate(row))
            .map(|(i, _)| i)
            .collect();
        Self { dataset, indices }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Creature> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().filter_map(move |&i| rows.get(i))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The subset's rows taken from the dataset frame, in subset order.
    pub fn frame(&self) -> Result<DataFrame> {
        let idx = IdxCa::from_vec(
            "row".into(),
            self.indices
                .iter()
                .filter_map(|&i| IdxSize::try_from(i).ok())
                .collect(),
        );
        Ok(self.dataset.frame().take(&idx)?)
    }
}

/// Rows whose type is one of `selected`. An empty selection yields an empty
/// subset, not the whole table.
pub fn filter_by_types<'a, S: AsRef<str>>(dataset: &'a Dataset, selected: &[S]) -> Subset<'a> {
    let wanted: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
    Subset::matching(dataset, |row| wanted.contains(row.type_name.as_str()))
}

/// Rows whose type equals `selected` exactly (case-sensitive).
pub fn filter_by_type<'a>(dataset: &'a Dataset, selected: &str) -> Subset<'a> {
    Subset::matching(dataset, |row| row.type_name == selected)
}

/// Mean of `statistic` per type. Types without rows in the subset are absent
/// from the result.
pub fn mean_by_type(subset: &Subset<'_>, statistic: &str) -> Result<BTreeMap<String, f64>> {
    subset.dataset().require_statistic(statistic)?;

    let means = subset
        .frame()?
        .lazy()
        .group_by([col(TYPE_COLUMN)])
        .agg([col(statistic).mean()])
        .collect()?;

    let types = means.column(TYPE_COLUMN)?.as_materialized_series().str()?;
    let values = means.column(statistic)?.as_materialized_series().f64()?;

    Ok(types
        .into_iter()
        .zip(values)
        .filter_map(|(type_name, mean)| Some((type_name?.to_owned(), mean?)))
        .collect())
}

/// Number of rows per type in the subset.
pub fn count_by_type(subset: &Subset<'_>) -> Result<BTreeMap<String, usize>> {
    let frame = subset.frame()?;
    let counts = frame
        .column(TYPE_COLUMN)?
        .as_materialized_series()
        .value_counts(false, false, "counts".into(), false)?;

    let types = counts.column(TYPE_COLUMN)?.as_materialized_series().str()?;
    let totals = counts.column("counts")?.as_materialized_series().idx()?;

    Ok(types
        .into_iter()
        .zip(totals)
        .filter_map(|(type_name, count)| Some((type_name?.to_owned(), count? as usize)))
        .collect())
}

/// Counts ordered for display: descending count, then type name.
pub fn ranked_counts(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(t, &c)| (t.as_str(), c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhysicalPoint<'a> {
    pub name: &'a str,
    pub type_name: &'a str,
    pub height: f64,
    pub weight: f64,
}

/// Height/weight pair for every row of the subset.
pub fn height_weight_pairs<'a>(subset: &Subset<'a>) -> Vec<PhysicalPoint<'a>> {
    subset
        .rows()
        .map(|row| PhysicalPoint {
            name: &row.name,
            type_name: &row.type_name,
            height: row.height,
            weight: row.weight,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatPair<'a> {
    pub creature: &'a Creature,
    pub x: f64,
    pub y: f64,
}

/// Two statistics of every row of the subset, e.g. attack against defense.
pub fn stat_pairs<'a>(
    subset: &Subset<'a>,
    x_statistic: &str,
    y_statistic: &str,
) -> Result<Vec<StatPair<'a>>> {
    let dataset = subset.dataset();
    let x_index = dataset.require_statistic(x_statistic)?;
    let y_index = dataset.require_statistic(y_statistic)?;

    Ok(subset
        .rows()
        .map(|row| StatPair {
            creature: row,
            x: row.stat(x_index).unwrap_or_default(),
            y: row.stat(y_index).unwrap_or_default(),
        })
        .collect())
}

pub fn attack_defense_pairs<'a>(subset: &Subset<'a>) -> Result<Vec<StatPair<'a>>> {
    stat_pairs(subset, "Attack", "Defense")
}

/// Raw values of `statistic`, in subset order.
pub fn statistic_values<'s>(
    subset: &'s Subset<'_>,
    statistic: &str,
) -> Result<impl Iterator<Item = f64> + 's> {
    let index = subset.dataset().require_statistic(statistic)?;
    Ok(subset.rows().filter_map(move |row| row.stat(index)))
}

/// Half-open value range `[start, end)`; the last bucket of a histogram also
/// holds its upper bound.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bucket {
    pub start: f64,
    pub end: f64,
}

impl Bucket {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    counts: Vec<usize>,
}

impl Histogram {
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket, usize)> + '_ {
        self.counts.iter().enumerate().map(|(i, &count)| {
            let start = self.start + i as f64 * self.bin_width;
            (
                Bucket {
                    start,
                    end: start + self.bin_width,
                },
                count,
            )
        })
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Equal-width histogram of `statistic` over the subset.
///
/// With `bins = None` the bin count follows the Freedman-Diaconis rule, clamped
/// to 5..=50. A constant column gets a single bucket of width 1 centred on the
/// value.
pub fn histogram_buckets(
    subset: &Subset<'_>,
    statistic: &str,
    bins: Option<usize>,
) -> Result<Histogram> {
    let mut values: Vec<f64> = statistic_values(subset, statistic)?.collect();
    values.sort_by(f64::total_cmp);

    let (Some(&min), Some(&max)) = (values.first(), values.last()) else {
        return Ok(Histogram::default());
    };

    if (max - min).abs() < f64::EPSILON {
        return Ok(Histogram {
            start: min - 0.5,
            bin_width: 1.0,
            counts: vec![values.len()],
        });
    }

    let num_bins = match bins {
        Some(bins) => bins,
        None => freedman_diaconis_bins(&values, min, max)?,
    }
    .max(1);
    let bin_width = (max - min) / num_bins as f64;

    let mut counts = vec![0; num_bins];
    for value in &values {
        let idx = (((value - min) / bin_width).floor() as usize).min(num_bins - 1);
        if let Some(slot) = counts.get_mut(idx) {
            *slot += 1;
        }
    }

    Ok(Histogram {
        start: min,
        bin_width,
        counts,
    })
}

fn freedman_diaconis_bins(values: &[f64], min: f64, max: f64) -> Result<usize> {
    let ca = Float64Chunked::from_slice("values".into(), values);
    let q1 = ca.quantile(0.25, QuantileMethod::Linear)?.unwrap_or(min);
    let q3 = ca.quantile(0.75, QuantileMethod::Linear)?.unwrap_or(max);

    let n = values.len() as f64;
    let iqr = q3 - q1;
    let h = if iqr > 0.0 {
        2.0 * iqr / n.cbrt()
    } else {
        (max - min) / n.sqrt()
    };
    Ok(((max - min) / h).ceil().clamp(5.0, 50.0) as usize)
}

/// The `n` rows with the lowest (`ascending`) or highest base stat total.
///
/// The sort is stable, so rows with equal totals keep their dataset order.
pub fn top_n_by_total<'a>(subset: &Subset<'a>, n: usize, ascending: bool) -> Vec<&'a Creature> {
    let mut rows: Vec<&Creature> = subset.rows().collect();
    if ascending {
        rows.sort_by(|a, b| a.bst.total_cmp(&b.bst));
    } else {
        rows.sort_by(|a, b| b.bst.total_cmp(&a.bst));
    }
    rows.truncate(n);
    rows
}

//! Hierarchical multi-key sorting.
//!
//! Provides [`Direction`] and [`SortKey`], and [`sort`], which orders a
//! collection by an ordered list of keys: the first key sorts the whole
//! collection, and every later key only reorders runs of records that tie
//! on all keys before it. Sorting is stable, so records that tie on every
//! key keep their input order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::formatter::ColumnFormatters;
use crate::path::{flatten, FlatRow};
use crate::value::compare_for_sort;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Unsorted. A key with this direction is skipped.
    #[default]
    None,
    /// Smallest first.
    #[serde(alias = "asc")]
    Ascending,
    /// Largest first.
    #[serde(alias = "desc")]
    Descending,
}

impl Direction {
    /// Applies this direction to an ascending ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Descending => ordering.reverse(),
            _ => ordering,
        }
    }

    /// The direction a column moves to when it is toggled.
    ///
    /// Ascending becomes descending; anything else becomes ascending.
    pub fn toggle(self) -> Direction {
        match self {
            Direction::Ascending => Direction::Descending,
            _ => Direction::Ascending,
        }
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Ascending),
            "desc" | "descending" => Ok(Direction::Descending),
            "none" => Ok(Direction::None),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// A column path and the direction to sort it in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub path: String,
    #[serde(default = "ascending")]
    pub direction: Direction,
}

fn ascending() -> Direction {
    Direction::Ascending
}

impl SortKey {
    pub fn new(path: impl Into<String>, direction: Direction) -> Self {
        SortKey {
            path: path.into(),
            direction,
        }
    }

    pub fn asc(path: impl Into<String>) -> Self {
        SortKey::new(path, Direction::Ascending)
    }

    pub fn desc(path: impl Into<String>) -> Self {
        SortKey::new(path, Direction::Descending)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.direction)
    }
}

/// Parses `path` or `path:asc` / `path:desc`.
impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((path, direction)) if !path.is_empty() => {
                Ok(SortKey::new(path, direction.parse()?))
            }
            _ if s.is_empty() => Err("empty sort key".to_string()),
            _ => Ok(SortKey::asc(s)),
        }
    }
}

/// Sorts `records` by `keys`, returning a new vector.
///
/// Keys with [`Direction::None`] are ignored. Each key's column is read from
/// the flattened record after the formatters for sort-key columns have been
/// applied; formatters for other columns never run. Values compare
/// numerically when both are numbers and textually otherwise, with a missing
/// value behaving like the empty string.
///
/// # Example
///
/// ```
/// use rowseek::{sort, ColumnFormatters, SortKey};
/// use serde_json::json;
///
/// let records = vec![
///     json!({"age": 30, "name": "b"}),
///     json!({"age": 20, "name": "c"}),
///     json!({"age": 30, "name": "a"}),
/// ];
/// let sorted = sort(
///     &records,
///     &[SortKey::desc("age"), SortKey::asc("name")],
///     &ColumnFormatters::new(),
/// );
/// assert_eq!(sorted, vec![records[2].clone(), records[0].clone(), records[1].clone()]);
/// ```
pub fn sort(records: &[Value], keys: &[SortKey], formatters: &ColumnFormatters) -> Vec<Value> {
    let keys: Vec<&SortKey> = keys.iter().filter(|k| !k.direction.is_none()).collect();
    if records.len() < 2 || keys.is_empty() {
        return records.to_vec();
    }

    let paths: Vec<&str> = keys.iter().map(|k| k.path.as_str()).collect();
    let rows: Vec<FlatRow> = records.iter().map(flatten).collect();
    let resolved = formatters.scoped(&paths).resolve(&rows);
    let rows: Vec<FlatRow> = if resolved.is_empty() {
        rows
    } else {
        rows.iter().map(|row| resolved.apply(row)).collect()
    };

    let mut order: Vec<usize> = (0..records.len()).collect();
    sort_runs(&mut order, &rows, &keys);
    tracing::debug!(rows = records.len(), keys = ?paths, "sorted collection");

    order.into_iter().map(|i| records[i].clone()).collect()
}

/// Sorts `order` (indices into `rows`) by the first key, then recurses into
/// every run of equal values with the remaining keys.
fn sort_runs(order: &mut [usize], rows: &[FlatRow], keys: &[&SortKey]) {
    let Some((key, rest)) = keys.split_first() else {
        return;
    };
    if order.len() < 2 {
        return;
    }

    let value = |i: usize| rows[i].get(&key.path);
    order.sort_by(|&a, &b| key.direction.apply(compare_for_sort(value(a), value(b))));

    if rest.is_empty() {
        return;
    }
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len()
            && compare_for_sort(value(order[start]), value(order[end])) == Ordering::Equal
        {
            end += 1;
        }
        if end - start > 1 {
            tracing::trace!(path = %key.path, len = end - start, "sorting tied run");
            sort_runs(&mut order[start..end], rows, rest);
        }
        start = end;
    }
}

//! Per-column value transforms applied before filtering and sorting.
//!
//! A [`ColumnFormatters`] maps a column name to a pure function. The name
//! decides what the function receives:
//!
//! | Column name | Target | Function receives |
//! |-------------|--------|-------------------|
//! | an existing leaf path (`person.firstName`) | [`ColumnTarget::Exact`] | the leaf |
//! | a parent path (`person`) | [`ColumnTarget::Nested`] | the rebuilt sub-object |
//! | anything else (`fullName`) | [`ColumnTarget::Synthetic`] | the whole rebuilt record |
//!
//! In every case the result is stored under the column name, so it can be
//! queried and sorted like any other column. The target is resolved once per
//! column against the collection ([`ColumnFormatters::resolve`]), not probed
//! again for every row.
//!
//! ```
//! use rowseek::{flatten, ColumnFormatters};
//! use serde_json::{json, Value};
//!
//! let formatters = ColumnFormatters::new()
//!     .with("person", |p: &Value| p["firstName"].clone())
//!     .with("age", |a: &Value| json!(a.as_i64().unwrap_or(0) * 2));
//!
//! let row = flatten(&json!({"person": {"firstName": "night"}, "age": 4}));
//! let formatted = formatters.apply(&row);
//! assert_eq!(formatted["person"], json!("night"));
//! assert_eq!(formatted["age"], json!(8));
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::path::{self, FlatRow};

/// A column transform.
pub type FormatFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Insertion-ordered map of column name to transform.
///
/// Cloning is cheap (the functions are shared). The engine never mutates a
/// caller's formatters; scoping produces a new map.
#[derive(Clone, Default)]
pub struct ColumnFormatters {
    entries: IndexMap<String, FormatFn>,
}

impl ColumnFormatters {
    /// Creates an empty formatter map. Applying it is the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a formatter, builder style.
    pub fn with<F>(mut self, column: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.insert(column, Arc::new(f));
        self
    }

    /// Adds or replaces the formatter for `column`.
    ///
    /// Replacing keeps the column's original position.
    pub fn insert(&mut self, column: impl Into<String>, f: FormatFn) {
        self.entries.insert(column.into(), f);
    }

    /// Returns the formatter for `column`.
    pub fn get(&self, column: &str) -> Option<&FormatFn> {
        self.entries.get(column)
    }

    /// Returns `true` if a formatter exists for `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    /// Column names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the subset of formatters whose names are in `columns`,
    /// keeping this map's order.
    pub fn scoped<S: AsRef<str>>(&self, columns: &[S]) -> ColumnFormatters {
        let entries = self
            .entries
            .iter()
            .filter(|(name, _)| columns.iter().any(|c| c.as_ref() == name.as_str()))
            .map(|(name, f)| (name.clone(), Arc::clone(f)))
            .collect();
        ColumnFormatters { entries }
    }

    /// Applies the formatter for `column` to a single value, if one exists.
    ///
    /// This is how query literals are normalised by a query-value formatter.
    pub fn format_value(&self, column: &str, value: &Value) -> Option<Value> {
        self.get(column).map(|f| f(value))
    }

    /// Resolves every formatter against the columns present in `rows`.
    pub fn resolve(&self, rows: &[FlatRow]) -> ResolvedFormatters {
        let entries = self
            .entries
            .iter()
            .map(|(name, f)| {
                let target = ColumnTarget::detect(name, rows);
                tracing::debug!(column = %name, ?target, "resolved column formatter");
                ResolvedFormatter {
                    column: name.clone(),
                    target,
                    f: Arc::clone(f),
                }
            })
            .collect();
        ResolvedFormatters { entries }
    }

    /// Formats a single row, resolving each formatter against that row.
    ///
    /// Returns a new row; the input is untouched.
    pub fn apply(&self, row: &FlatRow) -> FlatRow {
        if self.is_empty() {
            return row.clone();
        }
        self.resolve(std::slice::from_ref(row)).apply(row)
    }
}

impl fmt::Debug for ColumnFormatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// What a formatter's column name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTarget {
    /// The name is a leaf path; the formatter transforms that leaf.
    Exact,
    /// The name is a parent of leaf paths; the formatter receives the
    /// rebuilt sub-object.
    Nested,
    /// The name matches nothing; the formatter derives a new column from the
    /// whole record.
    Synthetic,
}

impl ColumnTarget {
    /// Classifies `column` against the keys present in any of `rows`.
    pub fn detect(column: &str, rows: &[FlatRow]) -> ColumnTarget {
        if rows.iter().any(|row| row.contains_key(column)) {
            ColumnTarget::Exact
        } else if rows
            .iter()
            .any(|row| path::keys_under(row, column).next().is_some())
        {
            ColumnTarget::Nested
        } else {
            ColumnTarget::Synthetic
        }
    }
}

/// A formatter bound to its resolved [`ColumnTarget`].
#[derive(Clone)]
pub struct ResolvedFormatter {
    column: String,
    target: ColumnTarget,
    f: FormatFn,
}

impl ResolvedFormatter {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn target(&self) -> ColumnTarget {
        self.target
    }

    /// Computes this formatter's output for `row`.
    ///
    /// Returns `None` when the row has nothing for an exact or nested
    /// column; the column then stays absent.
    fn compute(&self, row: &FlatRow) -> Option<Value> {
        match self.target {
            ColumnTarget::Exact => row.get(&self.column).map(|leaf| (self.f)(leaf)),
            ColumnTarget::Nested => {
                path::subtree(row, &self.column).map(|sub| (self.f)(&sub))
            }
            ColumnTarget::Synthetic => Some((self.f)(&path::unflatten(row))),
        }
    }
}

impl fmt::Debug for ResolvedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedFormatter")
            .field("column", &self.column)
            .field("target", &self.target)
            .finish()
    }
}

/// Formatters resolved against a collection, ready to apply row by row.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFormatters {
    entries: Vec<ResolvedFormatter>,
}

impl ResolvedFormatters {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedFormatter> {
        self.entries.iter()
    }

    /// Returns a formatted copy of `row`.
    ///
    /// Every formatter reads the original row, so no formatter sees
    /// another's output within the same call.
    pub fn apply(&self, row: &FlatRow) -> FlatRow {
        let mut out = row.clone();
        for formatter in &self.entries {
            if let Some(value) = formatter.compute(row) {
                out.insert(formatter.column.clone(), value);
            }
        }
        out
    }
}

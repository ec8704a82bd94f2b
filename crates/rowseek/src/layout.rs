//! Column layout for table views.
//!
//! A [`ColumnLayout`] keeps the ordered column definitions of a table and
//! their widths. Each column reports its width both absolutely and as a
//! percentage of the table's total, and can be resized by a drag delta.

use serde::{Deserialize, Serialize};

/// Width given to a column without an explicit one.
pub const DEFAULT_WIDTH: f64 = 250.0;

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Identifier of the column.
    pub key: String,
    /// Row path the column displays. Defaults to `key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessor_key: Option<String>,
    /// Initial width. Defaults to [`DEFAULT_WIDTH`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>) -> Self {
        ColumnSpec {
            key: key.into(),
            accessor_key: None,
            width: None,
        }
    }

    pub fn accessor(mut self, path: impl Into<String>) -> Self {
        self.accessor_key = Some(path.into());
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}

/// A column with its current width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub key: String,
    pub accessor_key: String,
    pub width: f64,
    /// Share of the total width, in percent.
    pub width_percent: f64,
}

/// Ordered columns and their widths.
///
/// # Example
///
/// ```
/// use rowseek::{ColumnLayout, ColumnSpec};
///
/// let mut layout = ColumnLayout::new([
///     ColumnSpec::new("first").width(100.0),
///     ColumnSpec::new("second").accessor("person.lastName"),
/// ]);
/// assert_eq!(layout.get_column("second").unwrap().width, 250.0);
/// assert_eq!(layout.get_column("second").unwrap().accessor_key, "person.lastName");
///
/// layout.resize("first", 100.0, 50.0);
/// assert_eq!(layout.get_column("first").unwrap().width, 150.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    columns: Vec<(String, String)>,
    widths: Vec<f64>,
}

impl ColumnLayout {
    pub fn new(specs: impl IntoIterator<Item = ColumnSpec>) -> Self {
        let mut layout = ColumnLayout::default();
        for spec in specs {
            let accessor = spec.accessor_key.unwrap_or_else(|| spec.key.clone());
            layout.columns.push((spec.key, accessor));
            layout.widths.push(spec.width.unwrap_or(DEFAULT_WIDTH));
        }
        layout
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Sum of all column widths.
    pub fn total_width(&self) -> f64 {
        self.widths.iter().sum()
    }

    /// Row paths of the columns, in order.
    pub fn accessor_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, accessor)| accessor.as_str())
    }

    /// All columns, in definition order.
    pub fn columns(&self) -> Vec<Column> {
        (0..self.columns.len()).map(|i| self.column_at(i)).collect()
    }

    pub fn get_column(&self, key: &str) -> Option<Column> {
        self.position(key).map(|i| self.column_at(i))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|(k, _)| k == key)
    }

    fn column_at(&self, index: usize) -> Column {
        let (key, accessor_key) = &self.columns[index];
        let width = self.widths[index];
        let total = self.total_width();
        Column {
            key: key.clone(),
            accessor_key: accessor_key.clone(),
            width,
            width_percent: if total > 0.0 { width / total * 100.0 } else { 0.0 },
        }
    }

    /// Resizes `key` after a drag of `delta` that started when the column
    /// was displayed `start_width` wide.
    ///
    /// When the displayed width equals the stored one, the new width is
    /// simply `start_width + delta`. Otherwise the table is displayed scaled,
    /// and the drag is converted to the share of the displayed table the
    /// column should take; that share is then applied to the stored widths.
    /// A drag that would take the whole table is ignored.
    ///
    /// Returns `true` if the width changed.
    pub fn resize(&mut self, key: &str, start_width: f64, delta: f64) -> bool {
        if delta == 0.0 {
            return false;
        }
        let Some(index) = self.position(key) else {
            tracing::debug!(%key, "resize of unknown column");
            return false;
        };

        let current = self.widths[index];
        let width = if start_width == current || current <= 0.0 {
            start_width + delta
        } else {
            let total = self.total_width();
            let displayed_total = start_width / current * total;
            if displayed_total.is_nan() || displayed_total <= 0.0 {
                tracing::trace!(%key, start_width, "no displayed width to scale, ignoring");
                return false;
            }
            let share = (start_width + delta).min(displayed_total) / displayed_total;
            if share >= 1.0 {
                tracing::trace!(%key, "resize would fill the table, ignoring");
                return false;
            }
            ((total - current) / (1.0 - share) * share).round()
        };
        let width = width.max(0.0);

        tracing::debug!(%key, from = current, to = width, "resized column");
        self.widths[index] = width;
        width != current
    }
}

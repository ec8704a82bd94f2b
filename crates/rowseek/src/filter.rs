//! Query-string filtering with a parse cache.

use serde_json::Value;

use crate::error::Result;
use crate::formatter::ColumnFormatters;
use crate::query::Query;

/// Filters collections by query text.
///
/// A `Filter` holds the column formatters (applied to rows) and the
/// query-value formatters (applied to literals while parsing). The last
/// parsed query is cached by its text, so re-running the same query on a
/// changed collection skips parsing.
///
/// # Example
///
/// ```
/// use rowseek::Filter;
/// use serde_json::json;
///
/// let records = vec![json!({"progress": 38}), json!({"progress": 72})];
/// let mut filter = Filter::new();
/// assert_eq!(filter.apply(&records, "progress > 50").unwrap(), vec![records[1].clone()]);
/// assert_eq!(filter.count(&records, "progress > 10").unwrap(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    column_formatters: ColumnFormatters,
    value_formatters: ColumnFormatters,
    cached: Option<(String, Query)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column_formatters(mut self, formatters: ColumnFormatters) -> Self {
        self.column_formatters = formatters;
        self
    }

    /// Sets the query-value formatters. Clears the parse cache.
    pub fn with_value_formatters(mut self, formatters: ColumnFormatters) -> Self {
        self.value_formatters = formatters;
        self.cached = None;
        self
    }

    pub fn column_formatters(&self) -> &ColumnFormatters {
        &self.column_formatters
    }

    /// Returns the parsed form of `text`, parsing only when it differs from
    /// the last query.
    pub fn query(&mut self, text: &str) -> &Query {
        let text = text.trim();
        let stale = !matches!(&self.cached, Some((cached, _)) if cached == text);
        if stale {
            tracing::trace!(query = %text, "parsing query");
            self.cached = None;
        }
        let (_, query) = self
            .cached
            .get_or_insert_with(|| (text.to_string(), Query::parse_with(text, &self.value_formatters)));
        query
    }

    /// Returns the records of `collection` matching `text`, in order.
    pub fn apply(&mut self, collection: &[Value], text: &str) -> Result<Vec<Value>> {
        let formatters = self.column_formatters.clone();
        self.query(text).filter(collection, &formatters)
    }

    /// Counts the records of `collection` matching `text`.
    pub fn count(&mut self, collection: &[Value], text: &str) -> Result<usize> {
        let formatters = self.column_formatters.clone();
        self.query(text).count(collection, &formatters)
    }
}

/// Filters `collection` by `query` with no formatters.
pub fn filter(collection: &[Value], query: &str) -> Result<Vec<Value>> {
    Query::parse(query).filter(collection, &ColumnFormatters::new())
}

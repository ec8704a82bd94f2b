//! Parsed queries and their execution.
//!
//! A [`Query`] is what the parser produces from query text. Running it
//! against a collection flattens every record, applies the column
//! formatters that the query's conditions read, and keeps the records whose
//! formatted row matches.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::Result;
use crate::formatter::ColumnFormatters;
use crate::group::QueryGroup;
use crate::parser;
use crate::path::{flatten, FlatRow};

/// A parsed query.
///
/// # Example
///
/// ```
/// use rowseek::{ColumnFormatters, Query};
/// use serde_json::json;
///
/// let records = vec![
///     json!({"person": {"firstName": "Anna"}, "progress": 38}),
///     json!({"person": {"firstName": "Bob"}, "progress": 72}),
/// ];
///
/// let query = Query::parse("person.firstName == a or progress > 50");
/// let found = query.filter(&records, &ColumnFormatters::new()).unwrap();
/// assert_eq!(found.len(), 2);
///
/// let query = Query::parse("progress >= 38 and person.firstName === Bob");
/// let found = query.filter(&records, &ColumnFormatters::new()).unwrap();
/// assert_eq!(found, vec![records[1].clone()]);
/// ```
#[derive(Debug, Clone, Default)]
pub enum Query {
    /// No usable condition. Every record matches.
    #[default]
    MatchAll,
    /// A rejected query. No record matches.
    MatchNone,
    /// A condition tree.
    Group(QueryGroup),
}

impl Query {
    /// Parses query text. See [`parser`](crate::parser) for the grammar.
    pub fn parse(text: &str) -> Query {
        parser::parse(text)
    }

    /// Parses query text, normalising literals through `value_formatters`.
    pub fn parse_with(text: &str, value_formatters: &ColumnFormatters) -> Query {
        parser::parse_with(text, value_formatters)
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Query::MatchAll)
    }

    pub fn is_match_none(&self) -> bool {
        matches!(self, Query::MatchNone)
    }

    /// Row paths read by the query's conditions.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Query::Group(group) => group.paths(),
            _ => Vec::new(),
        }
    }

    /// Tests a single flattened, already formatted row.
    pub fn matches(&self, row: &FlatRow) -> Result<bool> {
        match self {
            Query::MatchAll => Ok(true),
            Query::MatchNone => Ok(false),
            Query::Group(group) => group.matches(row),
        }
    }

    /// Returns the records that match, in their original order.
    ///
    /// Only the formatters for columns the query reads are applied. The
    /// returned records are the inputs as given: formatting affects the
    /// decision, not the output. The first evaluation error aborts the
    /// whole call.
    pub fn filter(&self, records: &[Value], formatters: &ColumnFormatters) -> Result<Vec<Value>> {
        let group = match self {
            Query::MatchAll => return Ok(records.to_vec()),
            Query::MatchNone => return Ok(Vec::new()),
            Query::Group(group) => group,
        };

        let rows: Vec<FlatRow> = records.iter().map(flatten).collect();
        let resolved = formatters.scoped(&group.paths()).resolve(&rows);

        let mut found = Vec::new();
        for (record, row) in records.iter().zip(&rows) {
            let row = if resolved.is_empty() {
                Cow::Borrowed(row)
            } else {
                Cow::Owned(resolved.apply(row))
            };
            if group.matches(&row)? {
                found.push(record.clone());
            }
        }
        tracing::debug!(
            total = records.len(),
            matched = found.len(),
            "filtered collection"
        );
        Ok(found)
    }

    /// Counts the records that match.
    pub fn count(&self, records: &[Value], formatters: &ColumnFormatters) -> Result<usize> {
        match self {
            Query::MatchAll => Ok(records.len()),
            Query::MatchNone => Ok(0),
            Query::Group(_) => Ok(self.filter(records, formatters)?.len()),
        }
    }
}

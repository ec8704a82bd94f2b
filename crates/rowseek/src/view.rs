//! A filtered and sorted view over a collection.

use serde_json::Value;

use crate::error::Result;
use crate::formatter::ColumnFormatters;
use crate::query::Query;
use crate::sort::{sort, Direction, SortKey};
use crate::sorter::SortState;

/// A collection seen through a query and a sort, as a data table shows it.
///
/// [`TableView::rows`] filters the collection by the current query, then
/// sorts the survivors by the active sort keys. Filtering uses the
/// formatters for the query's columns only, and sorting those for the sort
/// keys only.
///
/// # Example
///
/// ```
/// use rowseek::{Direction, TableView};
/// use serde_json::json;
///
/// let mut view = TableView::new(vec![
///     json!({"name": "carl", "age": 30}),
///     json!({"name": "anna", "age": 20}),
///     json!({"name": "bob", "age": 40}),
/// ]);
/// view.set_query("age > 25");
/// view.set_sort_key("name", Some(Direction::Ascending));
///
/// let names: Vec<_> = view.rows().unwrap().iter().map(|r| r["name"].clone()).collect();
/// assert_eq!(names, vec![json!("bob"), json!("carl")]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableView {
    collection: Vec<Value>,
    query_text: String,
    query: Query,
    sort: SortState,
    column_formatters: ColumnFormatters,
    value_formatters: ColumnFormatters,
}

impl TableView {
    pub fn new(collection: Vec<Value>) -> Self {
        TableView {
            collection,
            ..Default::default()
        }
    }

    pub fn with_column_formatters(mut self, formatters: ColumnFormatters) -> Self {
        self.column_formatters = formatters;
        self
    }

    /// Sets the query-value formatters and re-parses the current query.
    pub fn with_value_formatters(mut self, formatters: ColumnFormatters) -> Self {
        self.value_formatters = formatters;
        self.query = Query::parse_with(&self.query_text, &self.value_formatters);
        self
    }

    pub fn with_sort(mut self, keys: impl IntoIterator<Item = SortKey>) -> Self {
        self.sort = SortState::new(keys);
        self
    }

    /// Replaces the query. The text is parsed once, here.
    pub fn set_query(&mut self, text: &str) {
        if text == self.query_text {
            return;
        }
        self.query_text = text.to_string();
        self.query = Query::parse_with(text, &self.value_formatters);
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// See [`SortState::set`].
    pub fn set_sort_key(&mut self, path: &str, direction: Option<Direction>) {
        self.sort.set(path, direction);
    }

    pub fn active_sort(&self) -> &[SortKey] {
        self.sort.active()
    }

    pub fn direction_of(&self, path: &str) -> Direction {
        self.sort.direction_of(path)
    }

    pub fn set_collection(&mut self, collection: Vec<Value>) {
        self.collection = collection;
    }

    pub fn collection(&self) -> &[Value] {
        &self.collection
    }

    /// The filtered, sorted rows.
    pub fn rows(&self) -> Result<Vec<Value>> {
        let found = self.query.filter(&self.collection, &self.column_formatters)?;
        Ok(sort(&found, self.sort.active(), &self.column_formatters))
    }

    /// Number of records that pass the query.
    pub fn count(&self) -> Result<usize> {
        self.query.count(&self.collection, &self.column_formatters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Value> {
        vec![
            json!({"name": "carl", "age": 30, "status": "single"}),
            json!({"name": "anna", "age": 20, "status": "complicated"}),
            json!({"name": "bob", "age": 40, "status": "single"}),
            json!({"name": "dora", "age": 35, "status": "relationship"}),
        ]
    }

    fn names(records: &[Value]) -> Vec<&str> {
        records.iter().filter_map(|r| r["name"].as_str()).collect()
    }

    #[test]
    fn empty_view_is_collection() {
        let view = TableView::new(records());
        assert_eq!(view.rows().unwrap(), records());
        assert_eq!(view.count().unwrap(), 4);
    }

    #[test]
    fn filter_then_sort() {
        let mut view = TableView::new(records()).with_sort([SortKey::desc("age")]);
        view.set_query("status == single or age < 25");
        assert_eq!(names(&view.rows().unwrap()), vec!["bob", "carl", "anna"]);
        assert_eq!(view.count().unwrap(), 3);

        view.set_sort_key("name", None);
        assert_eq!(names(&view.rows().unwrap()), vec!["anna", "bob", "carl"]);
    }

    #[test]
    fn rejected_query_gives_no_rows() {
        let mut view = TableView::new(records());
        view.set_query("age > 1 and age < 50 or name == a");
        assert!(view.query().is_match_none());
        assert!(view.rows().unwrap().is_empty());
    }

    #[test]
    fn value_formatters_reparse_query() {
        let mut view = TableView::new(records()).with_column_formatters(
            ColumnFormatters::new().with("status", |v: &Value| {
                json!(v.as_str().unwrap_or_default().len())
            }),
        );
        view.set_query("status === single");
        // "single" is compared against lengths until the literal is normalised too
        assert!(view.rows().unwrap().is_empty());

        let view = view.with_value_formatters(ColumnFormatters::new().with("status", |v: &Value| {
            json!(v.as_str().unwrap_or_default().len())
        }));
        assert_eq!(names(&view.rows().unwrap()), vec!["carl", "bob"]);
        assert_eq!(view.query_text(), "status === single");
    }

    #[test]
    fn new_collection_keeps_query_and_sort() {
        let mut view = TableView::new(records()).with_sort([SortKey::asc("age")]);
        view.set_query("age >= 30");
        view.set_collection(vec![
            json!({"name": "x", "age": 50}),
            json!({"name": "y", "age": 10}),
            json!({"name": "z", "age": 31}),
        ]);
        assert_eq!(names(&view.rows().unwrap()), vec!["z", "x"]);
        assert_eq!(view.direction_of("age"), Direction::Ascending);
        assert_eq!(view.active_sort().len(), 1);
        assert_eq!(view.collection().len(), 3);
    }
}

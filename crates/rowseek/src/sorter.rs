//! Interactive sort state.
//!
//! [`SortState`] tracks the active sort keys the way a table header does:
//! clicking a column replaces the active sort with that column, toggling
//! its direction when it was already active. [`Sorter`] pairs that state
//! with a collection and its formatters and produces the sorted view.

use serde_json::Value;

use crate::formatter::ColumnFormatters;
use crate::sort::{sort, Direction, SortKey};

/// The active sort keys of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Vec<SortKey>,
}

impl SortState {
    /// Creates a state from initial keys. Keys without a direction are
    /// dropped.
    pub fn new(initial: impl IntoIterator<Item = SortKey>) -> Self {
        SortState {
            active: initial
                .into_iter()
                .filter(|key| !key.direction.is_none())
                .collect(),
        }
    }

    /// The active keys, most significant first.
    pub fn active(&self) -> &[SortKey] {
        &self.active
    }

    /// The direction `path` is currently sorted in.
    pub fn direction_of(&self, path: &str) -> Direction {
        self.active
            .iter()
            .find(|key| key.path == path)
            .map(|key| key.direction)
            .unwrap_or_default()
    }

    pub fn is_sorted_by(&self, path: &str) -> bool {
        !self.direction_of(path).is_none()
    }

    /// Sets the sort on `path`.
    ///
    /// With `Some(Direction::None)` all sorting is cleared. With another
    /// direction, `path` becomes the only active key in that direction.
    /// With `None`, the current direction of `path` is toggled: descending
    /// if it was ascending, ascending otherwise.
    pub fn set(&mut self, path: &str, direction: Option<Direction>) {
        let direction = direction.unwrap_or_else(|| self.direction_of(path).toggle());
        if direction.is_none() {
            tracing::debug!(%path, "clearing sort");
            self.active.clear();
        } else {
            tracing::debug!(%path, %direction, "sorting by column");
            self.active = vec![SortKey::new(path, direction)];
        }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

/// A collection with an interactive sort.
///
/// # Example
///
/// ```
/// use rowseek::{Direction, Sorter};
/// use serde_json::json;
///
/// let mut sorter = Sorter::new(vec![json!({"n": 2}), json!({"n": 1})]);
/// sorter.set_sort_key("n", None);
/// assert_eq!(sorter.direction_of("n"), Direction::Ascending);
/// assert_eq!(sorter.data(), vec![json!({"n": 1}), json!({"n": 2})]);
///
/// sorter.set_sort_key("n", Some(Direction::None));
/// assert_eq!(sorter.data(), vec![json!({"n": 2}), json!({"n": 1})]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sorter {
    collection: Vec<Value>,
    state: SortState,
    formatters: ColumnFormatters,
}

impl Sorter {
    pub fn new(collection: Vec<Value>) -> Self {
        Sorter {
            collection,
            ..Default::default()
        }
    }

    /// Sets the initial sort, builder style.
    pub fn with_sort(mut self, keys: impl IntoIterator<Item = SortKey>) -> Self {
        self.state = SortState::new(keys);
        self
    }

    pub fn with_formatters(mut self, formatters: ColumnFormatters) -> Self {
        self.formatters = formatters;
        self
    }

    /// See [`SortState::set`].
    pub fn set_sort_key(&mut self, path: &str, direction: Option<Direction>) {
        self.state.set(path, direction);
    }

    pub fn active_sort(&self) -> &[SortKey] {
        self.state.active()
    }

    pub fn direction_of(&self, path: &str) -> Direction {
        self.state.direction_of(path)
    }

    pub fn is_sorted_by(&self, path: &str) -> bool {
        self.state.is_sorted_by(path)
    }

    /// Replaces the collection, keeping the active sort.
    pub fn set_collection(&mut self, collection: Vec<Value>) {
        self.collection = collection;
    }

    /// The collection as given.
    pub fn collection(&self) -> &[Value] {
        &self.collection
    }

    /// The collection sorted by the active keys.
    pub fn data(&self) -> Vec<Value> {
        sort(&self.collection, self.state.active(), &self.formatters)
    }
}

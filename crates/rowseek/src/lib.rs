//! Rowseek - query and sort engine for collections of nested JSON records.
//!
//! Rowseek filters and orders in-memory collections the way a data table
//! does: records are [`serde_json::Value`] trees, columns are dot-separated
//! paths into them, and queries are short text expressions typed by a user.
//!
//! - Paths flatten nested objects into rows keyed by `a.b.c`
//! - Column formatters transform values (or derive new columns) before
//!   filtering and sorting
//! - A small query language with loose equality, patterns and numeric
//!   comparisons, combined with `and` / `or` and parentheses
//! - Hierarchical multi-key sorting with stable ties
//!
//! # Quick Start
//!
//! ```rust
//! use rowseek::{filter, sort, ColumnFormatters, SortKey};
//! use serde_json::json;
//!
//! let people = vec![
//!     json!({"person": {"firstName": "Anna", "lastName": "Cole"}, "age": 31}),
//!     json!({"person": {"firstName": "Bob", "lastName": "Hill"}, "age": 17}),
//!     json!({"person": {"firstName": "Carl", "lastName": "Cruz"}, "age": 45}),
//! ];
//!
//! let adults = filter(&people, "age >= 18 and person.lastName == /^c/i").unwrap();
//! assert_eq!(adults.len(), 2);
//!
//! let by_age = sort(&adults, &[SortKey::desc("age")], &ColumnFormatters::new());
//! assert_eq!(by_age[0]["person"]["firstName"], "Carl");
//! ```
//!
//! # Query Language
//!
//! A condition is `path operator literal`:
//!
//! | Operator | Meaning |
//! |----------|---------|
//! | `===` / `!==` | loose equality / inequality |
//! | `==` / `!=` | pattern matches / does not match |
//! | `>` `>=` `<` `<=` | numeric comparison |
//!
//! A pattern literal written `/pattern/flags` is used as written; any other
//! literal is a case-insensitive substring pattern. Literals containing
//! spaces are single-quoted: `name === 'night 41ruc'`.
//!
//! Conditions are joined with `and` or `or` (any case) and grouped with
//! parentheses. A single group may not mix `and` and `or`:
//!
//! ```text
//! (person.firstName == /^a/ and person.lastName == /^c/) or progress != /^3/
//! ```
//!
//! Blank or unparseable text filters nothing out. A query mixing `and` and
//! `or` in one group matches nothing.
//!
//! # Formatters
//!
//! [`ColumnFormatters`] map column names to functions. A formatter on a
//! leaf path transforms that leaf, one on a parent path receives the
//! rebuilt sub-object, and one on an unknown name receives the whole record
//! and creates a new column. Filtering applies only the formatters for
//! columns the query reads, sorting only those for sort keys, and the
//! records returned are always the originals.
//!
//! # Views
//!
//! [`Sorter`], [`Filter`] and [`TableView`] keep state between calls the way
//! an interactive table does: a toggling column sort, a cached query, and
//! both combined over one collection. [`ColumnLayout`] tracks column widths.

mod comparer;
mod error;
mod filter;
mod formatter;
mod group;
mod layout;
mod lexer;
mod op;
mod parser;
mod path;
mod query;
mod sort;
mod sorter;
mod value;
mod view;

// Re-export public API
pub use comparer::{build_pattern, Comparer, Operand};
pub use error::{Error, Result};
pub use filter::{filter, Filter};
pub use formatter::{ColumnFormatters, ColumnTarget, FormatFn, ResolvedFormatter, ResolvedFormatters};
pub use group::{Conjunction, Part, QueryGroup};
pub use layout::{Column, ColumnLayout, ColumnSpec, DEFAULT_WIDTH};
pub use lexer::{tokenize, Token};
pub use op::Operator;
pub use parser::{parse, parse_with, Parser, MAX_DEPTH};
pub use path::{flatten, unflatten, FlatRow, SEPARATOR};
pub use query::Query;
pub use sort::{sort, Direction, SortKey};
pub use sorter::{SortState, Sorter};
pub use value::{compare_for_sort, loose_eq, to_text};
pub use view::TableView;

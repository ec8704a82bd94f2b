//! Property-based tests for rowseek using proptest.

use std::cmp::Reverse;

use proptest::prelude::*;
use rowseek::{filter, flatten, sort, unflatten, ColumnFormatters, Query, SortKey};
use serde_json::{json, Map, Value};

// ============================================================================
// Strategies
// ============================================================================

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
        prop::collection::vec(any::<u8>(), 0..3).prop_map(|v| json!(v)),
    ]
}

/// Nested objects whose keys never contain the path separator. The empty
/// key is included.
fn record_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy()
        .prop_recursive(3, 24, 4, |inner| {
            prop::collection::btree_map("[a-z]{0,4}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
        })
        .prop_map(|value| match value {
            Value::Object(_) => value,
            leaf => json!({ "value": leaf }),
        })
}

fn row_strategy() -> impl Strategy<Value = Value> {
    (0i64..6, 0i64..6, "[a-c]{0,2}").prop_map(|(a, b, name)| json!({"a": a, "b": b, "name": name}))
}

fn numbered(rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter()
        .enumerate()
        .map(|(id, mut row)| {
            row["id"] = json!(id);
            row
        })
        .collect()
}

fn field(row: &Value, name: &str) -> i64 {
    row[name].as_i64().unwrap_or_default()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Flattening and rebuilding a record gives the record back.
    #[test]
    fn flatten_round_trip(record in record_strategy()) {
        prop_assert_eq!(unflatten(&flatten(&record)), record);
    }

    /// Filter should never return more records than the input.
    #[test]
    fn filter_never_grows_collection(
        rows in prop::collection::vec(row_strategy(), 0..60),
        threshold in 0i64..6,
    ) {
        let found = filter(&rows, &format!("a > {}", threshold)).unwrap();
        prop_assert!(found.len() <= rows.len());
        prop_assert!(found.iter().all(|r| field(r, "a") > threshold));
    }

    /// Filtering twice by the same query changes nothing the second time.
    #[test]
    fn filter_is_idempotent(
        rows in prop::collection::vec(row_strategy(), 0..60),
        threshold in 0i64..6,
        pattern in "[a-c]",
    ) {
        let query = format!("a >= {} or name == {}", threshold, pattern);
        let once = filter(&rows, &query).unwrap();
        let twice = filter(&once, &query).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// An empty query matches everything, in order.
    #[test]
    fn empty_query_matches_all(rows in prop::collection::vec(row_strategy(), 0..60)) {
        prop_assert_eq!(filter(&rows, "").unwrap(), rows);
    }

    /// Count should equal the length of filtered results.
    #[test]
    fn count_equals_filter_len(
        rows in prop::collection::vec(row_strategy(), 0..60),
        value in 0i64..6,
    ) {
        let query = Query::parse(&format!("b === {}", value));
        let formatters = ColumnFormatters::new();
        let found = query.filter(&rows, &formatters).unwrap();
        prop_assert_eq!(query.count(&rows, &formatters).unwrap(), found.len());
        prop_assert_eq!(found.len(), rows.iter().filter(|r| field(r, "b") == value).count());
    }

    /// AND is the intersection of its conditions, OR the union.
    #[test]
    fn and_or_are_set_operations(
        rows in prop::collection::vec(row_strategy(), 0..60),
        x in 0i64..6,
        y in 0i64..6,
    ) {
        let rows = numbered(rows);
        let left = filter(&rows, &format!("a < {}", x)).unwrap();
        let right = filter(&rows, &format!("b > {}", y)).unwrap();

        let both = filter(&rows, &format!("a < {} and b > {}", x, y)).unwrap();
        let expected: Vec<Value> = left.iter().filter(|r| right.contains(r)).cloned().collect();
        prop_assert_eq!(both, expected);

        let either = filter(&rows, &format!("a < {} or b > {}", x, y)).unwrap();
        let expected: Vec<Value> = rows
            .iter()
            .filter(|r| left.contains(r) || right.contains(r))
            .cloned()
            .collect();
        prop_assert_eq!(either, expected);
    }

    /// A hierarchical sort equals a stable sort by the key tuple.
    #[test]
    fn multi_key_sort_matches_tuple_sort(rows in prop::collection::vec(row_strategy(), 0..60)) {
        let rows = numbered(rows);
        let sorted = sort(
            &rows,
            &[SortKey::asc("a"), SortKey::desc("b")],
            &ColumnFormatters::new(),
        );

        let mut expected = rows.clone();
        expected.sort_by_key(|r| (field(r, "a"), Reverse(field(r, "b"))));
        prop_assert_eq!(sorted, expected);
    }

    /// Sorting returns a permutation of its input.
    #[test]
    fn sort_is_permutation(rows in prop::collection::vec(row_strategy(), 0..60)) {
        let rows = numbered(rows);
        let sorted = sort(&rows, &[SortKey::desc("name")], &ColumnFormatters::new());
        prop_assert_eq!(sorted.len(), rows.len());

        let mut ids: Vec<i64> = sorted.iter().map(|r| field(r, "id")).collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..rows.len() as i64).collect::<Vec<_>>());
    }
}

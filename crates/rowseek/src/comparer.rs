//! Single conditions of a query.
//!
//! A [`Comparer`] is one `path operator literal` condition. The literal is
//! compiled once, when the comparer is built, into the [`Operand`] its
//! operator needs: a plain value for equality, a [`Regex`] for pattern
//! tests, a number for ordering.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::op::Operator;
use crate::path::FlatRow;
use crate::value::{self, as_number, loose_eq, parse_number, to_text};

/// A single condition: a row path, an operator, and a compiled literal.
///
/// # Example
///
/// ```
/// use rowseek::{flatten, Comparer, Operator};
/// use serde_json::json;
///
/// let row = flatten(&json!({"person": {"firstName": "Anna"}}));
/// let comparer = Comparer::new("person.firstName", Operator::Matches, json!("an"))
///     .unwrap();
/// assert!(comparer.matches(&row).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Comparer {
    left: String,
    op: Operator,
    right: Operand,
}

/// The right-hand side of a [`Comparer`], shaped by its operator.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Literal for `===` / `!==`.
    Literal(Value),
    /// Compiled pattern for `==` / `!=`.
    Pattern(Regex),
    /// Number for `>`, `>=`, `<`, `<=`. NaN when the literal is not numeric.
    Number(f64),
}

impl Comparer {
    /// Builds a comparer, compiling `right` for `op`.
    ///
    /// Returns `None` only when a pattern cannot be compiled even after
    /// escaping it, which the parser treats like a malformed condition.
    pub fn new(left: impl Into<String>, op: Operator, right: impl Into<Value>) -> Option<Self> {
        let right = right.into();
        let right = match op {
            Operator::Eq | Operator::NotEq => Operand::Literal(right),
            Operator::Matches | Operator::NotMatches => {
                Operand::Pattern(build_pattern(&to_text(Some(&right)))?)
            }
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                let number = match &right {
                    Value::Number(_) => as_number(&right).unwrap_or(f64::NAN),
                    other => parse_number(&to_text(Some(other))),
                };
                Operand::Number(number)
            }
        };
        Some(Comparer {
            left: left.into(),
            op,
            right,
        })
    }

    /// The row path this condition reads.
    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn right(&self) -> &Operand {
        &self.right
    }

    /// Evaluates this condition against a flattened, formatted row.
    ///
    /// A path missing from the row is absent, not an error: it is never
    /// loosely equal to a literal, tests patterns as empty text, and fails
    /// every ordering comparison. An ordering operator applied to a leaf
    /// that is present but not a number is an [`Error::InvalidComparison`].
    pub fn matches(&self, row: &FlatRow) -> Result<bool> {
        let leaf = row.get(&self.left);
        match &self.right {
            Operand::Literal(literal) => {
                let equal = loose_eq(leaf, literal);
                Ok(equal != self.op.is_negated())
            }
            Operand::Pattern(regex) => {
                let hit = regex.is_match(&to_text(leaf));
                Ok(hit != self.op.is_negated())
            }
            Operand::Number(number) => match leaf {
                None | Some(Value::Null) => Ok(false),
                Some(Value::Number(_)) => {
                    let ordering = leaf.and_then(as_number).and_then(|n| n.partial_cmp(number));
                    Ok(self.op.eval_ordering(ordering))
                }
                Some(other) => Err(Error::InvalidComparison {
                    path: self.left.clone(),
                    operator: self.op,
                    value: format!("{} {}", value::type_name(Some(other)), other),
                }),
            },
        }
    }
}

/// Compiles a pattern literal.
///
/// `/pattern/flags` uses the pattern and flags as written; any other literal
/// is an unanchored, case-insensitive pattern. A pattern the regex engine
/// rejects is escaped and compiled again, so it matches as literal text.
pub fn build_pattern(literal: &str) -> Option<Regex> {
    let (pattern, flags) = split_delimited(literal).unwrap_or((literal, "i"));
    match compile(pattern, flags) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::debug!(%pattern, error = %err, "invalid pattern, matching it literally");
            match compile(&regex::escape(pattern), flags) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(%pattern, error = %err, "escaped pattern failed to compile");
                    None
                }
            }
        }
    }
}

/// Splits `/pattern/flags` into its parts. The closing slash is the last
/// one, and must come after the opening one.
fn split_delimited(literal: &str) -> Option<(&str, &str)> {
    let rest = literal.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    Some((&rest[..close], &rest[close + 1..]))
}

fn compile(pattern: &str, flags: &str) -> std::result::Result<Regex, regex::Error> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            // Global, sticky, indices and unicode modes change nothing for a
            // single test.
            'g' | 'y' | 'd' | 'u' | 'v' => {}
            other => tracing::debug!(flag = %other, "ignoring unknown pattern flag"),
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::flatten;
    use serde_json::json;

    fn row() -> FlatRow {
        flatten(&json!({
            "name": "Anna",
            "progress": 38,
            "active": true,
            "person": {"firstName": "night 41ruc"},
        }))
    }

    fn check(left: &str, op: Operator, right: &str) -> bool {
        Comparer::new(left, op, right).unwrap().matches(&row()).unwrap()
    }

    #[test]
    fn loose_equality() {
        assert!(check("progress", Operator::Eq, "38"));
        assert!(!check("progress", Operator::Eq, "37"));
        assert!(check("progress", Operator::NotEq, "37"));
        assert!(check("person.firstName", Operator::Eq, "night 41ruc"));
        assert!(check("active", Operator::Eq, "true"));
        // Missing path is never equal, always unequal
        assert!(!check("missing", Operator::Eq, "x"));
        assert!(check("missing", Operator::NotEq, "x"));
    }

    #[test]
    fn default_pattern_is_case_insensitive_substring() {
        assert!(check("name", Operator::Matches, "nn"));
        assert!(check("name", Operator::Matches, "a"));
        assert!(check("name", Operator::Matches, "A"));
        assert!(!check("name", Operator::Matches, "x"));
        assert!(check("name", Operator::NotMatches, "x"));
    }

    #[test]
    fn delimited_pattern_uses_flags() {
        assert!(check("name", Operator::Matches, "/^A/"));
        assert!(!check("name", Operator::Matches, "/^a/"));
        assert!(check("name", Operator::Matches, "/^a/i"));
        assert!(check("progress", Operator::Matches, r"/^3\d*$/"));
        assert!(!check("progress", Operator::NotMatches, r"/^3\d*$/"));
    }

    #[test]
    fn lone_slash_is_not_delimited() {
        // "/test" has no closing slash: the whole literal is the pattern
        let comparer = Comparer::new("name", Operator::Matches, "/test").unwrap();
        match comparer.right() {
            Operand::Pattern(regex) => assert_eq!(regex.as_str(), "/test"),
            other => panic!("unexpected operand {:?}", other),
        }
        assert!(!comparer.matches(&row()).unwrap());
    }

    #[test]
    fn invalid_pattern_falls_back_to_literal_text() {
        let r = flatten(&json!({"expr": "f(a"}));
        let comparer = Comparer::new("expr", Operator::Matches, "(a").unwrap();
        assert!(comparer.matches(&r).unwrap());
        let comparer = Comparer::new("expr", Operator::Matches, "/[/").unwrap();
        assert!(!comparer.matches(&r).unwrap());
    }

    #[test]
    fn ordering_operators() {
        assert!(check("progress", Operator::Gt, "37"));
        assert!(!check("progress", Operator::Gt, "38"));
        assert!(check("progress", Operator::Gte, "38"));
        assert!(check("progress", Operator::Lt, "39.5"));
        assert!(check("progress", Operator::Lte, "38"));
    }

    #[test]
    fn non_numeric_literal_never_matches() {
        assert!(!check("progress", Operator::Gt, "abc"));
        assert!(!check("progress", Operator::Lte, "abc"));
    }

    #[test]
    fn ordering_on_missing_path_is_false() {
        assert!(!check("missing", Operator::Gt, "1"));
        assert!(!check("missing", Operator::Lt, "1"));
    }

    #[test]
    fn ordering_on_non_numeric_leaf_is_an_error() {
        let comparer = Comparer::new("name", Operator::Gt, "1").unwrap();
        let err = comparer.matches(&row()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidComparison { ref path, operator: Operator::Gt, .. } if path == "name"
        ));
    }

    #[test]
    fn numeric_literal_value() {
        let comparer = Comparer::new("progress", Operator::Gte, json!(38)).unwrap();
        assert!(comparer.matches(&row()).unwrap());
    }

    #[test]
    fn split_delimited_literals() {
        assert_eq!(split_delimited("/abc/gi"), Some(("abc", "gi")));
        assert_eq!(split_delimited("/a/b/"), Some(("a/b", "")));
        assert_eq!(split_delimited("/abc"), None);
        assert_eq!(split_delimited("abc"), None);
    }
}

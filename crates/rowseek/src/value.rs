//! Scalar coercions shared by the evaluator and the sort engine.
//!
//! Records are plain [`serde_json::Value`] trees. Once flattened, every
//! comparison works on a leaf that may be absent from the row, so the helpers
//! here take `Option<&Value>` and define how an absent leaf behaves.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

/// Returns the numeric value of a leaf, if it is a JSON number.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parses a query literal as a number.
///
/// Surrounding whitespace is ignored. Anything that is not a number
/// (including the empty string) becomes NaN, which makes every ordering
/// comparison against it false.
pub fn parse_number(literal: &str) -> f64 {
    literal.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Coerces a leaf to the text a pattern is tested against.
///
/// Strings are used as-is; integral numbers print without a fractional
/// part; booleans print as `true`/`false`; absent and null leaves are empty;
/// arrays and objects print as compact JSON.
pub fn to_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(Value::Bool(b)) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Some(Value::Number(n)) => Cow::Owned(number_text(n)),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Loose equality between a row leaf and a query literal.
///
/// The literal is coerced toward the leaf's type: numeric leaves compare
/// against the literal read as a number, boolean leaves against the text
/// `true`/`false`, string leaves textually. An absent or null leaf is never
/// equal to anything but a null literal.
pub fn loose_eq(leaf: Option<&Value>, literal: &Value) -> bool {
    let Some(leaf) = leaf else {
        return false;
    };
    match (leaf, literal) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(_), Value::Number(_)) => as_number(leaf) == as_number(literal),
        (Value::Number(_), Value::String(s)) | (Value::String(s), Value::Number(_)) => {
            let number = as_number(leaf).or_else(|| as_number(literal));
            number == Some(parse_number(s))
        }
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
            match s.trim() {
                "true" => *b,
                "false" => !*b,
                _ => false,
            }
        }
        (Value::Array(_) | Value::Object(_), Value::String(s)) => to_text(Some(leaf)) == *s,
        _ => leaf == literal,
    }
}

/// Default ordering used by the sort engine.
///
/// Two numbers compare numerically; anything else compares by its text,
/// so an absent leaf behaves like the empty string and sorts first in
/// ascending order.
pub fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(as_number), b.and_then(as_number)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => to_text(a).cmp(&to_text(b)),
    }
}

/// Short description of a leaf's JSON type, used in error messages.
pub fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

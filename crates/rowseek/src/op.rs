//! Comparison operators of the query language.
//!
//! The [`Operator`] enum lists every token a condition may use between its
//! path and its literal. Tokens outside this set are unknown; the parser
//! drops conditions that use them.

use std::cmp::Ordering;
use std::str::FromStr;

/// Comparison operator for a single condition.
///
/// Operators fall in three families:
/// - **Equality**: `===`, `!==` - loose (type-coercing) equality
/// - **Pattern**: `==`, `!=` - regular-expression test on the value's text
/// - **Ordering**: `>`, `>=`, `<`, `<=` - numeric comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `===` - loose equality.
    Eq,
    /// `!==` - loose inequality.
    NotEq,
    /// `==` - value matches the pattern.
    Matches,
    /// `!=` - value does not match the pattern.
    NotMatches,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl Operator {
    /// Every operator, in token-length order for display purposes.
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Matches,
        Operator::NotMatches,
        Operator::Gte,
        Operator::Lte,
        Operator::Gt,
        Operator::Lt,
    ];

    /// Looks up an operator by its query-language token.
    pub fn from_token(token: &str) -> Option<Operator> {
        match token {
            "===" => Some(Operator::Eq),
            "!==" => Some(Operator::NotEq),
            "==" => Some(Operator::Matches),
            "!=" => Some(Operator::NotMatches),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Gte),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Lte),
            _ => None,
        }
    }

    /// Returns `true` for the loose-equality operators.
    pub fn is_equality(self) -> bool {
        matches!(self, Operator::Eq | Operator::NotEq)
    }

    /// Returns `true` for the regular-expression operators.
    pub fn is_pattern(self) -> bool {
        matches!(self, Operator::Matches | Operator::NotMatches)
    }

    /// Returns `true` for the numeric ordering operators.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }

    /// Returns `true` if the operator negates its base test.
    pub fn is_negated(self) -> bool {
        matches!(self, Operator::NotEq | Operator::NotMatches)
    }

    /// Evaluates an ordering operator given the result of comparing the row
    /// value against the literal.
    ///
    /// An unordered comparison (`None`, e.g. against NaN) never holds.
    pub fn eval_ordering(self, ordering: Option<Ordering>) -> bool {
        let Some(ordering) = ordering else {
            return false;
        };
        match self {
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
            _ => false, // Not an ordering-based operator
        }
    }

    /// Returns the query-language token of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "===",
            Operator::NotEq => "!==",
            Operator::Matches => "==",
            Operator::NotMatches => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::from_token(s).ok_or(())
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

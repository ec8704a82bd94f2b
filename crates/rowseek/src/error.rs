//! Error types for the rowseek crate.

use thiserror::Error;

use crate::op::Operator;

/// Errors surfaced while evaluating a query.
///
/// Parsing never fails: ambiguous groups and unknown operators degrade to
/// an empty result or a condition that never matches. The only hard
/// failure is an ordering operator applied to a value that is not a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A numeric operator (`>`, `>=`, `<`, `<=`) met a non-numeric row value.
    #[error("operator '{operator}' needs a numeric value at '{path}', got {value}")]
    InvalidComparison {
        path: String,
        operator: Operator,
        value: String,
    },
}

/// Result type for rowseek operations.
pub type Result<T> = std::result::Result<T, Error>;

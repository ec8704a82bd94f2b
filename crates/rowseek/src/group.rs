//! Boolean groups of conditions.
//!
//! A [`QueryGroup`] joins its parts with a single [`Conjunction`]. Parts are
//! conditions or nested groups, so a whole query is one tree of groups.

use std::fmt;

use crate::comparer::Comparer;
use crate::error::Result;
use crate::op::Operator;
use crate::path::FlatRow;

/// The logical operator applied across a group's direct children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Conjunction {
    /// Every part must match. An empty AND group matches.
    #[default]
    And,
    /// At least one part must match. An empty OR group does not match.
    Or,
}

impl Conjunction {
    pub fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A direct child of a [`QueryGroup`].
#[derive(Debug, Clone)]
pub enum Part {
    Compare(Comparer),
    Group(QueryGroup),
    /// A condition whose operator is not recognised. It never matches.
    Unknown { left: String, operator: String },
}

impl Part {
    fn matches(&self, row: &FlatRow) -> Result<bool> {
        match self {
            Part::Compare(comparer) => comparer.matches(row),
            Part::Group(group) => group.matches(row),
            Part::Unknown { .. } => Ok(false),
        }
    }
}

/// A group of conditions sharing one conjunction.
///
/// # Example
///
/// ```
/// use rowseek::{flatten, Conjunction, Operator, QueryGroup};
/// use serde_json::json;
///
/// // (age > 10 and status === single) or progress == /^9/
/// let inner = QueryGroup::new(Conjunction::And)
///     .add_compare("age", Operator::Gt, "10")
///     .add_compare("status", Operator::Eq, "single");
/// let query = QueryGroup::new(Conjunction::Or)
///     .add_group(inner)
///     .add_compare("progress", Operator::Matches, "/^9/");
///
/// let row = flatten(&json!({"age": 4, "status": "single", "progress": 93}));
/// assert!(query.matches(&row).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryGroup {
    conjunction: Conjunction,
    parts: Vec<Part>,
}

impl QueryGroup {
    /// Creates an empty group.
    pub fn new(conjunction: Conjunction) -> Self {
        QueryGroup {
            conjunction,
            parts: Vec::new(),
        }
    }

    pub fn from_parts(conjunction: Conjunction, parts: Vec<Part>) -> Self {
        QueryGroup { conjunction, parts }
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Adds a condition, compiling its literal for the operator.
    ///
    /// A pattern that cannot be compiled even as literal text is skipped.
    pub fn add_compare(
        mut self,
        left: impl Into<String>,
        op: Operator,
        right: impl Into<serde_json::Value>,
    ) -> Self {
        if let Some(comparer) = Comparer::new(left, op, right) {
            self.parts.push(Part::Compare(comparer));
        }
        self
    }

    /// Adds an already-built condition.
    pub fn push_comparer(&mut self, comparer: Comparer) {
        self.parts.push(Part::Compare(comparer));
    }

    /// Adds a nested group.
    pub fn add_group(mut self, group: QueryGroup) -> Self {
        self.parts.push(Part::Group(group));
        self
    }

    pub fn push_group(&mut self, group: QueryGroup) {
        self.parts.push(Part::Group(group));
    }

    /// Evaluates the group against a flattened, formatted row.
    ///
    /// AND stops at the first part that does not match, OR at the first
    /// that does. Evaluation errors from a part stop the walk and are
    /// returned as-is.
    pub fn matches(&self, row: &FlatRow) -> Result<bool> {
        match self.conjunction {
            Conjunction::And => {
                for part in &self.parts {
                    if !part.matches(row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Conjunction::Or => {
                for part in &self.parts {
                    if part.matches(row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Every row path read by a condition in this tree, in order of
    /// appearance, without duplicates.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, acc: &mut Vec<&'a str>) {
        for part in &self.parts {
            match part {
                Part::Compare(comparer) => {
                    if !acc.contains(&comparer.left()) {
                        acc.push(comparer.left());
                    }
                }
                Part::Group(group) => group.collect_paths(acc),
                Part::Unknown { .. } => {}
            }
        }
    }
}

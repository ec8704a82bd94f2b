//! Query parser - builds a [`QueryGroup`] tree from tokens.
//!
//! Grammar:
//!
//! ```text
//! group     := element (connector element)*
//! element   := '(' group ')' | condition
//! condition := path operator literal
//! connector := 'and' | 'or'
//! ```
//!
//! The whole query is one implicit group. Every parenthesized group becomes
//! a nested [`QueryGroup`]. A group joins its elements with a single
//! connector: one that uses both `and` and `or` has no defined precedence,
//! and the whole query is rejected as [`Query::MatchNone`]. A group with no
//! connector (a single element) is an OR group.
//!
//! The parser is forgiving everywhere else:
//! - a condition with fewer than three words is dropped;
//! - words after the literal of a condition are ignored;
//! - a condition with an unknown operator is kept as a condition that
//!   never matches;
//! - a group containing nothing parsed is dropped from its parent, and when
//!   the outermost group is dropped there is no filter at all;
//! - a missing `)` closes at the end of input and a stray `)` is ignored.

use serde_json::Value;

use crate::comparer::Comparer;
use crate::formatter::ColumnFormatters;
use crate::group::{Conjunction, Part, QueryGroup};
use crate::lexer::{tokenize, Token};
use crate::op::Operator;
use crate::query::Query;

/// Groups nested deeper than this reject the query.
pub const MAX_DEPTH: usize = 64;

/// Why a query was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    /// A group mixes `and` and `or`.
    Ambiguous,
    /// Groups nest deeper than [`MAX_DEPTH`].
    TooDeep,
}

/// The query parser.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    value_formatters: Option<&'a ColumnFormatters>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input`.
    pub fn new(input: &str) -> Self {
        Parser {
            tokens: tokenize(input),
            position: 0,
            depth: 0,
            value_formatters: None,
        }
    }

    /// Normalises literals through `formatters` before they are compiled.
    ///
    /// The formatter registered under a condition's path receives the
    /// literal as a JSON string and its result becomes the literal.
    pub fn with_value_formatters(mut self, formatters: &'a ColumnFormatters) -> Self {
        if !formatters.is_empty() {
            self.value_formatters = Some(formatters);
        }
        self
    }

    /// Parses the whole input.
    pub fn parse(mut self) -> Query {
        if self.tokens.is_empty() {
            return Query::MatchAll;
        }
        match self.parse_group(true) {
            Ok(Some(group)) => Query::Group(group),
            Ok(None) => {
                tracing::debug!("query has no usable condition, matching everything");
                Query::MatchAll
            }
            Err(rejection) => {
                tracing::debug!(?rejection, "query rejected, matching nothing");
                Query::MatchNone
            }
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Parses elements up to the closing `)` of this group (or the end of
    /// input). Returns `None` when nothing in the group was parsed.
    fn parse_group(&mut self, outermost: bool) -> Result<Option<QueryGroup>, Rejection> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Rejection::TooDeep);
        }

        let mut parts = Vec::new();
        let mut connector: Option<Conjunction> = None;
        let mut parsed_any = false;
        let mut expect_element = true;

        while let Some(token) = self.peek() {
            match token {
                Token::Close => {
                    self.advance();
                    if outermost {
                        tracing::trace!("ignoring unbalanced ')'");
                        continue;
                    }
                    break;
                }
                Token::And | Token::Or => {
                    let next = if *token == Token::And {
                        Conjunction::And
                    } else {
                        Conjunction::Or
                    };
                    self.advance();
                    match connector {
                        Some(previous) if previous != next => return Err(Rejection::Ambiguous),
                        _ => connector = Some(next),
                    }
                    expect_element = true;
                }
                _ if !expect_element => self.skip_stray(),
                _ => {
                    expect_element = false;
                    parsed_any |= self.parse_element(&mut parts)?;
                }
            }
        }

        self.depth -= 1;
        if !parsed_any {
            return Ok(None);
        }
        let conjunction = connector.unwrap_or(Conjunction::Or);
        Ok(Some(QueryGroup::from_parts(conjunction, parts)))
    }

    /// Parses one element into `parts`. Returns `true` if it was a
    /// well-formed condition or a non-empty nested group.
    fn parse_element(&mut self, parts: &mut Vec<Part>) -> Result<bool, Rejection> {
        if self.peek() == Some(&Token::Open) {
            self.advance();
            return match self.parse_group(false)? {
                Some(inner) => {
                    parts.push(Part::Group(inner));
                    Ok(true)
                }
                None => Ok(false),
            };
        }

        let mut words = Vec::new();
        while let Some(text) = self.peek().and_then(Token::text) {
            words.push(text.to_string());
            self.advance();
        }

        let [left, operator, literal, rest @ ..] = words.as_slice() else {
            tracing::debug!(condition = %words.join(" "), "dropping malformed condition");
            return Ok(false);
        };
        if !rest.is_empty() {
            tracing::trace!(ignored = %rest.join(" "), "ignoring words after condition");
        }

        let Some(op) = Operator::from_token(operator) else {
            tracing::debug!(%operator, "unknown operator, condition never matches");
            parts.push(Part::Unknown {
                left: left.clone(),
                operator: operator.clone(),
            });
            return Ok(true);
        };

        let literal = self.format_literal(left, Value::String(literal.clone()));
        if let Some(comparer) = Comparer::new(left.clone(), op, literal) {
            parts.push(Part::Compare(comparer));
        }
        Ok(true)
    }

    fn format_literal(&self, path: &str, literal: Value) -> Value {
        match self.value_formatters {
            Some(formatters) => formatters.format_value(path, &literal).unwrap_or(literal),
            None => literal,
        }
    }

    /// Skips tokens that follow an element without a connector, up to the
    /// next connector or the `)` closing the current group.
    fn skip_stray(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::Open => depth += 1,
                Token::Close if depth == 0 => return,
                Token::Close => depth -= 1,
                Token::And | Token::Or if depth == 0 => return,
                _ => {}
            }
            tracing::trace!(?token, "skipping stray token");
            self.advance();
        }
    }
}

/// Parses a query string.
///
/// Blank input, or input without a single well-formed condition, parses to
/// [`Query::MatchAll`]. Input mixing `and` and `or` in one group parses to
/// [`Query::MatchNone`].
pub fn parse(input: &str) -> Query {
    Parser::new(input.trim()).parse()
}

/// Parses a query string, normalising literals through `value_formatters`.
pub fn parse_with(input: &str, value_formatters: &ColumnFormatters) -> Query {
    Parser::new(input.trim())
        .with_value_formatters(value_formatters)
        .parse()
}

//! Query lexer - splits query text into tokens.
//!
//! The query language has very little syntax: parentheses, the connector
//! words `and` / `or` (any case), single-quoted literals and bare words.
//! Everything else (paths, operators, patterns) is a bare word, so the
//! lexer only has to find word boundaries.
//!
//! Parentheses are structural only at a word boundary. Inside a word they
//! are kept, balanced, so a pattern such as `/^(a|b)$/` stays one word while
//! the `)` in `age > 10)` still closes a group.

/// A token of the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `(`
    Open,
    /// `)`
    Close,
    /// The `and` connector.
    And,
    /// The `or` connector.
    Or,
    /// A bare word: path, operator or unquoted literal.
    Word(String),
    /// A single-quoted literal, quotes removed.
    Quoted(String),
}

impl Token {
    /// Returns the literal text of a word or quoted token.
    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Word(s) | Token::Quoted(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_connector(&self) -> bool {
        matches!(self, Token::And | Token::Or)
    }
}

/// The query lexer.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Tokenizes the whole input.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            self.position += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let token = match self.current_char()? {
            '(' => {
                self.advance();
                Token::Open
            }
            ')' => {
                self.advance();
                Token::Close
            }
            '\'' => self.read_quoted(),
            _ => {
                let word = self.read_word();
                if word.eq_ignore_ascii_case("and") {
                    Token::And
                } else if word.eq_ignore_ascii_case("or") {
                    Token::Or
                } else {
                    Token::Word(word)
                }
            }
        };
        Some(token)
    }

    /// Reads a quoted literal.
    ///
    /// The closing quote is the first `'` followed by whitespace, `)` or the
    /// end of input, so quotes inside a literal (`'O'Brien'`) need no
    /// escaping. An unterminated literal runs to the end of input.
    fn read_quoted(&mut self) -> Token {
        self.advance(); // Skip opening quote
        let start = self.position;
        while let Some(c) = self.current_char() {
            if c == '\'' {
                let end = self.position;
                self.advance();
                match self.current_char() {
                    None | Some(')') => return Token::Quoted(self.input[start..end].to_string()),
                    Some(next) if next.is_whitespace() => {
                        return Token::Quoted(self.input[start..end].to_string())
                    }
                    _ => continue,
                }
            }
            self.advance();
        }
        Token::Quoted(self.input[start..].to_string())
    }

    /// Reads a bare word up to whitespace or an unbalanced `)`.
    fn read_word(&mut self) -> String {
        let start = self.position;
        let mut depth = 0usize;
        while let Some(c) = self.current_char() {
            match c {
                c if c.is_whitespace() => break,
                '(' => depth += 1,
                ')' if depth == 0 => break,
                ')' => depth -= 1,
                _ => {}
            }
            self.advance();
        }
        self.input[start..self.position].to_string()
    }
}

/// Tokenizes `input`.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn simple_condition() {
        assert_eq!(
            tokenize("progress === 38"),
            vec![word("progress"), word("==="), word("38")]
        );
    }

    #[test]
    fn connectors_any_case() {
        assert_eq!(
            tokenize("a == 1 AND b == 2 Or c"),
            vec![
                word("a"),
                word("=="),
                word("1"),
                Token::And,
                word("b"),
                word("=="),
                word("2"),
                Token::Or,
                word("c"),
            ]
        );
    }

    #[test]
    fn connector_must_be_whole_word() {
        assert_eq!(tokenize("Alexander"), vec![word("Alexander")]);
        assert_eq!(tokenize("order"), vec![word("order")]);
    }

    #[test]
    fn parentheses() {
        assert_eq!(
            tokenize("(age > 10)"),
            vec![Token::Open, word("age"), word(">"), word("10"), Token::Close]
        );
        assert_eq!(
            tokenize("((a == b))"),
            vec![
                Token::Open,
                Token::Open,
                word("a"),
                word("=="),
                word("b"),
                Token::Close,
                Token::Close
            ]
        );
    }

    #[test]
    fn parentheses_inside_pattern() {
        assert_eq!(
            tokenize("(name == /^(a|b)$/)"),
            vec![
                Token::Open,
                word("name"),
                word("=="),
                word("/^(a|b)$/"),
                Token::Close
            ]
        );
    }

    #[test]
    fn quoted_literals() {
        assert_eq!(
            tokenize("name === 'night 41ruc'"),
            vec![
                word("name"),
                word("==="),
                Token::Quoted("night 41ruc".to_string())
            ]
        );
        assert_eq!(
            tokenize("(name === 'a and b')"),
            vec![
                Token::Open,
                word("name"),
                word("==="),
                Token::Quoted("a and b".to_string()),
                Token::Close
            ]
        );
        assert_eq!(
            tokenize("name === 'O'Brien'"),
            vec![
                word("name"),
                word("==="),
                Token::Quoted("O'Brien".to_string())
            ]
        );
        assert_eq!(tokenize("''"), vec![Token::Quoted(String::new())]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(
            tokenize("name === 'abc def"),
            vec![
                word("name"),
                word("==="),
                Token::Quoted("abc def".to_string())
            ]
        );
    }

    #[test]
    fn unicode_words() {
        assert_eq!(
            tokenize("name == ñandú"),
            vec![word("name"), word("=="), word("ñandú")]
        );
    }

    #[test]
    fn token_text() {
        assert_eq!(word("x").text(), Some("x"));
        assert_eq!(Token::Quoted("y".into()).text(), Some("y"));
        assert_eq!(Token::Open.text(), None);
        assert!(Token::And.is_connector());
        assert!(!Token::Close.is_connector());
    }
}

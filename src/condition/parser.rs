//! Recursive descent parser for conditions
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or        := and ( OR and )*
//! and       := factor ( AND factor )*
//! factor    := '(' or ')' | condition
//! condition := IDENT ( IN '(' value ( ',' value )* [','] ')' | CMP expr )
//! ```
//!
//! A chain of same-precedence terms becomes one n-ary node, so recursion
//! depth follows parenthesis nesting only.

use smallvec::smallvec;

use crate::condition::ast::{Comparison, Condition, Expression, Operator, Values};
use crate::condition::token::{tokenize, Token};
use crate::error::{CaseError, Result};

/// Deepest parenthesis nesting accepted before the parser gives up
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse a condition string into an AST
pub fn parse(condition: &str) -> Result<Expression> {
    let tokens = tokenize(condition);
    parse_tokens(&tokens)
}

/// Parse an already tokenized condition; every token must be consumed
pub fn parse_tokens(tokens: &[Token]) -> Result<Expression> {
    let mut cursor = Cursor::new(tokens);
    let expr = cursor.parse_or()?;
    if let Some(tok) = cursor.peek() {
        return Err(cursor.error(format!("unexpected token '{}'", tok)));
    }
    Ok(expr)
}

/// Normalize a single value token: quotes removed, numbers in canonical form
pub fn parse_value_token(token: &Token) -> String {
    match token {
        Token::Literal(text) => unquote(text).to_string(),
        Token::Word(text) => canonical_number(text).unwrap_or_else(|| text.clone()),
        other => other.to_string(),
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text)
}

fn canonical_number(text: &str) -> Option<String> {
    // Words such as "inf" or "nan" parse as floats; only digit-led text is numeric here
    let first = text.chars().next()?;
    if !(first.is_ascii_digit() || first == '.') {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        let digits = text.trim_start_matches('0');
        return Some(if digits.is_empty() { "0" } else { digits }.to_string());
    }
    if !text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        return None;
    }
    text.parse::<f64>().ok().map(|f| format!("{:?}", f))
}

/// Token cursor threaded through the parse functions
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, msg: String) -> CaseError {
        CaseError::Syntax(format!("{} at token {}", msg, self.pos))
    }

    fn expect(&mut self, expected: &Token, context: &str) -> Result<()> {
        match self.peek() {
            Some(tok) if tok == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(tok) => Err(self.error(format!(
                "expected '{}' {}, found '{}'",
                expected, context, tok
            ))),
            None => Err(self.error(format!(
                "expected '{}' {}, found end of input",
                expected, context
            ))),
        }
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut terms = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            terms.push(self.parse_and()?);
        }
        Ok(match terms.len() {
            1 => terms.remove(0),
            _ => Expression::Or(terms),
        })
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut terms = vec![self.parse_factor()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            terms.push(self.parse_factor()?);
        }
        Ok(match terms.len() {
            1 => terms.remove(0),
            _ => Expression::And(terms),
        })
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        if self.peek() == Some(&Token::OpenParen) {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(self.error(format!(
                    "parentheses nested deeper than {}",
                    MAX_NESTING_DEPTH
                )));
            }
            self.pos += 1;
            self.depth += 1;
            let inner = self.parse_or()?;
            self.expect(&Token::CloseParen, "to close group")?;
            self.depth -= 1;
            return Ok(inner);
        }
        self.parse_condition()
    }

    fn parse_condition(&mut self) -> Result<Expression> {
        let column = match self.advance() {
            Some(Token::Word(name)) => name,
            Some(tok) => return Err(self.error(format!("expected column name, found '{}'", tok))),
            None => return Err(self.error("expected column name, found end of input".into())),
        };

        let condition = match self.advance() {
            Some(Token::In) => {
                self.expect(&Token::OpenParen, "after IN")?;
                let values = self.parse_value_list()?;
                Condition::new(column, Operator::In, values)
            }
            Some(Token::Comparison(op)) => {
                let value = self.parse_value_expression(*op)?;
                let operator = match op {
                    Comparison::Equal => Operator::Equal,
                    other => Operator::Tagged(*other),
                };
                Condition::new(column, operator, smallvec![value])
            }
            Some(tok) => {
                return Err(self.error(format!(
                    "expected comparison operator after '{}', found '{}'",
                    column, tok
                )))
            }
            None => {
                return Err(self.error(format!(
                    "expected comparison operator after '{}', found end of input",
                    column
                )))
            }
        };

        Ok(Expression::Condition(condition))
    }

    /// Values of an IN list; the opening paren is already consumed. A
    /// trailing comma before `)` is accepted.
    fn parse_value_list(&mut self) -> Result<Values> {
        let mut values = Values::new();
        if self.peek() == Some(&Token::CloseParen) {
            self.pos += 1;
            return Ok(values);
        }
        loop {
            match self.advance() {
                Some(tok) if tok.is_value() => values.push(parse_value_token(tok)),
                Some(tok) => return Err(self.error(format!("expected value in IN list, found '{}'", tok))),
                None => return Err(self.error("unclosed IN list".into())),
            }
            match self.advance() {
                Some(Token::Comma) => {
                    if self.peek() == Some(&Token::CloseParen) {
                        self.pos += 1;
                        return Ok(values);
                    }
                }
                Some(Token::CloseParen) => return Ok(values),
                Some(tok) => {
                    return Err(self.error(format!("expected ',' or ')' in IN list, found '{}'", tok)))
                }
                None => return Err(self.error("unclosed IN list".into())),
            }
        }
    }

    /// Everything after a comparison operator up to the next top-level AND/OR
    /// or an unmatched `)`. `=` with one token yields the plain value; any
    /// other operator yields an opaque `"<op> <expr>"` tag.
    fn parse_value_expression(&mut self, op: Comparison) -> Result<String> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok {
                Token::And | Token::Or | Token::Then if depth == 0 => break,
                Token::OpenParen => depth += 1,
                Token::CloseParen => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.pos += 1;
        }

        if depth != 0 {
            return Err(self.error("unbalanced parentheses in value expression".into()));
        }

        let parts = &self.tokens[start..self.pos];
        match (op, parts) {
            (_, []) => Err(self.error(format!("expected value after '{}'", op.symbol()))),
            (Comparison::Equal, [single]) => Ok(parse_value_token(single)),
            (Comparison::Equal, _) => Ok(join_tokens(parts)),
            (other, _) => Ok(format!("{} {}", other.symbol(), join_tokens(parts))),
        }
    }
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

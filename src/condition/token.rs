//! Condition tokenizer
//!
//! Splits a SQL-like boolean condition into a flat token stream. Scanning is
//! an ordered alternation: two-character operators first, then keywords,
//! punctuation, quoted literals and finally identifiers. Characters that match
//! none of these are dropped, so loosely formatted rule files still tokenize.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::condition::ast::Comparison;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<=|>=|!=|<>|==|=>|\b(?:AND|OR|IN|THEN)\b|[(),=<>]|'[^']*'|@?[\w.]+",
    )
    .expect("token pattern is a valid regex")
});

/// Lexical token of a condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Comparison operator, with `<>` already folded into `!=`
    Comparison(Comparison),
    And,
    Or,
    In,
    Then,
    OpenParen,
    CloseParen,
    Comma,
    /// Single-quoted literal, quotes included
    Literal(String),
    /// Column name, bare value or `@param` marker
    Word(String),
}

impl Token {
    /// Whether this token can stand as a value (inside an IN list or after `=`)
    pub fn is_value(&self) -> bool {
        matches!(self, Token::Literal(_) | Token::Word(_))
    }

    fn classify(text: &str) -> Token {
        match text {
            "(" => return Token::OpenParen,
            ")" => return Token::CloseParen,
            "," => return Token::Comma,
            "=" | "==" => return Token::Comparison(Comparison::Equal),
            "!=" | "<>" => return Token::Comparison(Comparison::NotEqual),
            "<" => return Token::Comparison(Comparison::Less),
            ">" => return Token::Comparison(Comparison::Greater),
            "<=" => return Token::Comparison(Comparison::LessEqual),
            ">=" | "=>" => return Token::Comparison(Comparison::GreaterEqual),
            _ => {}
        }

        if text.starts_with('\'') {
            return Token::Literal(text.to_string());
        }

        match text.to_ascii_uppercase().as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "IN" => Token::In,
            "THEN" => Token::Then,
            _ => Token::Word(text.to_string()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comparison(op) => f.write_str(op.symbol()),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::In => f.write_str("IN"),
            Token::Then => f.write_str("THEN"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Literal(text) | Token::Word(text) => f.write_str(text),
        }
    }
}

/// Tokenize a condition string
pub fn tokenize(condition: &str) -> Vec<Token> {
    let tokens: Vec<Token> = TOKEN_PATTERN
        .find_iter(condition)
        .map(|m| Token::classify(m.as_str()))
        .collect();
    log::trace!("tokenized {:?} into {} tokens", condition, tokens.len());
    tokens
}

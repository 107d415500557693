//! Interpreter Errors
//!
//! Structural errors abort a whole script run. A command that fails inside
//! the command executor is not an error here: it is reported through
//! `ExecResult` and the script keeps going.

use std::fmt;
use thiserror::Error;

use crate::parser::{Token, TokenKind};

/// What `expect` was looking for when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expected {
    pub kind: TokenKind,
    pub value: Option<String>,
}

impl Expected {
    pub fn kind(kind: TokenKind) -> Self {
        Self { kind, value: None }
    }

    pub fn token(kind: TokenKind, value: &str) -> Self {
        Self {
            kind,
            value: Some(value.to_string()),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} \"{}\"", self.kind, value),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpreterError {
    #[error("line {}:{}: unexpected token {} \"{}\", expected {expected}", .found.line, .found.column, .found.kind, .found.text)]
    UnexpectedToken { found: Token, expected: Expected },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: Expected },

    #[error("line {line}:{column}: invalid comparison operator: {operator}")]
    InvalidOperator {
        operator: String,
        line: usize,
        column: usize,
    },

    #[error("line {line}:{column}: function calls not supported: {name}")]
    UnsupportedFunctionCall {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("loop exceeded the limit of {limit} iterations")]
    LoopLimitExceeded { limit: u64 },
}

impl InterpreterError {
    pub fn unexpected(found: &Token, expected: Expected) -> Self {
        Self::UnexpectedToken {
            found: found.clone(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let found = Token::new(TokenKind::Word, "oops", 10, 14, 2, 5);
        let err = InterpreterError::unexpected(&found, Expected::token(TokenKind::Keyword, "then"));
        assert_eq!(
            err.to_string(),
            "line 2:5: unexpected token WORD \"oops\", expected KEYWORD \"then\""
        );
    }

    #[test]
    fn test_end_of_input_message() {
        let err = InterpreterError::UnexpectedEndOfInput {
            expected: Expected::kind(TokenKind::Word),
        };
        assert_eq!(err.to_string(), "unexpected end of input, expected WORD");
    }
}

//! Error handling for parsing
//!
//! Lexing never fails. Parsing fails in exactly one way, when an expected
//! closing delimiter is missing, and the failure aborts the whole parse.

use crate::core::engine::token::{Position, TokenKind};
use thiserror::Error;

/// Parse error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Generic structural error, optionally located
    #[error("{}", located(.message, .position))]
    Syntax {
        message: String,
        position: Option<Position>,
    },

    /// A specific token kind was required but something else was found
    #[error("Expected {expected}, got {actual} ('{}') at {position}", .value.escape_debug())]
    UnexpectedToken {
        expected: TokenKind,
        actual: TokenKind,
        value: String,
        position: Position,
    },

    /// A `{` or `[` group reached end of input without its closing delimiter
    #[error("Unclosed group '{delimiter}' opened at {position}")]
    UnclosedGroup { delimiter: char, position: Position },
}

fn located(message: &str, position: &Option<Position>) -> String {
    match position {
        Some(p) => format!("Parse error at line {}, column {}: {}", p.line, p.column, message),
        None => format!("Parse error: {}", message),
    }
}

/// Result type for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

// Convenience constructors
impl ParseError {
    pub fn syntax(message: impl Into<String>) -> Self {
        ParseError::Syntax {
            message: message.into(),
            position: None,
        }
    }

    pub fn syntax_at(message: impl Into<String>, position: Position) -> Self {
        ParseError::Syntax {
            message: message.into(),
            position: Some(position),
        }
    }

    pub fn unexpected(
        expected: TokenKind,
        actual: TokenKind,
        value: impl Into<String>,
        position: Position,
    ) -> Self {
        ParseError::UnexpectedToken {
            expected,
            actual,
            value: value.into(),
            position,
        }
    }

    pub fn unclosed(delimiter: char, position: Position) -> Self {
        ParseError::UnclosedGroup {
            delimiter,
            position,
        }
    }

    /// Where the error happened, if known
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Syntax { position, .. } => *position,
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnclosedGroup { position, .. } => Some(*position),
        }
    }

    /// The message without any location prefix
    pub fn message(&self) -> String {
        match self {
            ParseError::Syntax { message, .. } => message.clone(),
            ParseError::UnexpectedToken {
                expected, actual, ..
            } => format!("Expected {}, got {}", expected, actual),
            ParseError::UnclosedGroup { .. } => "Unclosed group".to_string(),
        }
    }
}

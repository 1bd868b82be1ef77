//! Error types for the parsing boundary.
//!
//! Detection itself is infallible: a detector that meets a node shape it does
//! not handle skips that subtree and keeps going. The only failure a caller can
//! see is [`ParseError`], raised when the SQL text never becomes an AST.

use crate::types::Dialect;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
#[cfg(feature = "tracing")]
use tracing::trace;

/// SQL text that could not be parsed into statements.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Message reported by the parser.
    pub message: String,
    /// Location of the failure, when the parser reported one.
    pub position: Option<Position>,
    /// Dialect the text was parsed with.
    pub dialect: Option<Dialect>,
    pub kind: ParseErrorKind,
}

/// 1-indexed line/column location inside the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Coarse category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    #[default]
    SyntaxError,
    /// Input ended before the statement was complete.
    UnexpectedEof,
    /// The tokenizer rejected the input.
    LexerError,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Recovers `Line: X, Column: Y` from a sqlparser error message.
    fn position_from_message(message: &str) -> Option<Position> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("valid position regex")
        });

        let position = re.captures(message).and_then(|caps| {
            let line = caps.get(1)?.as_str().parse().ok()?;
            let column = caps.get(2)?.as_str().parse().ok()?;
            Some(Position { line, column })
        });

        #[cfg(feature = "tracing")]
        if position.is_none() && message.contains("Line") {
            trace!("no position recovered from parser message: {}", message);
        }

        position
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;
        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect:?})")?;
        }
        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        use sqlparser::parser::ParserError;

        let kind = match &err {
            ParserError::TokenizerError(_) => ParseErrorKind::LexerError,
            ParserError::ParserError(msg) if msg.contains("EOF") => ParseErrorKind::UnexpectedEof,
            _ => ParseErrorKind::SyntaxError,
        };
        let message = err.to_string();
        let position = Self::position_from_message(&message);

        Self {
            message,
            position,
            dialect: None,
            kind,
        }
    }
}

use std::fmt;
use std::io;

use thiserror::Error;

use crate::ast::Segment;

/// 1-based line and column in a VM source file.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ParseErrorKind {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("expected a command, found argument '{0}'")]
    ExpectedCommand(String),
    #[error("unknown segment '{0}'")]
    UnknownSegment(String),
    #[error("'{command}' is missing its {what}")]
    MissingArgument { command: String, what: &'static str },
    #[error("'{0}' is not a valid index")]
    InvalidIndex(String),
    #[error("'{0}' is not a valid symbol")]
    InvalidSymbol(String),
    #[error("unexpected extra argument '{0}'")]
    ExtraArgument(String),
    #[error("illegal character '{0}'")]
    IllegalCharacter(String),
    #[error("unexpected end of input")]
    UnexpectedEnd,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{pos}: {kind}")]
pub struct ParseError {
    pub pos: Position,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(pos: Position, kind: ParseErrorKind) -> Self {
        ParseError { pos, kind }
    }
}

/// Commands that parsed but cannot be translated. All of them are
/// recoverable: the caller skips the command and carries on.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum TranslateError {
    #[error("attempted to write unsupported arithmetic command: {0:?}")]
    UnsupportedArithmetic(String),
    #[error("attempted to pop into the constant segment (index {0})")]
    PopConstant(u16),
    #[error("index {index} is out of range for segment {segment}")]
    SegmentIndexOutOfRange { segment: Segment, index: u16 },
}

#[derive(Debug, Error)]
pub enum WriteError {
    /// The output can no longer be trusted; abandon it.
    #[error("I/O while emitting assembly: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl WriteError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, WriteError::Io(_))
    }
}

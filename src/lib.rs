//! Translator from the stack VM intermediate language to Hack assembly.
//!
//! The pipeline is [`lexer`] -> [`parser`] -> [`translator`] -> [`writer`],
//! with [`driver`] handling files, directories and the bootstrap.

pub mod ast;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod tables;
pub mod translator;
pub mod writer;

pub use ast::{Command, CommandKind, Segment};
pub use error::{ParseError, Position, TranslateError, WriteError};
pub use translator::{translate, UnitContext};
pub use writer::CodeWriter;

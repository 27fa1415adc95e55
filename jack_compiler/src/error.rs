//! Error types for the Jack compiler.
//!
//! Every variant carries the 1-based source line, matching the other two
//! crates' error taxonomy. A single `JackError` aborts compilation of the
//! current class; in directory mode the caller is free to continue on to
//! the next file (see [`crate::compile_directory`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JackError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: unterminated string constant")]
    UnterminatedString { line: usize },

    #[error("line {line}: unterminated block comment")]
    UnterminatedComment { line: usize },

    #[error("line {line}: unrecognized token near {text:?}")]
    Lexical { line: usize, text: String },

    #[error("line {line}: integer constant {value} exceeds the 15-bit range")]
    IntegerOutOfRange { line: usize, value: i64 },

    #[error("line {line}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof { line: usize, expected: String },

    #[error("line {line}: undeclared identifier {name:?}")]
    UndeclaredSymbol { line: usize, name: String },

    #[error("class file {path:?} must declare a class named {expected:?}, found {found:?}")]
    ClassNameMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("no .jack files found in directory: {0}")]
    EmptyDirectory(String),
}

pub type Result<T> = std::result::Result<T, JackError>;

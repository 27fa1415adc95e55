//! Error types for the Hack assembler.
//!
//! Every variant carries the 1-based source line so callers can report the
//! offending token alongside it. A single
//! `AssembleError` aborts translation of the current unit; no partial
//! `.hack` output is ever written (see [`crate::assemble`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed '@' operand: {text:?}")]
    MalformedOperand { line: usize, text: String },

    #[error("line {line}: unresolved symbol in comp/dest/jump field: {text:?}")]
    UnknownMnemonic { line: usize, text: String },

    #[error("line {line}: duplicate label definition: {name:?}")]
    DuplicateLabel { line: usize, name: String },

    #[error("line {line}: address {value} exceeds the 15-bit address space")]
    AddressOutOfRange { line: usize, value: u32 },

    #[error("line {line}: malformed label declaration: {text:?}")]
    MalformedLabel { line: usize, text: String },
}

pub type Result<T> = std::result::Result<T, AssembleError>;

//! Error types for the VM translator.
//!
//! Every variant carries the 1-based source line of the `.vm` command that
//! triggered it. A single error aborts translation of the whole unit (file
//! or directory); no partial `.asm` is written.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: unknown command: {text:?}")]
    UnknownCommand { line: usize, text: String },

    #[error("line {line}: malformed operand in: {text:?}")]
    MalformedOperand { line: usize, text: String },

    #[error("line {line}: unknown segment: {segment:?}")]
    UnknownSegment { line: usize, segment: String },

    #[error("line {line}: pop constant is not a legal VM command")]
    PopConstant { line: usize },

    #[error("no .vm files found in directory: {0}")]
    EmptyDirectory(String),
}

pub type Result<T> = std::result::Result<T, VmError>;

//! VM Translator for the `Nand2Tetris` course
//!
//! Lowers Stack VM bytecode (`.vm`) into Hack assembly (`.asm`): arithmetic
//! and stack-access commands, program flow (`label`/`goto`/`if-goto`), and
//! the function call/return calling convention.
//!
//! # Architecture
//!
//! - [`parser`]: Splits VM commands, tracking source line numbers for errors
//! - [`code_writer`]: Emits Hack assembly for each command
//! - [`error`]: The fatal, line-tagged `VmError` taxonomy
//!
//! A bare `.vm` file translates to a matching `.asm`. A directory of `.vm`
//! files translates to one `.asm` named after the directory, preceded by the
//! `SP=256; call Sys.init 0` bootstrap and followed by the terminating
//! infinite loop. See [`translate_file`] and [`translate_directory`].

pub mod code_writer;
pub mod error;
pub mod parser;

use std::fs;
use std::path::Path;

use code_writer::CodeWriter;
use error::VmError;
use parser::{CommandType, Parser};

pub use error::VmError as Error;

/// Translates every command from one already-open `.vm` file into `writer`,
/// without bootstrap or termination. Used by both single-file and
/// directory-mode entry points so the preamble/postamble are written
/// exactly once per output unit.
pub fn translate_unit(
    path: &Path,
    code_writer: &mut CodeWriter<impl std::io::Write>,
) -> Result<(), VmError> {
    let mut parser = Parser::new(path)?;
    let filename = path.to_string_lossy().into_owned();
    code_writer.set_filename(&filename);

    while parser.has_more_commands() {
        parser.advance();
        let line = parser.line_number();

        match parser.command_type()? {
            CommandType::Arithmetic => {
                code_writer.write_arithmetic(parser.arg1()?, line)?;
            }
            CommandType::Push => {
                code_writer.write_push_pop("push", parser.arg1()?, parser.arg2()?, line)?;
            }
            CommandType::Pop => {
                code_writer.write_push_pop("pop", parser.arg1()?, parser.arg2()?, line)?;
            }
            CommandType::Label => code_writer.write_label(parser.arg1()?)?,
            CommandType::Goto => code_writer.write_goto(parser.arg1()?)?,
            CommandType::If => code_writer.write_if_goto(parser.arg1()?)?,
            CommandType::Function => {
                code_writer.write_function(parser.arg1()?, parser.arg2()?)?;
            }
            CommandType::Call => {
                code_writer.write_call(parser.arg1()?, parser.arg2()?)?;
            }
            CommandType::Return => code_writer.write_return()?,
        }
    }

    Ok(())
}

/// Translates a single `.vm` file to `.asm`, writing to `out`. No bootstrap
/// is emitted (single-file units don't assume a `Sys.init` exists), but the
/// terminating infinite loop is always appended.
pub fn translate_file(path: &Path, out: impl std::io::Write) -> Result<(), VmError> {
    let mut code_writer = CodeWriter::new(out);
    translate_unit(path, &mut code_writer)?;
    code_writer.write_termination()?;
    code_writer.flush()?;
    Ok(())
}

/// Translates every `.vm` file in `dir` (sorted by filename for determinism)
/// into a single `.asm` stream, preceded by the `Sys.init` bootstrap.
pub fn translate_directory(dir: &Path, out: impl std::io::Write) -> Result<(), VmError> {
    let mut vm_files: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "vm"))
        .collect();
    vm_files.sort();

    if vm_files.is_empty() {
        return Err(VmError::EmptyDirectory(dir.to_string_lossy().into_owned()));
    }

    let mut code_writer = CodeWriter::new(out);
    code_writer.write_bootstrap()?;

    for vm_file in &vm_files {
        translate_unit(vm_file, &mut code_writer)?;
    }

    code_writer.write_termination()?;
    code_writer.flush()?;
    Ok(())
}

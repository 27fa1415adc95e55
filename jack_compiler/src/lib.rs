//! Jack Compiler for the `Nand2Tetris` course
//!
//! Compiles Jack source (`.jack`) directly to Stack VM commands (`.vm`) in
//! a single pass: [`tokenizer`] lexes, [`compiler`] parses and emits VM
//! text with the help of a nested [`symbol_table`], and [`vm_writer`]
//! renders the VM command syntax.
//!
//! One class per file; the class name must equal the file stem. A bare
//! `.jack` file compiles to a matching `.vm`. A directory of `.jack` files
//! compiles each independently — a fatal error in one file discards only
//! that file's output and logging continues with the rest, matching §5's
//! "caller-level recovery ... is explicitly allowed."

pub mod compiler;
pub mod error;
pub mod symbol_table;
pub mod tokenizer;
pub mod vm_writer;

use std::fs;
use std::path::{Path, PathBuf};

use compiler::Compiler;
use error::JackError;
use tokenizer::{Token, TokenKind, Tokenizer};

pub use error::JackError as Error;
pub use symbol_table::{Kind, SymbolTable};

/// Peeks the class name out of a token stream without running the full
/// parser, so a file-stem mismatch is caught before any `.vm` file is
/// created.
fn declared_class_name(source: &str) -> Result<String, JackError> {
    let mut tokenizer = Tokenizer::new(source)?;
    tokenizer.advance();
    match tokenizer.advance() {
        Some(Token { kind: TokenKind::Identifier(name), .. }) => Ok(name.clone()),
        Some(tok) => Err(JackError::Syntax {
            line: tok.line,
            expected: "class name".to_string(),
            found: format!("{:?}", tok.kind),
        }),
        None => Err(JackError::UnexpectedEof { line: 0, expected: "class name".to_string() }),
    }
}

/// Compiles one `.jack` file to `<stem>.vm` in the same directory.
/// Returns the path written.
pub fn compile_file(path: &Path) -> Result<PathBuf, JackError> {
    let source = fs::read_to_string(path)?;
    let stem = path.file_stem().unwrap_or_default().to_string_lossy().into_owned();

    let declared = declared_class_name(&source)?;
    if declared != stem {
        return Err(JackError::ClassNameMismatch {
            path: path.display().to_string(),
            expected: stem,
            found: declared,
        });
    }

    let compiler = Compiler::new(&source, Vec::new())?;
    let (_, buffer) = compiler.compile()?;

    let out_path = path.with_extension("vm");
    fs::write(&out_path, buffer)?;

    Ok(out_path)
}

/// The outcome of compiling every `.jack` file in a directory: files that
/// produced output, and files that failed (with the error that aborted
/// them). A failure here never aborts the rest of the directory.
#[derive(Debug, Default)]
pub struct DirectoryReport {
    pub compiled: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, JackError)>,
}

impl DirectoryReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Compiles every `.jack` file in `dir` independently, continuing past
/// per-file failures. Fails outright only if the directory holds no
/// `.jack` files at all.
pub fn compile_directory(dir: &Path) -> Result<DirectoryReport, JackError> {
    let mut jack_files: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
        .collect();
    jack_files.sort();

    if jack_files.is_empty() {
        return Err(JackError::EmptyDirectory(dir.to_string_lossy().into_owned()));
    }

    let mut report = DirectoryReport::default();
    for jack_file in jack_files {
        match compile_file(&jack_file) {
            Ok(out_path) => {
                log::info!("compiled {}", out_path.display());
                report.compiled.push(out_path);
            }
            Err(err) => {
                log::error!("{}: {err}", jack_file.display());
                report.failed.push((jack_file, err));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn unique_dir(label: &str) -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("jack_compiler_lib_test_{label}_{id}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_compile_file_minimal_class() {
        let dir = unique_dir("minimal");
        let path = dir.join("Main.jack");
        fs::write(&path, "class Main { function void main() { return; } }").unwrap();

        let out = compile_file(&path).unwrap();
        let vm = fs::read_to_string(&out).unwrap();
        assert_eq!(vm, "function Main.main 0\npush constant 0\nreturn\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_compile_file_rejects_stem_mismatch() {
        let dir = unique_dir("mismatch");
        let path = dir.join("Foo.jack");
        fs::write(&path, "class Bar { function void main() { return; } }").unwrap();

        let err = compile_file(&path).unwrap_err();
        assert!(matches!(err, JackError::ClassNameMismatch { .. }));
        assert!(!dir.join("Foo.vm").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_compile_file_leaves_no_partial_output_on_late_syntax_error() {
        let dir = unique_dir("late_failure");
        let path = dir.join("Bad.jack");
        // Tokenizes cleanly and emits `function Bad.main 0` before the
        // missing closing braces surface as an EOF syntax error.
        fs::write(&path, "class Bad { function void main() {").unwrap();

        let err = compile_file(&path).unwrap_err();
        assert!(matches!(err, JackError::Syntax { .. } | JackError::UnexpectedEof { .. }));
        assert!(!dir.join("Bad.vm").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_compile_directory_continues_past_failures() {
        let dir = unique_dir("mixed");
        fs::write(dir.join("Good.jack"), "class Good { function void main() { return; } }").unwrap();
        fs::write(dir.join("Bad.jack"), "class Bad { function void main() {").unwrap();

        let report = compile_directory(&dir).unwrap();
        assert_eq!(report.compiled.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(!report.all_succeeded());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_compile_directory_rejects_empty_directory() {
        let dir = unique_dir("empty");
        let err = compile_directory(&dir).unwrap_err();
        assert!(matches!(err, JackError::EmptyDirectory(_)));
        fs::remove_dir_all(&dir).unwrap();
    }
}

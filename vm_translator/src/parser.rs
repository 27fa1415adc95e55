//! Parser module for the Stack VM intermediate language.
//!
//! Strips `//` comments and blank lines, then classifies and splits each
//! remaining line. Unlike a disassembler, this is fallible end to end: a
//! line that doesn't parse into a known command shape is fatal, with the
//! 1-based source line attached for diagnostics.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::error::VmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

pub struct Parser {
    lines: Vec<(usize, String)>,
    current_line: usize,
    current_command: String,
    current_source_line: usize,
    cached_parts: Vec<String>,
}

impl Parser {
    pub fn new(filename: &std::path::Path) -> Result<Self, VmError> {
        let file = File::open(filename)?;
        let reader = BufReader::new(file);

        let mut lines = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let stripped = if let Some(pos) = line.find("//") {
                &line[..pos]
            } else {
                &line
            };

            let trimmed = stripped.trim();
            if !trimmed.is_empty() {
                lines.push((line_no + 1, trimmed.to_string()));
            }
        }

        Ok(Parser {
            lines,
            current_line: 0,
            current_command: String::new(),
            current_source_line: 0,
            cached_parts: Vec::new(),
        })
    }

    #[inline]
    pub fn has_more_commands(&self) -> bool {
        self.current_line < self.lines.len()
    }

    #[inline]
    pub fn advance(&mut self) {
        if self.has_more_commands() {
            let (line_no, line) = &self.lines[self.current_line];
            self.current_source_line = *line_no;
            self.current_command.clear();
            self.current_command.push_str(line);

            self.cached_parts.clear();
            self.cached_parts
                .extend(self.current_command.split_whitespace().map(str::to_string));

            self.current_line += 1;
        }
    }

    /// The 1-based source line of the command just returned by `advance`.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.current_source_line
    }

    pub fn command_type(&self) -> Result<CommandType, VmError> {
        let keyword = self.cached_parts.first().ok_or_else(|| VmError::MalformedOperand {
            line: self.current_source_line,
            text: self.current_command.clone(),
        })?;

        Ok(match keyword.as_str() {
            "push" => CommandType::Push,
            "pop" => CommandType::Pop,
            "label" => CommandType::Label,
            "goto" => CommandType::Goto,
            "if-goto" => CommandType::If,
            "function" => CommandType::Function,
            "return" => CommandType::Return,
            "call" => CommandType::Call,
            "add" | "sub" | "neg" | "eq" | "gt" | "lt" | "and" | "or" | "not" => {
                CommandType::Arithmetic
            }
            _ => {
                return Err(VmError::UnknownCommand {
                    line: self.current_source_line,
                    text: self.current_command.clone(),
                })
            }
        })
    }

    pub fn arg1(&self) -> Result<&str, VmError> {
        match self.command_type()? {
            CommandType::Arithmetic => Ok(&self.cached_parts[0]),
            CommandType::Return => Err(VmError::MalformedOperand {
                line: self.current_source_line,
                text: "arg1 is not defined for return".to_string(),
            }),
            _ => self
                .cached_parts
                .get(1)
                .map(String::as_str)
                .ok_or_else(|| VmError::MalformedOperand {
                    line: self.current_source_line,
                    text: self.current_command.clone(),
                }),
        }
    }

    pub fn arg2(&self) -> Result<u16, VmError> {
        match self.command_type()? {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                let raw = self.cached_parts.get(2).ok_or_else(|| VmError::MalformedOperand {
                    line: self.current_source_line,
                    text: self.current_command.clone(),
                })?;
                raw.parse().map_err(|_| VmError::MalformedOperand {
                    line: self.current_source_line,
                    text: self.current_command.clone(),
                })
            }
            _ => Err(VmError::MalformedOperand {
                line: self.current_source_line,
                text: "arg2 is not defined for this command".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    struct TempFile(std::path::PathBuf);

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn parser_for(contents: &str) -> (Parser, TempFile) {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("vm_translator_parser_test_{id}.vm"));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        let temp = TempFile(path.clone());
        (Parser::new(&path).unwrap(), temp)
    }

    #[test]
    fn test_classifies_arithmetic_and_stack_commands() {
        let (mut parser, _guard) =
            parser_for("push constant 7\nadd\n// comment\n\npop local 2\n");
        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::Push);
        assert_eq!(parser.arg1().unwrap(), "constant");
        assert_eq!(parser.arg2().unwrap(), 7);

        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::Arithmetic);
        assert_eq!(parser.arg1().unwrap(), "add");

        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::Pop);
        assert_eq!(parser.arg1().unwrap(), "local");
        assert_eq!(parser.arg2().unwrap(), 2);

        assert!(!parser.has_more_commands());
    }

    #[test]
    fn test_control_flow_and_function_commands() {
        let (mut parser, _guard) = parser_for(
            "label LOOP\ngoto LOOP\nif-goto LOOP\nfunction Main.fib 1\ncall Main.fib 1\nreturn\n",
        );

        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::Label);
        assert_eq!(parser.arg1().unwrap(), "LOOP");

        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::Goto);

        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::If);

        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::Function);
        assert_eq!(parser.arg1().unwrap(), "Main.fib");
        assert_eq!(parser.arg2().unwrap(), 1);

        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::Call);

        parser.advance();
        assert_eq!(parser.command_type().unwrap(), CommandType::Return);
        assert!(parser.arg1().is_err());
    }

    #[test]
    fn test_unknown_command_is_fatal() {
        let (mut parser, _guard) = parser_for("frobnicate 1 2\n");
        parser.advance();
        assert!(parser.command_type().is_err());
    }

    #[test]
    fn test_line_number_tracking_skips_blank_and_comments() {
        let (mut parser, _guard) = parser_for("// header\n\npush constant 1\nadd\n");
        parser.advance();
        assert_eq!(parser.line_number(), 3);
        parser.advance();
        assert_eq!(parser.line_number(), 4);
    }
}

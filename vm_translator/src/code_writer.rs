//! Code generation: lowers Stack VM commands to Hack assembly.
//!
//! Arithmetic and stack access follow a scratch-register
//! convention (`R13`/`R14` for binary operands, `R13`/`R14`/`R15` for the
//! call/return frame). Function-local labels are mangled `F$L` so VM label
//! scoping survives without a separate resolution pass (see
//! [`CodeWriter::mangled_label`]).

use std::io::{self, Write};

use crate::error::VmError;

macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Clone, Copy)]
enum SegmentSymbol {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl SegmentSymbol {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(SegmentSymbol::Local),
            "argument" => Some(SegmentSymbol::Argument),
            "this" => Some(SegmentSymbol::This),
            "that" => Some(SegmentSymbol::That),
            "temp" => Some(SegmentSymbol::Temp),
            "pointer" => Some(SegmentSymbol::Pointer),
            "static" => Some(SegmentSymbol::Static),
            "constant" => Some(SegmentSymbol::Constant),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            SegmentSymbol::Local => "LCL",
            SegmentSymbol::Argument => "ARG",
            SegmentSymbol::This => "THIS",
            SegmentSymbol::That => "THAT",
            SegmentSymbol::Temp => "R5",
            SegmentSymbol::Pointer => "THIS",
            SegmentSymbol::Static => "STATIC",
            SegmentSymbol::Constant => "CONSTANT",
        }
    }
}

pub struct CodeWriter<W: Write> {
    out: W,
    label_counter: usize,
    call_counter: usize,
    filename: String,
    current_function: Option<String>,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        CodeWriter {
            out,
            label_counter: 0,
            call_counter: 0,
            filename: String::new(),
            current_function: None,
        }
    }

    #[inline]
    pub fn set_filename(&mut self, filename: &str) {
        let name = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        self.filename.clear();
        self.filename.push_str(name);
    }

    /// Mangles a VM label to its function-local form, per §4.2: inside a
    /// function `F`, label `L` becomes `F$L`; outside any function it is
    /// emitted verbatim.
    fn mangled_label(&self, label: &str) -> String {
        match &self.current_function {
            Some(f) => format!("{f}${label}"),
            None => label.to_string(),
        }
    }

    /// Emits the `SP=256; call Sys.init 0` bootstrap for directory-mode translation.
    pub fn write_bootstrap(&mut self) -> io::Result<()> {
        writeln!(self.out, "// bootstrap")?;
        write_asm!(self.out,
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0)
    }

    /// Emits the terminating infinite loop required at the end of output.
    pub fn write_termination(&mut self) -> io::Result<()> {
        writeln!(self.out, "(END)\n@END\n0;JMP")
    }

    pub fn write_arithmetic(&mut self, command: &str, line: usize) -> Result<(), VmError> {
        writeln!(self.out, "// vm command:{command}")?;

        match command {
            "add" => self.write_binary_op("D+M")?,
            "sub" => self.write_binary_op("D-M")?,
            "and" => self.write_binary_op("D&M")?,
            "or" => self.write_binary_op("D|M")?,
            "neg" => self.write_unary_op(true)?,
            "not" => self.write_unary_op(false)?,
            "eq" => self.write_comparison("JEQ")?,
            "gt" => self.write_comparison("JGT")?,
            "lt" => self.write_comparison("JLT")?,
            other => {
                return Err(VmError::UnknownCommand {
                    line,
                    text: other.to_string(),
                })
            }
        }
        Ok(())
    }

    fn write_binary_op(&mut self, operation: &str) -> io::Result<()> {
        write!(
            self.out,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R14\n\
             M=D\n\
             // get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D={operation}\n"
        )?;

        self.write_push_d()?;
        self.out.write_all(b"\n")
    }

    fn write_unary_op(&mut self, is_neg: bool) -> io::Result<()> {
        write_asm!(self.out,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;

        if is_neg {
            write_asm!(self.out,
                "@0"
                "D=A-D"
            )?;
        } else {
            write_asm!(self.out, "D=!D")?;
        }

        self.write_push_d()?;
        self.out.write_all(b"\n")
    }

    fn write_comparison(&mut self, jump: &str) -> io::Result<()> {
        let label_prefix = match jump {
            "JEQ" => "EQ",
            "JGT" => "GT",
            "JLT" => "LT",
            _ => jump,
        };
        let label_num = self.label_counter;
        self.label_counter += 1;

        write!(
            self.out,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R14\n\
             M=D\n\
             // get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D=D-M\n\
             @{label_prefix}{label_num}\n\
             D;{jump}\n\
             // push the value into stack\n\
             @SP\n\
             A=M\n\
             M=0\n\
             @SP\n\
             M=M+1\n\
             @END{label_prefix}{label_num}\n\
             0;JMP\n\
             ({label_prefix}{label_num})\n\
             // push the value into stack\n\
             @SP\n\
             A=M\n\
             M=-1\n\
             @SP\n\
             M=M+1\n\
             (END{label_prefix}{label_num})\n\n"
        )
    }

    pub fn write_push_pop(
        &mut self,
        command: &str,
        segment: &str,
        index: u16,
        line: usize,
    ) -> Result<(), VmError> {
        writeln!(self.out, "// vm command:{command} {segment} {index}")?;

        if command == "push" {
            self.write_push(segment, index, line)?;
        } else {
            if segment == "constant" {
                return Err(VmError::PopConstant { line });
            }
            self.write_pop(segment, index, line)?;
        }

        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn write_push(&mut self, segment: &str, index: u16, line: usize) -> Result<(), VmError> {
        let seg = SegmentSymbol::from_str(segment).ok_or_else(|| VmError::UnknownSegment {
            line,
            segment: segment.to_string(),
        })?;

        match seg {
            SegmentSymbol::Constant => {
                write!(self.out, "@{index}\nD=A\n")?;
                self.write_push_d()?;
            }
            SegmentSymbol::Local | SegmentSymbol::Argument | SegmentSymbol::This | SegmentSymbol::That => {
                write!(self.out, "@{}\nD=M\n@{index}\nA=D+A\nD=M\n", seg.symbol())?;
                self.write_push_d()?;
            }
            SegmentSymbol::Temp => {
                write!(self.out, "@R5\nD=A\n@{index}\nA=D+A\nD=M\n")?;
                self.write_push_d()?;
            }
            SegmentSymbol::Pointer => {
                write!(self.out, "@THIS\nD=A\n@{index}\nA=D+A\nD=M\n")?;
                self.write_push_d()?;
            }
            SegmentSymbol::Static => {
                write!(self.out, "@{}.{index}\nD=M\n", self.filename)?;
                self.write_push_d()?;
            }
        }
        Ok(())
    }

    fn write_pop(&mut self, segment: &str, index: u16, line: usize) -> Result<(), VmError> {
        let seg = SegmentSymbol::from_str(segment).ok_or_else(|| VmError::UnknownSegment {
            line,
            segment: segment.to_string(),
        })?;

        match seg {
            SegmentSymbol::Local | SegmentSymbol::Argument | SegmentSymbol::This | SegmentSymbol::That => {
                write!(
                    self.out,
                    "@{}\nD=M\n@{index}\nD=D+A\n// store the result temporarily\n@R13\nM=D\n",
                    seg.symbol()
                )?;
                self.write_pop_to_d()?;
                write_asm!(self.out,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
            }
            SegmentSymbol::Temp => {
                write!(
                    self.out,
                    "@5\nD=A\n@{index}\nD=D+A\n// store the result temporarily\n@R13\nM=D\n"
                )?;
                self.write_pop_to_d()?;
                write_asm!(self.out,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
            }
            SegmentSymbol::Pointer => {
                write!(
                    self.out,
                    "@THIS\nD=A\n@{index}\nD=D+A\n// store the result temporarily\n@R13\nM=D\n"
                )?;
                self.write_pop_to_d()?;
                write_asm!(self.out,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
            }
            SegmentSymbol::Static => {
                self.write_pop_to_d()?;
                write!(self.out, "@{}.{index}\nM=D\n", self.filename)?;
            }
            SegmentSymbol::Constant => return Err(VmError::PopConstant { line }),
        }
        Ok(())
    }

    fn write_push_d(&mut self) -> io::Result<()> {
        write_asm!(self.out,
            "// push the value into stack"
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )
    }

    fn write_pop_to_d(&mut self) -> io::Result<()> {
        write_asm!(self.out,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )
    }

    /// Emits `(label)`, mangled to the current function's scope.
    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "({})", self.mangled_label(label))
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "@{}\n0;JMP", self.mangled_label(label))
    }

    pub fn write_if_goto(&mut self, label: &str) -> io::Result<()> {
        let target = self.mangled_label(label);
        write_asm!(self.out,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;
        writeln!(self.out, "@{target}\nD;JNE")
    }

    /// Emits `(F)`, sets the current function scope, and pushes `n` zeros
    /// to initialize its local segment.
    pub fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        self.current_function = Some(name.to_string());
        writeln!(self.out, "({name})")?;
        for _ in 0..n_locals {
            write_asm!(self.out,
                "@SP"
                "A=M"
                "M=0"
                "@SP"
                "M=M+1"
            )?;
        }
        Ok(())
    }

    /// Implements the calling convention of §4.2: push the return address
    /// and the caller's `LCL`/`ARG`/`THIS`/`THAT`, reposition `ARG` and
    /// `LCL`, then jump to `F`.
    pub fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        let return_label = format!("{name}$ret.{}", self.call_counter);
        self.call_counter += 1;

        writeln!(self.out, "// call {name} {n_args}")?;
        write!(self.out, "@{return_label}\nD=A\n")?;
        self.write_push_d()?;

        for segment in ["LCL", "ARG", "THIS", "THAT"] {
            write!(self.out, "@{segment}\nD=M\n")?;
            self.write_push_d()?;
        }

        // ARG = SP - n_args - 5
        write!(
            self.out,
            "@{}\nD=A\n@SP\nD=M-D\n@ARG\nM=D\n",
            n_args as u32 + 5
        )?;
        // LCL = SP
        write_asm!(self.out,
            "@SP"
            "D=M"
            "@LCL"
            "M=D"
        )?;

        writeln!(self.out, "@{name}\n0;JMP")?;
        writeln!(self.out, "({return_label})")
    }

    /// Implements `return` per §4.2: captures `RET` before `ARG` is
    /// overwritten (it lives inside the frame being torn down), places the
    /// return value at `*ARG`, repositions `SP`, then restores the caller's
    /// segment pointers before jumping to `RET`.
    pub fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.out, "// return")?;
        // FRAME (R13) = LCL
        write_asm!(self.out,
            "@LCL"
            "D=M"
            "@R13"
            "M=D"
        )?;
        // RET (R14) = *(FRAME - 5)
        write_asm!(self.out,
            "@5"
            "A=D-A"
            "D=M"
            "@R14"
            "M=D"
        )?;
        // *ARG = pop()
        self.write_pop_to_d()?;
        write_asm!(self.out,
            "@ARG"
            "A=M"
            "M=D"
        )?;
        // SP = ARG + 1
        write_asm!(self.out,
            "@ARG"
            "D=M+1"
            "@SP"
            "M=D"
        )?;
        // THAT = *(FRAME-1), THIS = *(FRAME-2), ARG = *(FRAME-3), LCL = *(FRAME-4)
        for (offset, segment) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            write!(
                self.out,
                "@{offset}\nD=A\n@R13\nA=M-D\nD=M\n@{segment}\nM=D\n"
            )?;
        }
        // goto RET
        write_asm!(self.out,
            "@R14"
            "A=M"
            "0;JMP"
        )
    }

    #[inline]
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut CodeWriter<Vec<u8>>)) -> String {
        let mut writer = CodeWriter::new(Vec::new());
        f(&mut writer);
        writer.flush().unwrap();
        String::from_utf8(writer.out).unwrap()
    }

    #[test]
    fn test_label_is_verbatim_outside_a_function() {
        let asm = render(|w| w.write_label("LOOP").unwrap());
        assert_eq!(asm.trim(), "(LOOP)");
    }

    #[test]
    fn test_label_is_mangled_inside_a_function() {
        let asm = render(|w| {
            w.write_function("Main.fib", 0).unwrap();
            w.write_label("LOOP").unwrap();
        });
        assert!(asm.contains("(Main.fib$LOOP)"));
    }

    #[test]
    fn test_function_pushes_n_locals() {
        let asm = render(|w| w.write_function("Main.run", 3).unwrap());
        assert_eq!(asm.matches("M=0").count(), 3);
    }

    #[test]
    fn test_call_repositions_arg_and_lcl() {
        let asm = render(|w| w.write_call("Main.fib", 1).unwrap());
        assert!(asm.contains("@ARG"));
        assert!(asm.contains("@LCL"));
        assert!(asm.contains("@Main.fib\n0;JMP"));
    }

    #[test]
    fn test_return_restores_segments_and_jumps_through_r14() {
        let asm = render(|w| w.write_return().unwrap());
        assert!(asm.contains("@THAT"));
        assert!(asm.contains("@THIS"));
        assert!(asm.contains("@ARG"));
        assert!(asm.contains("@LCL"));
        assert!(asm.contains("@R14\nA=M\n0;JMP"));
    }

    #[test]
    fn test_pop_constant_is_rejected() {
        let mut writer = CodeWriter::new(Vec::new());
        let err = writer.write_push_pop("pop", "constant", 0, 7).unwrap_err();
        assert!(matches!(err, VmError::PopConstant { line: 7 }));
    }

    #[test]
    fn test_push_pointer_selects_this_or_that() {
        let asm = render(|w| {
            w.write_push_pop("push", "pointer", 0, 1).unwrap();
            w.write_push_pop("push", "pointer", 1, 2).unwrap();
        });
        assert!(asm.contains("@THIS"));
    }

    #[test]
    fn test_bootstrap_sets_sp_and_calls_sys_init() {
        let asm = render(|w| w.write_bootstrap().unwrap());
        assert!(asm.contains("@256"));
        assert!(asm.contains("@Sys.init\n0;JMP"));
    }

    #[test]
    fn test_termination_loop() {
        let asm = render(|w| w.write_termination().unwrap());
        assert!(asm.contains("(END)\n@END\n0;JMP"));
    }
}

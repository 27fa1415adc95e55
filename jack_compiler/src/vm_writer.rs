//! Emits the Stack VM's textual command language. Generic over `Write` so
//! tests can render to a `Vec<u8>` while production code writes to a
//! `BufWriter<File>`, mirroring `vm_translator::code_writer::CodeWriter`.
//!
//! Atomic commands (`write_push`/`write_pop`/`write_arithmetic`/...) map
//! one to one onto VM syntax. The higher-level helpers (`write_object_alloc`,
//! `write_string_constant`, `write_operator`, ...) each expand to a short,
//! fixed sequence of atomic commands, same as the Python `VMWriter` this is
//! grounded on.

use std::io::{self, Write};

pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        VmWriter { out }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_push(&mut self, segment: &str, index: u16) -> io::Result<()> {
        writeln!(self.out, "push {segment} {index}")
    }

    pub fn write_pop(&mut self, segment: &str, index: u16) -> io::Result<()> {
        writeln!(self.out, "pop {segment} {index}")
    }

    pub fn write_arithmetic(&mut self, command: &str) -> io::Result<()> {
        writeln!(self.out, "{command}")
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "label {label}")
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "goto {label}")
    }

    pub fn write_if(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "if-goto {label}")
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        writeln!(self.out, "call {name} {n_args}")
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        writeln!(self.out, "function {name} {n_locals}")
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.out, "return")
    }

    /// `push constant size; call Memory.alloc 1; pop pointer 0`.
    pub fn write_object_alloc(&mut self, field_count: u16) -> io::Result<()> {
        self.write_push("constant", field_count)?;
        self.write_call("Memory.alloc", 1)?;
        self.write_pop("pointer", 0)
    }

    pub fn write_string_constant(&mut self, value: &str) -> io::Result<()> {
        self.write_push("constant", value.chars().count() as u16)?;
        self.write_call("String.new", 1)?;
        for ch in value.chars() {
            self.write_push("constant", ch as u16)?;
            self.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    /// `true` -> `push constant 1; neg`; `false`/`null` -> `push constant 0`;
    /// `this` -> `push pointer 0`.
    pub fn write_keyword_constant(&mut self, keyword: &str) -> io::Result<()> {
        match keyword {
            "true" => {
                self.write_push("constant", 1)?;
                self.write_arithmetic("neg")
            }
            "false" | "null" => self.write_push("constant", 0),
            "this" => self.write_push("pointer", 0),
            _ => unreachable!("parser only calls this for true/false/null/this"),
        }
    }

    pub fn write_operator(&mut self, op: char) -> io::Result<()> {
        match op {
            '+' => self.write_arithmetic("add"),
            '-' => self.write_arithmetic("sub"),
            '*' => self.write_call("Math.multiply", 2),
            '/' => self.write_call("Math.divide", 2),
            '&' => self.write_arithmetic("and"),
            '|' => self.write_arithmetic("or"),
            '<' => self.write_arithmetic("lt"),
            '>' => self.write_arithmetic("gt"),
            '=' => self.write_arithmetic("eq"),
            _ => unreachable!("parser only calls this for valid binary operators"),
        }
    }

    pub fn write_unary(&mut self, op: char) -> io::Result<()> {
        match op {
            '-' => self.write_arithmetic("neg"),
            '~' => self.write_arithmetic("not"),
            _ => unreachable!("parser only calls this for valid unary operators"),
        }
    }
}

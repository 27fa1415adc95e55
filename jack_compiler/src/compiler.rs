//! Integrated recursive-descent parser and code generator for one Jack
//! class. Each grammar nonterminal is one `compile_*` method; VM commands
//! are emitted as parsing proceeds rather than being built into an
//! intermediate tree, so emission order always matches source order.
//!
//! Grounded on the Python `CompilationEngine`, with every `assert` there
//! replaced by a `Result`-returning check: a Jack source file never gets
//! partial VM output, it gets a full file or a single [`JackError`].

use std::io::Write;

use crate::error::JackError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::vm_writer::VmWriter;

type Result<T> = std::result::Result<T, JackError>;

pub struct Compiler<W: Write> {
    tokenizer: Tokenizer,
    symbols: SymbolTable,
    writer: VmWriter<W>,
    class_name: String,
    label_counter: u32,
}

impl<W: Write> Compiler<W> {
    /// `class_name` must equal the file stem per §5 of the external
    /// interface contract; the caller (directory/file entry points) is
    /// responsible for enforcing that and is given the parsed name back
    /// via [`Compiler::compile`] for the check.
    pub fn new(source: &str, out: W) -> Result<Self> {
        let tokenizer = Tokenizer::new(source)?;
        Ok(Compiler {
            tokenizer,
            symbols: SymbolTable::new(),
            writer: VmWriter::new(out),
            class_name: String::new(),
            label_counter: 0,
        })
    }

    /// Compiles the single class in this token stream and returns the
    /// class name that was declared, so callers can enforce the
    /// file-stem-equals-class-name rule.
    pub fn compile(mut self) -> Result<(String, W)> {
        self.tokenizer.advance();
        self.compile_class()?;
        self.writer.flush().map_err(JackError::Io)?;
        Ok((self.class_name, self.writer.into_inner()))
    }

    // ---- token cursor helpers ----

    fn current(&self) -> Option<&Token> {
        self.tokenizer.current()
    }

    fn cur_line(&self) -> usize {
        self.tokenizer.current_line()
    }

    fn cur_keyword(&self) -> Option<&'static str> {
        match self.current()?.kind {
            TokenKind::Keyword(k) => Some(k),
            _ => None,
        }
    }

    fn cur_symbol(&self) -> Option<char> {
        match self.current()?.kind {
            TokenKind::Symbol(c) => Some(c),
            _ => None,
        }
    }

    fn cur_identifier(&self) -> Option<&str> {
        match &self.current()?.kind {
            TokenKind::Identifier(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn cur_int(&self) -> Option<i64> {
        match self.current()?.kind {
            TokenKind::IntConst(n) => Some(n),
            _ => None,
        }
    }

    fn cur_string(&self) -> Option<&str> {
        match &self.current()?.kind {
            TokenKind::StringConst(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn peek_symbol(&self) -> Option<char> {
        match self.tokenizer.peek()?.kind {
            TokenKind::Symbol(c) => Some(c),
            _ => None,
        }
    }

    fn describe_current(&self) -> String {
        match self.current() {
            None => "end of input".to_string(),
            Some(t) => match &t.kind {
                TokenKind::Keyword(k) => format!("keyword {k:?}"),
                TokenKind::Symbol(c) => format!("symbol {c:?}"),
                TokenKind::IntConst(n) => format!("integer {n}"),
                TokenKind::StringConst(s) => format!("string {s:?}"),
                TokenKind::Identifier(s) => format!("identifier {s:?}"),
            },
        }
    }

    fn syntax_error(&self, expected: impl Into<String>) -> JackError {
        JackError::Syntax {
            line: self.cur_line(),
            expected: expected.into(),
            found: self.describe_current(),
        }
    }

    fn advance(&mut self) {
        self.tokenizer.advance();
    }

    fn expect_symbol(&mut self, expected: char) -> Result<()> {
        match self.cur_symbol() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            _ => Err(self.syntax_error(format!("'{expected}'"))),
        }
    }

    fn expect_keyword(&mut self, expected: &'static str) -> Result<()> {
        match self.cur_keyword() {
            Some(k) if k == expected => {
                self.advance();
                Ok(())
            }
            _ => Err(self.syntax_error(format!("keyword '{expected}'"))),
        }
    }

    fn expect_identifier(&mut self, what: &'static str) -> Result<String> {
        match self.cur_identifier() {
            Some(name) => {
                let name = name.to_string();
                self.advance();
                Ok(name)
            }
            None => Err(self.syntax_error(what)),
        }
    }

    fn is_type_token(&self) -> bool {
        matches!(self.cur_keyword(), Some("int") | Some("char") | Some("boolean")) || self.cur_identifier().is_some()
    }

    fn expect_type(&mut self) -> Result<String> {
        if let Some(name) = self.cur_identifier() {
            let name = name.to_string();
            self.advance();
            return Ok(name);
        }
        match self.cur_keyword() {
            Some(k @ ("int" | "char" | "boolean")) => {
                let k = k.to_string();
                self.advance();
                Ok(k)
            }
            _ => Err(self.syntax_error("a type (int, char, boolean, or class name)")),
        }
    }

    fn next_label(&mut self) -> u32 {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    // ---- grammar ----

    fn compile_class(&mut self) -> Result<()> {
        self.expect_keyword("class")?;
        self.class_name = self.expect_identifier("class name")?;
        self.expect_symbol('{')?;

        while matches!(self.cur_keyword(), Some("static") | Some("field")) {
            self.compile_class_var_dec()?;
        }
        while matches!(self.cur_keyword(), Some("constructor") | Some("function") | Some("method")) {
            self.compile_subroutine()?;
        }

        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<()> {
        let kind = match self.cur_keyword() {
            Some("static") => Kind::Static,
            Some("field") => Kind::Field,
            _ => return Err(self.syntax_error("'static' or 'field'")),
        };
        self.advance();

        let var_type = self.expect_type()?;
        loop {
            let name = self.expect_identifier("variable name")?;
            self.symbols.define(&name, &var_type, kind);
            match self.cur_symbol() {
                Some(',') => self.advance(),
                Some(';') => {
                    self.advance();
                    break;
                }
                _ => return Err(self.syntax_error("',' or ';'")),
            }
        }
        Ok(())
    }

    fn compile_subroutine(&mut self) -> Result<()> {
        let subroutine_kind = self.cur_keyword().expect("caller checked this is a subroutine keyword");
        self.symbols.start_subroutine();
        self.advance();

        if subroutine_kind == "method" {
            let class_name = self.class_name.clone();
            self.symbols.define("this", &class_name, Kind::Argument);
        }

        // return type: 'void' or a type
        if self.cur_keyword() == Some("void") {
            self.advance();
        } else {
            self.expect_type()?;
        }

        let name = self.expect_identifier("subroutine name")?;
        let mangled = format!("{}.{name}", self.class_name);

        self.expect_symbol('(')?;
        if self.is_type_token() {
            self.compile_parameter_list()?;
        }
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        let mut n_locals = 0u16;
        while self.cur_keyword() == Some("var") {
            n_locals += self.compile_var_dec()?;
        }

        self.writer.write_function(&mangled, n_locals).map_err(JackError::Io)?;

        match subroutine_kind {
            "method" => {
                self.writer.write_push("argument", 0).map_err(JackError::Io)?;
                self.writer.write_pop("pointer", 0).map_err(JackError::Io)?;
            }
            "constructor" => {
                self.writer
                    .write_object_alloc(self.symbols.var_count(Kind::Field))
                    .map_err(JackError::Io)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<()> {
        loop {
            let var_type = self.expect_type()?;
            let name = self.expect_identifier("parameter name")?;
            self.symbols.define(&name, &var_type, Kind::Argument);
            if self.cur_symbol() == Some(',') {
                self.advance();
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Returns the number of locals this declaration introduced.
    fn compile_var_dec(&mut self) -> Result<u16> {
        self.expect_keyword("var")?;
        let var_type = self.expect_type()?;
        let mut count = 0u16;
        loop {
            let name = self.expect_identifier("variable name")?;
            self.symbols.define(&name, &var_type, Kind::Local);
            count += 1;
            match self.cur_symbol() {
                Some(',') => self.advance(),
                Some(';') => {
                    self.advance();
                    break;
                }
                _ => return Err(self.syntax_error("',' or ';'")),
            }
        }
        Ok(count)
    }

    fn compile_statements(&mut self) -> Result<()> {
        loop {
            match self.cur_keyword() {
                Some("let") => self.compile_let()?,
                Some("if") => self.compile_if()?,
                Some("while") => self.compile_while()?,
                Some("do") => self.compile_do()?,
                Some("return") => self.compile_return()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn compile_let(&mut self) -> Result<()> {
        self.expect_keyword("let")?;
        let name = self.expect_identifier("variable name")?;

        if self.cur_symbol() == Some('[') {
            let kind = self
                .symbols
                .kind_of(&name)
                .ok_or_else(|| JackError::UndeclaredSymbol { line: self.cur_line(), name: name.clone() })?;
            let index = self.symbols.index_of(&name).expect("kind_of succeeded");
            self.writer.write_push(kind.segment(), index).map_err(JackError::Io)?;

            self.advance();
            self.compile_expression()?;
            self.writer.write_operator('+').map_err(JackError::Io)?;
            self.expect_symbol(']')?;
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;

            self.writer.write_pop("temp", 0).map_err(JackError::Io)?;
            self.writer.write_pop("pointer", 1).map_err(JackError::Io)?;
            self.writer.write_push("temp", 0).map_err(JackError::Io)?;
            self.writer.write_pop("that", 0).map_err(JackError::Io)?;
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;

            let kind = self
                .symbols
                .kind_of(&name)
                .ok_or_else(|| JackError::UndeclaredSymbol { line: self.cur_line(), name: name.clone() })?;
            let index = self.symbols.index_of(&name).expect("kind_of succeeded");
            self.writer.write_pop(kind.segment(), index).map_err(JackError::Io)?;
        }

        Ok(())
    }

    fn compile_if(&mut self) -> Result<()> {
        self.expect_keyword("if")?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic("not").map_err(JackError::Io)?;

        let label = self.next_label();
        let else_label = format!("ELSE{label}");
        let end_label = format!("IF{label}");

        self.writer.write_if(&else_label).map_err(JackError::Io)?;
        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&end_label).map_err(JackError::Io)?;
        self.writer.write_label(&else_label).map_err(JackError::Io)?;

        if self.cur_keyword() == Some("else") {
            self.advance();
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
        }
        self.writer.write_label(&end_label).map_err(JackError::Io)?;
        Ok(())
    }

    fn compile_while(&mut self) -> Result<()> {
        self.expect_keyword("while")?;
        let label = self.next_label();
        let while_label = format!("WHILE{label}");
        let else_label = format!("ELSE{label}");

        self.writer.write_label(&while_label).map_err(JackError::Io)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic("not").map_err(JackError::Io)?;
        self.writer.write_if(&else_label).map_err(JackError::Io)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&while_label).map_err(JackError::Io)?;
        self.writer.write_label(&else_label).map_err(JackError::Io)?;
        Ok(())
    }

    fn compile_do(&mut self) -> Result<()> {
        self.expect_keyword("do")?;
        self.compile_subroutine_call()?;
        self.expect_symbol(';')?;
        self.writer.write_pop("temp", 0).map_err(JackError::Io)?;
        Ok(())
    }

    fn compile_return(&mut self) -> Result<()> {
        self.expect_keyword("return")?;
        if self.cur_symbol() == Some(';') {
            self.writer.write_push("constant", 0).map_err(JackError::Io)?;
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.writer.write_return().map_err(JackError::Io)?;
        Ok(())
    }

    fn is_operator(&self) -> bool {
        matches!(self.cur_symbol(), Some('+' | '-' | '*' | '/' | '&' | '|' | '<' | '>' | '='))
    }

    fn compile_expression(&mut self) -> Result<()> {
        self.compile_term()?;
        while self.is_operator() {
            let op = self.cur_symbol().expect("is_operator checked this");
            self.advance();
            self.compile_term()?;
            self.writer.write_operator(op).map_err(JackError::Io)?;
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<()> {
        if let Some(n) = self.cur_int() {
            self.writer.write_push("constant", n as u16).map_err(JackError::Io)?;
            self.advance();
        } else if let Some(s) = self.cur_string().map(str::to_string) {
            self.writer.write_string_constant(&s).map_err(JackError::Io)?;
            self.advance();
        } else if let Some(kw) = self.cur_keyword().filter(|k| matches!(*k, "true" | "false" | "null" | "this")) {
            self.writer.write_keyword_constant(kw).map_err(JackError::Io)?;
            self.advance();
        } else if self.cur_symbol() == Some('(') {
            self.advance();
            self.compile_expression()?;
            self.expect_symbol(')')?;
        } else if matches!(self.cur_symbol(), Some('-' | '~')) {
            let op = self.cur_symbol().expect("matched above");
            self.advance();
            self.compile_term()?;
            self.writer.write_unary(op).map_err(JackError::Io)?;
        } else if self.cur_identifier().is_some() && self.peek_symbol() == Some('[') {
            let name = self.cur_identifier().expect("checked above").to_string();
            let kind = self
                .symbols
                .kind_of(&name)
                .ok_or_else(|| JackError::UndeclaredSymbol { line: self.cur_line(), name: name.clone() })?;
            let index = self.symbols.index_of(&name).expect("kind_of succeeded");
            self.writer.write_push(kind.segment(), index).map_err(JackError::Io)?;

            self.advance();
            self.advance(); // consume '['
            self.compile_expression()?;
            self.writer.write_operator('+').map_err(JackError::Io)?;
            self.writer.write_pop("pointer", 1).map_err(JackError::Io)?;
            self.writer.write_push("that", 0).map_err(JackError::Io)?;
            self.expect_symbol(']')?;
        } else if self.cur_identifier().is_some() && matches!(self.peek_symbol(), Some('(' | '.')) {
            self.compile_subroutine_call()?;
        } else if let Some(name) = self.cur_identifier().map(str::to_string).filter(|n| self.symbols.exists(n)) {
            let kind = self.symbols.kind_of(&name).expect("exists checked");
            let index = self.symbols.index_of(&name).expect("exists checked");
            self.writer.write_push(kind.segment(), index).map_err(JackError::Io)?;
            self.advance();
        } else {
            return Err(self.syntax_error("a term"));
        }
        Ok(())
    }

    /// Disambiguates the three subroutine-call syntactic forms and emits
    /// the matching `call` with the correct implicit-argument handling;
    /// see §4.3.2.
    fn compile_subroutine_call(&mut self) -> Result<()> {
        let first = self.cur_identifier().expect("caller checked this is an identifier").to_string();

        if self.peek_symbol() == Some('(') {
            // bare name(args): implicit method call on the current object
            let mangled = format!("{}.{first}", self.class_name);
            self.advance();
            self.expect_symbol('(')?;
            self.writer.write_push("pointer", 0).map_err(JackError::Io)?;
            let n_args = 1 + self.compile_expression_list()?;
            self.expect_symbol(')')?;
            self.writer.write_call(&mangled, n_args).map_err(JackError::Io)?;
        } else if self.symbols.exists(&first) {
            // obj.name(args): method call on a known variable
            let kind = self.symbols.kind_of(&first).expect("exists checked");
            let index = self.symbols.index_of(&first).expect("exists checked");
            let var_type = self.symbols.type_of(&first).expect("exists checked").to_string();
            self.writer.write_push(kind.segment(), index).map_err(JackError::Io)?;

            self.advance();
            self.expect_symbol('.')?;
            let method = self.expect_identifier("subroutine name")?;
            let mangled = format!("{var_type}.{method}");
            self.expect_symbol('(')?;
            let n_args = 1 + self.compile_expression_list()?;
            self.expect_symbol(')')?;
            self.writer.write_call(&mangled, n_args).map_err(JackError::Io)?;
        } else {
            // Class.name(args): function or constructor call, no implicit receiver
            self.advance();
            self.expect_symbol('.')?;
            let method = self.expect_identifier("subroutine name")?;
            let mangled = format!("{first}.{method}");
            self.expect_symbol('(')?;
            let n_args = self.compile_expression_list()?;
            self.expect_symbol(')')?;
            self.writer.write_call(&mangled, n_args).map_err(JackError::Io)?;
        }
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<u16> {
        let mut count = 0u16;
        if self.cur_symbol() == Some(')') {
            return Ok(count);
        }
        self.compile_expression()?;
        count += 1;
        while self.cur_symbol() == Some(',') {
            self.advance();
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }
}

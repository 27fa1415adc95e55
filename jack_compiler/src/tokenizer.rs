//! Lexer for Jack source.
//!
//! Strips `//` and `/* */` comments (tracking line numbers through both),
//! then tokenizes by trying five longest-match rules in order at each
//! position: symbol, integer constant, keyword, string constant,
//! identifier. The keyword rule requires a non-identifier lookahead
//! character so `classroom` lexes as one identifier, never `class` plus
//! `room`; a greedy identifier scan naturally satisfies that requirement,
//! so no separate lookahead check is needed — the keyword table is
//! consulted only after the full run of identifier characters is known.

use phf::phf_map;

use crate::error::JackError;

static KEYWORDS: phf::Map<&'static str, &'static str> = phf_map! {
    "class" => "class",
    "constructor" => "constructor",
    "function" => "function",
    "method" => "method",
    "field" => "field",
    "static" => "static",
    "var" => "var",
    "int" => "int",
    "char" => "char",
    "boolean" => "boolean",
    "void" => "void",
    "true" => "true",
    "false" => "false",
    "null" => "null",
    "this" => "this",
    "let" => "let",
    "do" => "do",
    "if" => "if",
    "else" => "else",
    "while" => "while",
    "return" => "return",
};

const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(&'static str),
    Symbol(char),
    IntConst(i64),
    StringConst(String),
    Identifier(String),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Strips `//` and `/* */` comments from `source`, replacing each
/// commented span with nothing while preserving newline counts so the
/// tokenizer's own line tracking (which counts newlines as it scans the
/// stripped text) stays accurate.
fn strip_comments(source: &str) -> Result<String, JackError> {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut line = 1usize;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            let start_line = line;
            i += 2;
            let mut closed = false;
            while i < bytes.len() {
                if bytes[i] == b'\n' {
                    line += 1;
                    out.push('\n');
                }
                if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    i += 2;
                    closed = true;
                    break;
                }
                i += 1;
            }
            if !closed {
                return Err(JackError::UnterminatedComment { line: start_line });
            }
        } else {
            if c == b'\n' {
                line += 1;
            }
            out.push(c as char);
            i += 1;
        }
    }

    Ok(out)
}

pub struct Tokenizer {
    tokens: Vec<Token>,
    position: usize,
}

impl Tokenizer {
    pub fn new(source: &str) -> Result<Self, JackError> {
        let stripped = strip_comments(source)?;
        let tokens = lex(&stripped)?;
        Ok(Tokenizer { tokens, position: 0 })
    }

    pub fn has_more_tokens(&self) -> bool {
        self.position < self.tokens.len()
    }

    pub fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    pub fn current(&self) -> Option<&Token> {
        if self.position == 0 {
            None
        } else {
            self.tokens.get(self.position - 1)
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub fn current_line(&self) -> usize {
        self.current().map_or(0, |t| t.line)
    }
}

fn lex(source: &str) -> Result<Vec<Token>, JackError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1usize;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
            }
            i += 1;
            continue;
        }

        if SYMBOLS.contains(c) {
            tokens.push(Token { kind: TokenKind::Symbol(c), line });
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value: i64 = text.parse().map_err(|_| JackError::Lexical { line, text: text.clone() })?;
            if value > 32_767 {
                return Err(JackError::IntegerOutOfRange { line, value });
            }
            tokens.push(Token { kind: TokenKind::IntConst(value), line });
            continue;
        }

        if c == '"' {
            let start_line = line;
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != '"' && chars[i] != '\n' {
                i += 1;
            }
            if i >= chars.len() || chars[i] != '"' {
                return Err(JackError::UnterminatedString { line: start_line });
            }
            let text: String = chars[start..i].iter().collect();
            tokens.push(Token { kind: TokenKind::StringConst(text), line: start_line });
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            match KEYWORDS.get(text.as_str()) {
                Some(&kw) => tokens.push(Token { kind: TokenKind::Keyword(kw), line }),
                None => tokens.push(Token { kind: TokenKind::Identifier(text), line }),
            }
            continue;
        }

        return Err(JackError::Lexical { line, text: c.to_string() });
    }

    Ok(tokens)
}

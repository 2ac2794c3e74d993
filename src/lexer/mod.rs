//! Lexer for CORBA IDL
//!
//! A pull-based scanner: the parser asks for tokens on demand via
//! [`Lexer::next_token`] and [`Lexer::peek`]. Whitespace and comments are
//! discarded; preprocessor leftovers (`#line`, `#pragma`) become tokens,
//! with `#line` additionally redirecting the lexer's notion of the
//! current file and line. Lexical errors are accumulated and scanning
//! always makes forward progress; end of file is idempotent.

pub mod tokens;

pub use tokens::{lookup_keyword, Token, TokenKind, TokenValue};

use crate::common::SourceLocation;
use crate::diagnostics::Diagnostic;
use std::collections::VecDeque;

/// IDL tokenizer over a single preprocessed source buffer.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    file: String,
    lookahead: VecDeque<Token>,
    errors: Vec<Diagnostic>,
}

impl Lexer {
    pub fn new(source: &str, filename: impl Into<String>) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            file: filename.into(),
            lookahead: VecDeque::new(),
            errors: Vec::new(),
        }
    }

    /// Get the next token, consuming it.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.lookahead.pop_front() {
            return tok;
        }
        self.scan_token()
    }

    /// Peek at the token `n` positions ahead without consuming anything.
    pub fn peek(&mut self, n: usize) -> Token {
        while self.lookahead.len() <= n {
            let tok = self.scan_token();
            self.lookahead.push_back(tok);
        }
        self.lookahead[n].clone()
    }

    /// Check if there are more tokens to produce.
    pub fn has_more(&self) -> bool {
        !self.at_end() || !self.lookahead.is_empty()
    }

    /// All lexical errors collected so far.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The location scanning has reached, honoring `#line` redirects.
    pub fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.line, self.column)
    }

    // ==================== CHARACTER HELPERS ====================

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek_char(&self) -> char {
        self.chars.get(self.pos).copied().unwrap_or('\0')
    }

    fn peek_char_at(&self, n: usize) -> char {
        self.chars.get(self.pos + n).copied().unwrap_or('\0')
    }

    fn bump(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn eat_char(&mut self, expected: char) -> bool {
        if self.at_end() || self.chars[self.pos] != expected {
            return false;
        }
        self.bump();
        true
    }

    /// Does the unscanned input start with `s`?
    fn rest_starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_char_at(i) == c)
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors
            .push(Diagnostic::error(message, self.current_location()));
    }

    // ==================== TRIVIA ====================

    fn skip_whitespace_and_comments(&mut self) {
        while !self.at_end() {
            match self.peek_char() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                '/' if self.peek_char_at(1) == '/' => self.skip_line_comment(),
                '/' if self.peek_char_at(1) == '*' => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        self.bump();
        self.bump();
        while !self.at_end() && self.peek_char() != '\n' {
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        self.bump();
        self.bump();
        while !self.at_end() {
            if self.peek_char() == '*' && self.peek_char_at(1) == '/' {
                self.bump();
                self.bump();
                return;
            }
            self.bump();
        }
        self.error("Unterminated block comment");
    }

    // ==================== SCANNING ====================

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_whitespace_and_comments();

            if self.at_end() {
                return Token::eof(self.current_location());
            }

            let loc = self.current_location();
            let c = self.peek_char();

            // Preprocessor directives
            if c == '#' {
                if self.rest_starts_with("#line")
                    || (self.rest_starts_with("# ") && self.peek_char_at(2).is_ascii_digit())
                {
                    return self.scan_line_directive();
                }
                if self.rest_starts_with("#pragma") {
                    return self.scan_pragma();
                }
                // Any other directive is discarded to end of line
                while !self.at_end() && self.peek_char() != '\n' {
                    self.bump();
                }
                continue;
            }

            if is_identifier_start(c) {
                // Wide string/char literals: L"..." or L'...'
                if c == 'L' && (self.peek_char_at(1) == '"' || self.peek_char_at(1) == '\'') {
                    self.bump();
                    return if self.peek_char() == '"' {
                        self.scan_string(true)
                    } else {
                        self.scan_char(true)
                    };
                }
                return self.scan_identifier_or_keyword();
            }

            if c.is_ascii_digit() {
                return self.scan_number();
            }

            if c == '"' {
                return self.scan_string(false);
            }

            if c == '\'' {
                return self.scan_char(false);
            }

            self.bump();
            let kind = match c {
                ';' => TokenKind::Semicolon,
                ',' => TokenKind::Comma,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '[' => TokenKind::LeftBracket,
                ']' => TokenKind::RightBracket,
                '=' => TokenKind::Equals,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '&' => TokenKind::Ampersand,
                '|' => TokenKind::Pipe,
                '^' => TokenKind::Caret,
                '~' => TokenKind::Tilde,
                ':' => {
                    if self.eat_char(':') {
                        return Token::new(TokenKind::DoubleColon, "::", loc);
                    }
                    TokenKind::Colon
                }
                '<' => {
                    if self.eat_char('<') {
                        return Token::new(TokenKind::LeftShift, "<<", loc);
                    }
                    TokenKind::LeftAngle
                }
                '>' => {
                    if self.eat_char('>') {
                        return Token::new(TokenKind::RightShift, ">>", loc);
                    }
                    TokenKind::RightAngle
                }
                _ => {
                    self.error(format!("Unexpected character: {c}"));
                    return Token::new(TokenKind::Unknown, c.to_string(), loc);
                }
            };
            return Token::new(kind, c.to_string(), loc);
        }
    }

    fn scan_identifier_or_keyword(&mut self) -> Token {
        let loc = self.current_location();
        let mut text = String::new();

        while !self.at_end() && is_identifier_char(self.peek_char()) {
            text.push(self.bump());
        }

        if let Some(kw) = lookup_keyword(&text) {
            return Token::new(kw, text, loc);
        }

        let value = TokenValue::Str(text.clone());
        Token::with_value(TokenKind::Identifier, value, text, loc)
    }

    fn scan_number(&mut self) -> Token {
        let loc = self.current_location();
        let mut text = String::new();
        let mut is_float = false;
        let mut is_hex = false;
        let mut is_octal = false;

        // Hex or octal prefix
        if self.peek_char() == '0' {
            text.push(self.bump());
            if self.peek_char() == 'x' || self.peek_char() == 'X' {
                is_hex = true;
                text.push(self.bump());
                while !self.at_end() && self.peek_char().is_ascii_hexdigit() {
                    text.push(self.bump());
                }
            } else if is_octal_digit(self.peek_char()) {
                is_octal = true;
                while !self.at_end() && is_octal_digit(self.peek_char()) {
                    text.push(self.bump());
                }
            }
        }

        if !is_hex && !is_octal {
            while !self.at_end() && self.peek_char().is_ascii_digit() {
                text.push(self.bump());
            }

            // Fractional part: only a '.' followed by a digit
            if self.peek_char() == '.' && self.peek_char_at(1).is_ascii_digit() {
                is_float = true;
                text.push(self.bump());
                while !self.at_end() && self.peek_char().is_ascii_digit() {
                    text.push(self.bump());
                }
            }

            // Exponent
            if self.peek_char() == 'e' || self.peek_char() == 'E' {
                is_float = true;
                text.push(self.bump());
                if self.peek_char() == '+' || self.peek_char() == '-' {
                    text.push(self.bump());
                }
                while !self.at_end() && self.peek_char().is_ascii_digit() {
                    text.push(self.bump());
                }
            }

            // Float suffix
            if matches!(self.peek_char(), 'f' | 'F' | 'd' | 'D') {
                is_float = true;
                text.push(self.bump());
            }
        }

        if is_float {
            let digits = text.trim_end_matches(|c| matches!(c, 'f' | 'F' | 'd' | 'D'));
            let value = match digits.parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    self.error(format!("Invalid float literal: {text}"));
                    0.0
                }
            };
            return Token::with_value(TokenKind::FloatLiteral, TokenValue::Float(value), text, loc);
        }

        let parsed = if is_hex {
            u64::from_str_radix(&text[2..], 16)
        } else if is_octal {
            u64::from_str_radix(&text, 8)
        } else {
            text.parse::<u64>()
        };
        // Literals within i64 range stay signed; larger ones keep their
        // full unsigned value rather than a reinterpreted bit pattern.
        let value = match parsed {
            Ok(v) if v <= i64::MAX as u64 => TokenValue::Int(v as i64),
            Ok(v) => TokenValue::UInt(v),
            Err(_) => {
                self.error(format!("Invalid integer literal: {text}"));
                TokenValue::Int(0)
            }
        };
        Token::with_value(TokenKind::IntegerLiteral, value, text, loc)
    }

    fn scan_string(&mut self, is_wide: bool) -> Token {
        let loc = self.current_location();
        let mut text = String::new();
        let mut value = String::new();

        self.bump();
        text.push('"');

        while !self.at_end() && self.peek_char() != '"' {
            if self.peek_char() == '\n' {
                self.error("Unterminated string literal");
                break;
            }
            if self.peek_char() == '\\' {
                text.push(self.bump());
                if self.at_end() {
                    break;
                }
                let escaped = self.bump();
                text.push(escaped);
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    '\'' => value.push('\''),
                    '0' => value.push('\0'),
                    'x' => {
                        // Hex escape, one or two digits
                        let mut hex = String::new();
                        while hex.len() < 2 && !self.at_end() && self.peek_char().is_ascii_hexdigit()
                        {
                            let d = self.bump();
                            hex.push(d);
                            text.push(d);
                        }
                        if let Ok(v) = u8::from_str_radix(&hex, 16) {
                            value.push(v as char);
                        }
                    }
                    other => value.push(other),
                }
            } else {
                let c = self.bump();
                text.push(c);
                value.push(c);
            }
        }

        if !self.at_end() {
            text.push(self.bump());
        }

        let kind = if is_wide {
            TokenKind::WideStringLiteral
        } else {
            TokenKind::StringLiteral
        };
        Token::with_value(kind, TokenValue::Str(value), text, loc)
    }

    fn scan_char(&mut self, is_wide: bool) -> Token {
        let loc = self.current_location();
        let mut text = String::new();
        let mut value = '\0';

        self.bump();
        text.push('\'');

        if !self.at_end() && self.peek_char() != '\'' {
            if self.peek_char() == '\\' {
                text.push(self.bump());
                if !self.at_end() {
                    let escaped = self.bump();
                    text.push(escaped);
                    value = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        '\'' => '\'',
                        '0' => '\0',
                        other => other,
                    };
                }
            } else {
                value = self.bump();
                text.push(value);
            }
        }

        if !self.at_end() && self.peek_char() == '\'' {
            text.push(self.bump());
        } else {
            self.error("Unterminated character literal");
        }

        let kind = if is_wide {
            TokenKind::WideCharLiteral
        } else {
            TokenKind::CharLiteral
        };
        Token::with_value(kind, TokenValue::Char(value), text, loc)
    }

    fn scan_pragma(&mut self) -> Token {
        let loc = self.current_location();
        let mut text = String::new();

        while !self.at_end() && self.peek_char() != '\n' {
            text.push(self.bump());
        }

        Token::with_value(TokenKind::Pragma, TokenValue::Str(text.clone()), text, loc)
    }

    /// Scan a `#line N "file"` (or `# N "file"`) directive.
    ///
    /// Side effect: the lexer's current line is reset to the embedded
    /// number and the current filename to the embedded name, so every
    /// later token reports its position in the original source rather
    /// than the preprocessor's temporary.
    fn scan_line_directive(&mut self) -> Token {
        let loc = self.current_location();
        let mut text = String::new();

        while !self.at_end() && self.peek_char() != '\n' {
            text.push(self.bump());
        }

        if let Some(start) = text.find(|c: char| c.is_ascii_digit()) {
            let digits: String = text[start..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if let Ok(n) = digits.parse::<usize>() {
                self.line = n;
            }
            let after = start + digits.len();
            if let Some(q1) = text[after..].find('"') {
                let name_start = after + q1 + 1;
                if let Some(q2) = text[name_start..].find('"') {
                    self.file = text[name_start..name_start + q2].to_string();
                }
            }
        }

        Token::with_value(
            TokenKind::LineDirective,
            TokenValue::Str(text.clone()),
            text,
            loc,
        )
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_octal_digit(c: char) -> bool {
    ('0'..='7').contains(&c)
}

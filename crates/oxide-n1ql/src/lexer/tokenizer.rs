//! Raw N1QL scanner.
//!
//! The scanner knows nothing about namespaces; see [`super::TokenStream`]
//! for the adapter the parser actually pulls from.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes N1QL input.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the source text this lexer scans.
    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.input
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace and comments. Returns an error token for a block
    /// comment that runs to the end of input.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            // -- line comment
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // /* block comment */
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                let opened = self.pos;
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => {
                            return Some(Token::new(
                                TokenKind::Error(String::from("Unterminated block comment")),
                                Span::new(opened, self.pos),
                            ));
                        }
                        _ => {}
                    }
                }
                continue;
            }

            return None;
        }
    }

    /// Creates a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Consumes `next` if it is the upcoming character and returns `then`,
    /// otherwise returns `otherwise`.
    fn either(&mut self, next: char, then: TokenKind, otherwise: TokenKind) -> Token {
        if self.peek() == Some(next) {
            self.advance();
            self.make_token(then)
        } else {
            self.make_token(otherwise)
        }
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier(String::from(text))),
        }
    }

    /// Scans a backtick-quoted identifier. A trailing `i` marks it as
    /// case-insensitive.
    fn scan_quoted_identifier(&mut self) -> Token {
        self.advance(); // opening backtick
        let mut name = String::new();

        loop {
            match self.advance() {
                Some('`') if self.peek() == Some('`') => {
                    self.advance();
                    name.push('`');
                }
                Some('`') => break,
                Some(c) => name.push(c),
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated quoted identifier",
                    )));
                }
            }
        }

        let icase = matches!(self.peek(), Some('i' | 'I'))
            && !self.peek_next().is_some_and(|c| c.is_alphanumeric() || c == '_');
        if icase {
            self.advance();
            self.make_token(TokenKind::IdentifierIcase(name))
        } else {
            self.make_token(TokenKind::Identifier(name))
        }
    }

    /// Scans a number (integer or float).
    fn scan_number(&mut self) -> Token {
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];
        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.make_token(TokenKind::Error(format!("Invalid float: {e}"))),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                Err(e) => self.make_token(TokenKind::Error(format!("Invalid integer: {e}"))),
            }
        }
    }

    /// Scans a string literal. Both quote styles accept backslash escapes
    /// and a doubled quote character.
    fn scan_string(&mut self, quote: char) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.advance();
                        value.push(quote);
                    } else {
                        break;
                    }
                }
                Some('\\') => match self.scan_escape() {
                    Ok(c) => value.push(c),
                    Err(message) => return self.make_token(TokenKind::Error(message)),
                },
                Some(c) => value.push(c),
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated string literal",
                    )));
                }
            }
        }

        self.make_token(TokenKind::String(value))
    }

    /// Decodes the escape sequence following a backslash.
    fn scan_escape(&mut self) -> Result<char, String> {
        let c = self
            .advance()
            .ok_or_else(|| String::from("Unterminated string literal"))?;
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '\\' | '/' | '"' | '\'' | '`' => c,
            'u' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .advance()
                        .and_then(|d| d.to_digit(16))
                        .ok_or_else(|| String::from("Invalid unicode escape"))?;
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or_else(|| String::from("Invalid unicode escape"))?
            }
            other => return Err(format!("Invalid escape sequence: \\{other}")),
        })
    }

    /// Scans a `$name` or `$1` parameter.
    fn scan_parameter(&mut self) -> Token {
        self.advance(); // $
        let body_start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let body = &self.input[body_start..self.pos];

        if body.is_empty() {
            return self.make_token(TokenKind::Error(String::from("Unexpected character: $")));
        }
        if body.bytes().all(|b| b.is_ascii_digit()) {
            return match body.parse::<usize>() {
                Ok(n) if n > 0 => self.make_token(TokenKind::PositionalParam(n)),
                _ => self.make_token(TokenKind::Error(format!(
                    "Invalid positional parameter: ${body}"
                ))),
            };
        }
        self.make_token(TokenKind::NamedParam(String::from(body)))
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        if let Some(unterminated) = self.skip_whitespace_and_comments() {
            return unterminated;
        }
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '\'' | '"' => return self.scan_string(c),
            '`' => return self.scan_quoted_identifier(),
            '$' => return self.scan_parameter(),
            c if c.is_ascii_digit() => return self.scan_number(),
            c if c.is_alphabetic() || c == '_' => return self.scan_identifier(),
            _ => {}
        }

        self.advance();
        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            '[' => self.make_token(TokenKind::LeftBracket),
            ']' => self.make_token(TokenKind::RightBracket),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '.' => self.make_token(TokenKind::Dot),
            ':' => self.make_token(TokenKind::Colon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '?' => self.make_token(TokenKind::Question),
            '=' => self.either('=', TokenKind::DoubleEq, TokenKind::Eq),
            '>' => self.either('=', TokenKind::GtEq, TokenKind::Gt),
            '<' => match self.peek() {
                Some('>') => self.either('>', TokenKind::NotEq, TokenKind::Lt),
                _ => self.either('=', TokenKind::LtEq, TokenKind::Lt),
            },
            '!' => self.either(
                '=',
                TokenKind::NotEq,
                TokenKind::Error(String::from("Unexpected character: !")),
            ),
            '|' => self.either(
                '|',
                TokenKind::Concat,
                TokenKind::Error(String::from("Unexpected character: |")),
            ),
            _ => self.make_token(TokenKind::Error(format!("Unexpected character: {c}"))),
        }
    }
}

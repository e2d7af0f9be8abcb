//! Lexical adapter between the raw scanner and the parser driver.
//!
//! Resolves `ns:keyspace` references: an identifier naming a registered
//! namespace and immediately followed by `:` is re-tagged as
//! [`TokenKind::Namespace`]. Deciding this needs exactly one token of
//! lookahead, which is held in a private pushback slot.

use std::collections::HashSet;

use super::{Lexer, Token, TokenKind};

/// Pull-based token source consumed by the parser driver.
pub trait TokenSource {
    /// Returns the next token. After the end of input, keeps returning EOF.
    fn next_token(&mut self) -> Token;

    /// Takes the pending scanner error, if any, clearing it.
    fn take_lex_error(&mut self) -> Option<String>;
}

/// The lexical adapter used by parse sessions.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    namespaces: &'a HashSet<String>,
    pushback: Option<Token>,
    lex_error: Option<String>,
}

impl<'a> TokenStream<'a> {
    /// Creates an adapter over `source` that recognises the given namespaces.
    #[must_use]
    pub const fn new(source: &'a str, namespaces: &'a HashSet<String>) -> Self {
        Self {
            lexer: Lexer::new(source),
            namespaces,
            pushback: None,
            lex_error: None,
        }
    }

    /// Pulls from the pushback slot first, then from the scanner.
    fn pull(&mut self) -> Token {
        if let Some(token) = self.pushback.take() {
            return token;
        }
        let token = self.lexer.next_token();
        if let TokenKind::Error(message) = &token.kind {
            // Only the first malformed token before a report is kept.
            if self.lex_error.is_none() {
                self.lex_error = Some(message.clone());
            }
        }
        token
    }
}

impl TokenSource for TokenStream<'_> {
    fn next_token(&mut self) -> Token {
        let token = self.pull();

        let is_namespace = token
            .as_identifier()
            .is_some_and(|name| self.namespaces.contains(name));
        if !is_namespace {
            return token;
        }

        let next = self.pull();
        let qualified = matches!(next.kind, TokenKind::Colon);
        self.pushback = Some(next);

        match token.kind {
            TokenKind::Identifier(name) if qualified => {
                Token::new(TokenKind::Namespace(name), token.span)
            }
            kind => Token::new(kind, token.span),
        }
    }

    fn take_lex_error(&mut self) -> Option<String> {
        self.lex_error.take()
    }
}

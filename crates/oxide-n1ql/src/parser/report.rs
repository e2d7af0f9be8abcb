//! Collects diagnostics for one parse.
//!
//! Syntax errors carry the 1-based line and column of the offending token
//! and a snippet of the text leading up to it. Once the parse has been
//! stopped (an abort, a fault, or the depth limit) further syntax errors
//! are dropped.

use std::fmt::Write as _;

use tracing::debug;

use super::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::lexer::{Position, Span, Token};

/// Default number of bytes of context before an error.
pub const DEFAULT_SNIPPET_WIDTH: usize = 40;

/// Accumulates diagnostics for one source text.
#[derive(Debug)]
pub struct Reporter<'a> {
    source: &'a str,
    snippet_width: usize,
    diagnostics: Diagnostics,
    stopped: bool,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter for `source`.
    #[must_use]
    pub fn new(source: &'a str, snippet_width: usize) -> Self {
        Self {
            source,
            snippet_width,
            diagnostics: Diagnostics::default(),
            stopped: false,
        }
    }

    /// The text before the end of `span`: at most `snippet_width` bytes
    /// back from its start, never crossing the previous newline, with
    /// leading blanks trimmed.
    #[must_use]
    pub fn snippet(&self, span: Span) -> &'a str {
        let source = self.source;
        let end = span.end.min(source.len());
        let start = span.start.min(end);
        let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
        let mut begin = start.saturating_sub(self.snippet_width).max(line_start);
        while !source.is_char_boundary(begin) {
            begin += 1;
        }
        source[begin..end].trim_start_matches([' ', '\t'])
    }

    /// Records a syntax error at `token`. A pending scanner error is
    /// appended to the message.
    pub fn syntax_error(&mut self, token: &Token, lex_error: Option<String>) {
        if self.stopped {
            debug!(offset = token.span.start, "syntax error after stop suppressed");
            return;
        }
        let position = Position::locate(self.source, token.span.start);
        let found = if token.is_eof() {
            "end of input"
        } else {
            self.source
                .get(token.span.start..token.span.end)
                .unwrap_or_default()
        };
        let mut message = format!(
            "syntax error - {position}, near '{}', at: {found}",
            self.snippet(token.span)
        );
        if let Some(lex) = lex_error {
            let _ = write!(message, " (lexer: {lex})");
        }
        debug!(%message, "syntax error");
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::Syntax,
            message,
            self.source,
            token.span,
        ));
    }

    /// Records a misuse of otherwise valid syntax.
    pub fn usage_error(&mut self, message: impl Into<String>, span: Span) {
        let diagnostic = Diagnostic::new(DiagnosticKind::Usage, message, self.source, span);
        debug!(message = %diagnostic.message, "usage error");
        self.diagnostics.push(diagnostic);
    }

    /// Records a failed semantic action and stops the parse.
    pub fn fault(&mut self, message: impl Into<String>, span: Span, trace: String) {
        self.diagnostics.push(
            Diagnostic::new(DiagnosticKind::Fault, message, self.source, span).with_trace(trace),
        );
        self.stopped = true;
    }

    /// Records that the parser stack hit `limit` and stops the parse.
    pub fn depth_exceeded(&mut self, limit: usize, span: Span) {
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::ResourceLimit,
            format!("parser stack overflow: depth limit {limit} exceeded"),
            self.source,
            span,
        ));
        self.stopped = true;
    }

    /// Marks the parse as stopped.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consumes the reporter.
    #[must_use]
    pub fn finish(self) -> Diagnostics {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    fn token_at(source: &str, text: &str) -> Token {
        let start = source.find(text).unwrap_or_default();
        Token::new(
            TokenKind::Identifier(text.to_string()),
            Span::new(start, start + text.len()),
        )
    }

    #[test]
    fn test_syntax_error_message() {
        let source = "select * fro t";
        let mut reporter = Reporter::new(source, DEFAULT_SNIPPET_WIDTH);
        reporter.syntax_error(&token_at(source, "fro"), None);
        let diagnostics = reporter.finish();
        let first = diagnostics.first().unwrap();
        assert_eq!(
            first.message,
            "syntax error - line 1, column 10, near 'select * fro', at: fro"
        );
        assert_eq!(first.kind, DiagnosticKind::Syntax);
    }

    #[test]
    fn test_snippet_stops_at_newline_and_trims() {
        let source = "select a\n   \tfrom b zz";
        let reporter = Reporter::new(source, DEFAULT_SNIPPET_WIDTH);
        assert_eq!(reporter.snippet(token_at(source, "zz").span), "from b zz");
    }

    #[test]
    fn test_snippet_width_limit() {
        let source = "select abcdefghij from qq";
        let reporter = Reporter::new(source, 4);
        assert_eq!(reporter.snippet(token_at(source, "qq").span), "rom qq");
    }

    #[test]
    fn test_end_of_input_and_lex_error() {
        let source = "select 'abc";
        let mut reporter = Reporter::new(source, DEFAULT_SNIPPET_WIDTH);
        let eof = Token::new(TokenKind::Eof, Span::new(source.len(), source.len()));
        reporter.syntax_error(&eof, Some(String::from("Unterminated string")));
        let message = &reporter.diagnostics().first().unwrap().message;
        assert!(message.ends_with("at: end of input (lexer: Unterminated string)"));
    }

    #[test]
    fn test_suppressed_after_stop() {
        let source = "a b";
        let mut reporter = Reporter::new(source, DEFAULT_SNIPPET_WIDTH);
        reporter.depth_exceeded(200, Span::new(0, 1));
        reporter.syntax_error(&token_at(source, "b"), None);
        assert!(reporter.is_stopped());
        assert_eq!(reporter.diagnostics().len(), 1);
        assert_eq!(
            reporter.diagnostics().first().unwrap().message,
            "parser stack overflow: depth limit 200 exceeded"
        );
    }
}

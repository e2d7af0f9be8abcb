//! Parser diagnostics.

use crate::lexer::{Position, Span};

/// What kind of problem a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The token stream did not match the grammar.
    Syntax,
    /// Well-formed syntax that is used incorrectly, such as an unknown
    /// function or a wrong argument count.
    Usage,
    /// The parser stack grew past its limit.
    ResourceLimit,
    /// A semantic action failed unexpectedly. The parse was stopped.
    Fault,
}

/// A single parse diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The full message.
    pub message: String,
    /// The offending source range.
    pub span: Span,
    /// Line and column of `span.start`.
    pub position: Position,
    /// Backtrace captured for [`DiagnosticKind::Fault`].
    pub trace: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic located in `source`.
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, source: &str, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            position: Position::locate(source, span.start),
            trace: None,
        }
    }

    /// Attaches a backtrace.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every diagnostic of one parse, in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub const fn new(items: Vec<Diagnostic>) -> Self {
        Self(items)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Diagnostic> {
        self.0.first()
    }

    /// Number of diagnostics of the given kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.0.iter().filter(|d| d.kind == kind).count()
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }
}

impl core::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = core::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_position() {
        let d = Diagnostic::new(
            DiagnosticKind::Usage,
            "Invalid function foo.",
            "select\n  foo(1)",
            Span::new(9, 15),
        );
        assert_eq!((d.position.line, d.position.column), (2, 3));
        assert_eq!(d.to_string(), "Invalid function foo.");
        assert!(d.trace.is_none());
    }

    #[test]
    fn test_diagnostics_display_joins_lines() {
        let mut all = Diagnostics::default();
        all.push(Diagnostic::new(DiagnosticKind::Syntax, "first", "", Span::default()));
        all.push(Diagnostic::new(DiagnosticKind::Usage, "second", "", Span::default()));
        assert_eq!(all.to_string(), "first\nsecond");
        assert_eq!(all.count(DiagnosticKind::Syntax), 1);
        assert_eq!(all.len(), 2);
    }
}

//! Error types returned by the entry points.

use crate::ast::QueryContextError;
use crate::formalize::FormalizeError;
use crate::grammar::GrammarError;
use crate::parser::Diagnostics;

/// Errors that can occur while parsing a statement or an expression.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The text did not parse. Every diagnostic is kept, in order.
    #[error("{0}")]
    Parse(Diagnostics),

    /// The text parsed as an expression where a statement was expected.
    #[error("input was not a statement")]
    NotAStatement,

    /// The text parsed as a statement where an expression was expected.
    #[error("input was not an expression")]
    NotAnExpression,

    /// Names in the statement did not resolve.
    #[error(transparent)]
    Formalize(#[from] FormalizeError),

    /// The query context given to the parser is malformed.
    #[error("invalid query context '{context}': {source}")]
    QueryContext {
        /// The rejected query context.
        context: String,
        /// What is wrong with it.
        source: QueryContextError,
    },

    /// The grammar definition could not be compiled.
    #[error("grammar error: {0}")]
    Grammar(&'static GrammarError),
}

impl Error {
    /// The parse diagnostics, if this is a parse failure.
    #[must_use]
    pub const fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Parse(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}

/// Result type for parser operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Parse sessions and the public entry points.
//!
//! A [`Session`] lives for exactly one entry-point call. It owns the
//! parameter counters, the query-context stack and the result slot, and it
//! is the [`Reducer`] the driver feeds reductions to. The reporter is owned
//! by the call and lent to the driver next to the session.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::driver::{ActionFault, Driver, Outcome, Reducer};
use super::guard;
use super::error::{Diagnostic, DiagnosticKind, Diagnostics};
use super::report::{DEFAULT_SNIPPET_WIDTH, Reporter};
use crate::ast::{Expr, Path, Statement, StatementKind, validate_query_context};
use crate::config::{self, DEFAULT_MAX_DEPTH, DEFAULT_NAMESPACE};
use crate::error::{Error, Result};
use crate::formalize;
use crate::grammar::actions::Reduction;
use crate::grammar::value::Value;
use crate::grammar::{n1ql_action, n1ql_table};
use crate::lexer::{Span, Token, TokenStream};

/// What the caller asked for. Some constructs are only legal in a
/// statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Statement,
    Expression,
}

/// Per-call settings, borrowed from a [`crate::ParserConfig`] or from the
/// process-wide defaults.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Settings<'a> {
    pub namespaces: &'a HashSet<String>,
    pub max_depth: usize,
    pub snippet_width: usize,
}

/// State of one parse.
#[derive(Debug)]
pub(crate) struct Session {
    mode: Mode,
    namespace: String,
    query_context: String,
    /// Contexts pushed by enclosing definitions, innermost last.
    contexts: Vec<String>,
    /// Last number handed to a `?`.
    next_param: usize,
    /// Every parameter occurrence.
    param_count: usize,
    statement: Option<StatementKind>,
    expression: Option<Expr>,
}

impl Session {
    pub(crate) fn new(mode: Mode, namespace: &str, query_context: &str) -> Self {
        Self {
            mode,
            namespace: namespace.to_string(),
            query_context: query_context.to_string(),
            contexts: Vec::new(),
            next_param: 0,
            param_count: 0,
            statement: None,
            expression: None,
        }
    }

    pub(crate) fn parsing_statement(&self) -> bool {
        self.mode == Mode::Statement
    }

    /// The ambient namespace.
    pub(crate) fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The innermost query context.
    pub(crate) fn query_context(&self) -> &str {
        self.contexts.last().unwrap_or(&self.query_context)
    }

    /// Resolves an unqualified keyspace name.
    pub(crate) fn resolve(&self, name: String) -> Path {
        Path::with_context(name, &self.namespace, self.query_context())
    }

    pub(crate) fn push_query_context(&mut self, path: &Path) {
        let context = path.query_context();
        trace!(%context, depth = self.contexts.len() + 1, "push query context");
        self.contexts.push(context);
    }

    pub(crate) fn pop_query_context(&mut self) {
        if let Some(context) = self.contexts.pop() {
            trace!(%context, depth = self.contexts.len(), "pop query context");
        }
    }

    /// Numbers the next `?` and counts it.
    pub(crate) fn next_positional(&mut self) -> usize {
        self.next_param += 1;
        self.param_count += 1;
        self.next_param
    }

    /// Counts a `$n` or `$name`.
    pub(crate) fn count_parameter(&mut self) {
        self.param_count += 1;
    }

    pub(crate) const fn param_count(&self) -> usize {
        self.param_count
    }

    pub(crate) fn set_statement(&mut self, statement: StatementKind) {
        self.statement = Some(statement);
    }

    pub(crate) fn set_expression(&mut self, expression: Expr) {
        self.expression = Some(expression);
    }

    /// Runs the driver over `text`. Any diagnostic fails the parse.
    fn run(&mut self, settings: &Settings<'_>, text: &str) -> Result<()> {
        let table = n1ql_table().map_err(Error::Grammar)?;
        let mut tokens = TokenStream::new(text, settings.namespaces);
        let mut reporter = Reporter::new(text, settings.snippet_width);
        let outcome = Driver::new(table, settings.max_depth).run(&mut tokens, self, &mut reporter);
        debug!(
            accepted = matches!(outcome, Outcome::Accepted(_)),
            diagnostics = reporter.diagnostics().len(),
            params = self.param_count,
            "parse finished"
        );
        if reporter.has_errors() {
            return Err(Error::Parse(reporter.finish()));
        }
        Ok(())
    }
}

impl Reducer for Session {
    type Value = Value;

    fn shift_value(&mut self, token: Token) -> Value {
        Value::Token(token)
    }

    fn empty_value(&mut self) -> Value {
        Value::Empty
    }

    fn reduce(
        &mut self,
        production: usize,
        values: Vec<Value>,
        span: Span,
        reporter: &mut Reporter<'_>,
    ) -> Result<Value, ActionFault> {
        let action = n1ql_action(production).ok_or(ActionFault::NoAction(production))?;
        action(&mut Reduction::new(self, reporter, span, values))
    }

    fn discard(&mut self, value: Value) {
        // A function definition abandoned by recovery leaves its context.
        if let Value::Context(path) = value {
            trace!(%path, "discarding function context");
            self.pop_query_context();
        }
    }
}

/// Runs `parse` with panics contained. A panic becomes an `internal error`
/// diagnostic.
fn guarded<T>(source: &str, parse: impl FnOnce() -> Result<T>) -> Result<T> {
    guard::contain(parse).unwrap_or_else(|caught| {
        let message = format!("internal error: {}", caught.message);
        tracing::warn!(%message, "parse panicked");
        let diagnostic = Diagnostic::new(DiagnosticKind::Fault, message, source, Span::default())
            .with_trace(caught.trace);
        Err(Error::Parse(Diagnostics::new(vec![diagnostic])))
    })
}

/// Parses and formalizes one statement.
pub(crate) fn statement(
    settings: &Settings<'_>,
    text: &str,
    namespace: &str,
    query_context: &str,
) -> Result<Statement> {
    validate_query_context(query_context).map_err(|source| Error::QueryContext {
        context: query_context.to_string(),
        source,
    })?;
    guarded(text, || {
        let mut session = Session::new(Mode::Statement, namespace, query_context);
        session.run(settings, text)?;
        let kind = session.statement.take().ok_or(Error::NotAStatement)?;
        let kind = formalize::statement(kind)?;
        Ok(Statement {
            kind,
            param_count: session.param_count(),
        })
    })
}

/// Parses one standalone expression, unformalized.
pub(crate) fn expression(settings: &Settings<'_>, text: &str) -> Result<Expr> {
    guarded(text, || {
        let mut session = Session::new(Mode::Expression, "", "");
        session.run(settings, text)?;
        session.expression.take().ok_or(Error::NotAnExpression)
    })
}

/// Parses a statement in the default namespace with no query context.
///
/// Namespaces registered with [`crate::set_namespaces`] are recognised in
/// `ns:keyspace` references.
///
/// # Errors
///
/// Returns [`Error::Parse`] with every diagnostic if the text does not
/// parse, [`Error::NotAStatement`] if it is an expression, and
/// [`Error::Formalize`] if names do not resolve.
///
/// # Example
///
/// ```rust
/// use oxide_n1ql::{parse_statement, ast::StatementKind};
///
/// let stmt = parse_statement("SELECT name FROM customers WHERE age > ?").unwrap();
/// assert!(matches!(stmt.kind, StatementKind::Select(_)));
/// assert_eq!(stmt.param_count, 1);
/// ```
pub fn parse_statement(text: &str) -> Result<Statement> {
    parse_statement_in(text, DEFAULT_NAMESPACE, "")
}

/// Parses a statement whose unqualified keyspaces resolve in `namespace`
/// and `query_context`.
///
/// # Errors
///
/// As [`parse_statement`], plus [`Error::QueryContext`] for a malformed
/// query context.
pub fn parse_statement_in(text: &str, namespace: &str, query_context: &str) -> Result<Statement> {
    let namespaces = config::registered_namespaces();
    let settings = Settings {
        namespaces: &namespaces,
        max_depth: DEFAULT_MAX_DEPTH,
        snippet_width: DEFAULT_SNIPPET_WIDTH,
    };
    statement(&settings, text, namespace, query_context)
}

/// Parses a standalone expression. Aggregates and subqueries are rejected.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the text does not parse and
/// [`Error::NotAnExpression`] if it is a statement.
pub fn parse_expression(text: &str) -> Result<Expr> {
    let namespaces = config::registered_namespaces();
    let settings = Settings {
        namespaces: &namespaces,
        max_depth: DEFAULT_MAX_DEPTH,
        snippet_width: DEFAULT_SNIPPET_WIDTH,
    };
    expression(&settings, text)
}

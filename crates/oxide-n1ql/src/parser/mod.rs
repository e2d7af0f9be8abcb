//! N1QL Parser
//!
//! A table-driven shift-reduce driver with yacc-style error recovery, the
//! reporter that collects its diagnostics, and the per-call parse session.

mod driver;
mod error;
mod guard;
mod report;
mod session;

pub use driver::{ActionFault, Driver, Outcome, Reducer};
pub use error::{Diagnostic, DiagnosticKind, Diagnostics};
pub use report::{DEFAULT_SNIPPET_WIDTH, Reporter};
pub use session::{parse_expression, parse_statement, parse_statement_in};

pub(crate) use session::{Session, Settings, expression, statement};

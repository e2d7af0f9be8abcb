//! # oxide-n1ql
//!
//! A table-driven LALR(1) parser for N1QL, the SQL dialect for JSON
//! documents.
//!
//! This crate provides:
//! - A hand-written lexer with a namespace-aware token adapter
//! - An LALR(1) table builder and a shift-reduce driver with yacc-style
//!   error recovery, so one call reports every syntax error it can find
//! - Semantic actions that build a typed AST, number `?` parameters and
//!   resolve keyspaces against the ambient namespace and query context
//! - A formalize pass that qualifies bare identifiers with their keyspace
//!
//! ## Parsing statements
//!
//! ```rust
//! use oxide_n1ql::{parse_statement, ast::{Expr, ResultTerm, StatementKind}};
//!
//! let stmt = parse_statement("SELECT name FROM customers WHERE age > $min").unwrap();
//! let StatementKind::Select(select) = stmt.kind else { unreachable!() };
//!
//! // `name` now refers to the customers keyspace.
//! assert_eq!(
//!     select.first().projection.terms[0],
//!     ResultTerm::Expr {
//!         expr: Expr::identifier("customers").field("name"),
//!         alias: None,
//!     }
//! );
//! assert_eq!(stmt.param_count, 1);
//! ```
//!
//! ## Diagnostics
//!
//! A failed parse returns every diagnostic in source order:
//!
//! ```rust
//! use oxide_n1ql::parse_statement;
//!
//! let err = parse_statement("select a + from t where b + limit 1").unwrap_err();
//! assert_eq!(err.diagnostics().unwrap().len(), 2);
//! ```

pub mod ast;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formalize;
pub mod grammar;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, Path, Statement, StatementKind};
pub use config::{ParserConfig, set_namespaces};
pub use error::{Error, Result};
pub use formalize::FormalizeError;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Diagnostic, Diagnostics, parse_expression, parse_statement, parse_statement_in};

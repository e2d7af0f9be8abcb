#![allow(dead_code)]

use oxide_n1ql::ast::{
    BinaryOp, DeleteStatement, Expr, InsertStatement, Literal, Select, Statement, StatementKind,
    UnaryOp, UpdateStatement,
};
use oxide_n1ql::parser::{DiagnosticKind, Diagnostics};
use oxide_n1ql::{Error, parse_expression, parse_statement};

pub fn parse(text: &str) -> Statement {
    parse_statement(text).unwrap_or_else(|e| panic!("Failed to parse: {text}\nError: {e:?}"))
}

pub fn parse_err(text: &str) -> Error {
    parse_statement(text)
        .err()
        .unwrap_or_else(|| panic!("Expected an error for: {text}"))
}

/// The diagnostics of a statement that must fail to parse.
pub fn diagnostics(text: &str) -> Diagnostics {
    match parse_err(text) {
        Error::Parse(diagnostics) => diagnostics,
        other => panic!("Expected parse diagnostics for: {text}, got {other:?}"),
    }
}

pub fn syntax_errors(text: &str) -> usize {
    diagnostics(text).count(DiagnosticKind::Syntax)
}

/// The single usage error message of `text`.
pub fn usage_error(text: &str) -> String {
    let diagnostics = diagnostics(text);
    assert_eq!(diagnostics.len(), 1, "{text}: {diagnostics}");
    let diagnostic = diagnostics.first().unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::Usage, "{text}: {diagnostic}");
    diagnostic.message.clone()
}

pub fn parse_select(text: &str) -> Select {
    match parse(text).kind {
        StatementKind::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

pub fn parse_insert(text: &str) -> InsertStatement {
    match parse(text).kind {
        StatementKind::Insert(i) | StatementKind::Upsert(i) => i,
        other => panic!("Expected INSERT or UPSERT, got {other:?}"),
    }
}

pub fn parse_update(text: &str) -> UpdateStatement {
    match parse(text).kind {
        StatementKind::Update(u) => u,
        other => panic!("Expected UPDATE, got {other:?}"),
    }
}

pub fn parse_delete(text: &str) -> DeleteStatement {
    match parse(text).kind {
        StatementKind::Delete(d) => d,
        other => panic!("Expected DELETE, got {other:?}"),
    }
}

pub fn parse_expr(text: &str) -> Expr {
    parse_expression(text).unwrap_or_else(|e| panic!("Failed to parse: {text}\nError: {e:?}"))
}

/// Evaluates an integer expression. Anything else is a test bug.
pub fn eval(expr: &Expr) -> i64 {
    match expr {
        Expr::Literal(Literal::Integer(n)) => *n,
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => -eval(operand),
        Expr::Binary { left, op, right } => {
            let (l, r) = (eval(left), eval(right));
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Mod => l % r,
                other => panic!("cannot evaluate {other:?}"),
            }
        }
        other => panic!("cannot evaluate {other:?}"),
    }
}

/// The identifier `keyspace` with field `name`.
pub fn field(keyspace: &str, name: &str) -> Expr {
    Expr::identifier(keyspace).field(name)
}

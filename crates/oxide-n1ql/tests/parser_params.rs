//! Tests for parameter numbering and per-call isolation.

mod common;
use common::*;

use std::thread;

use oxide_n1ql::ast::{Expr, Parameter};

fn positional(n: usize) -> Expr {
    Expr::Parameter(Parameter::Positional(n))
}

#[test]
fn positional_parameters_are_numbered_in_order() {
    let stmt = parse("SELECT * FROM t WHERE a = ? AND b = ?");
    assert_eq!(stmt.param_count, 2);
    let select = parse_select("SELECT * FROM t WHERE a = ? AND b = ?");
    assert_eq!(
        select.first().where_clause,
        Some(
            field("t", "a")
                .eq(positional(1))
                .and(field("t", "b").eq(positional(2)))
        )
    );
}

#[test]
fn explicit_numbers_are_kept() {
    let stmt = parse("SELECT * FROM t WHERE a = $2 and b = ?");
    assert_eq!(stmt.param_count, 2);
    let select = parse_select("SELECT * FROM t WHERE a = $2 and b = ?");
    assert_eq!(
        select.first().where_clause,
        Some(
            field("t", "a")
                .eq(positional(2))
                .and(field("t", "b").eq(positional(1)))
        )
    );
}

#[test]
fn every_occurrence_is_counted() {
    assert_eq!(parse("SELECT $x + $x FROM t").param_count, 2);
    assert_eq!(parse("SELECT * FROM t LIMIT ? OFFSET ?").param_count, 2);
    assert_eq!(parse("SELECT * FROM t").param_count, 0);
}

#[test]
fn parameters_inside_subqueries() {
    let stmt = parse("SELECT ? FROM t WHERE EXISTS (SELECT ? FROM u WHERE u.a = ?)");
    assert_eq!(stmt.param_count, 3);
}

#[test]
fn counters_do_not_leak_between_calls() {
    let first = parse("SELECT ? FROM t");
    let second = parse("SELECT ? FROM t");
    assert_eq!(first, second);
    assert_eq!(second.param_count, 1);
}

#[test]
fn parsing_is_deterministic() {
    let text = "SELECT o.id, SUM(l.qty) AS qty FROM orders o JOIN lines l ON KEYS o.line_ids \
                WHERE o.status = $status GROUP BY o.id HAVING SUM(l.qty) > ? ORDER BY qty DESC";
    assert_eq!(parse(text), parse(text));
}

#[test]
fn concurrent_parses_are_isolated() {
    let text = "SELECT a FROM t WHERE b = ? AND c = ?";
    let expected = parse(text);
    thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| parse(text))).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn zero_and_oversized_positions_are_rejected() {
    let zero = diagnostics("SELECT $0 FROM t");
    assert_eq!(
        zero.first().unwrap().message,
        "syntax error - line 1, column 8, near 'SELECT $0', at: $0 \
         (lexer: Invalid positional parameter: $0)"
    );
    assert!(syntax_errors("SELECT $99999999999999999999999 FROM t") >= 1);
}

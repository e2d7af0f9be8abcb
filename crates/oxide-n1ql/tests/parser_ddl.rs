//! Tests for index and function DDL, EXPLAIN, PREPARE and EXECUTE.

mod common;
use common::*;

use oxide_n1ql::ast::{
    BinaryOp, CreateIndex, CreatePrimaryIndex, DropIndex, DropPrimaryIndex, Expr, FromTerm,
    IndexUsing, KeyspaceTerm, StatementKind,
};
use oxide_n1ql::{Path, parse_statement_in};

#[test]
fn create_primary_index() {
    assert_eq!(
        parse("CREATE PRIMARY INDEX ON orders").kind,
        StatementKind::CreatePrimaryIndex(CreatePrimaryIndex {
            name: None,
            keyspace: Path::short("default", "orders"),
            using: IndexUsing::Gsi,
        })
    );
    assert_eq!(
        parse("CREATE PRIMARY INDEX idx ON system:orders USING VIEW").kind,
        StatementKind::CreatePrimaryIndex(CreatePrimaryIndex {
            name: Some(String::from("idx")),
            keyspace: Path::short("system", "orders"),
            using: IndexUsing::View,
        })
    );
}

#[test]
fn create_index() {
    let stmt = parse("CREATE INDEX idx_total ON orders(total, customer.name) WHERE total > 0 USING GSI");
    assert_eq!(
        stmt.kind,
        StatementKind::CreateIndex(CreateIndex {
            name: String::from("idx_total"),
            keyspace: Path::short("default", "orders"),
            keys: vec![
                Expr::identifier("total"),
                Expr::identifier("customer").field("name"),
            ],
            where_clause: Some(Expr::identifier("total").binary(BinaryOp::Gt, Expr::integer(0))),
            using: IndexUsing::Gsi,
        })
    );
}

#[test]
fn create_index_rejects_constant_keys() {
    assert_eq!(
        usage_error("CREATE INDEX idx ON orders(total, 1 + 2)"),
        "Expression not indexable."
    );
    assert_eq!(
        usage_error("CREATE INDEX idx ON orders(total = $1)"),
        "Expression not indexable."
    );
}

#[test]
fn drop_indexes() {
    assert_eq!(
        parse("DROP PRIMARY INDEX ON orders USING GSI").kind,
        StatementKind::DropPrimaryIndex(DropPrimaryIndex {
            keyspace: Path::short("default", "orders"),
            using: IndexUsing::Gsi,
        })
    );
    assert_eq!(
        parse("DROP INDEX orders.idx_total").kind,
        StatementKind::DropIndex(DropIndex {
            keyspace: Path::short("default", "orders"),
            name: String::from("idx_total"),
            using: IndexUsing::Gsi,
        })
    );
    let StatementKind::DropIndex(drop) = parse("DROP INDEX system:orders.idx USING VIEW").kind
    else {
        panic!("expected DROP INDEX");
    };
    assert_eq!(drop.keyspace, Path::short("system", "orders"));
    assert_eq!(drop.using, IndexUsing::View);
}

#[test]
fn create_function_forms() {
    let StatementKind::CreateFunction(function) =
        parse("CREATE FUNCTION celsius(f) { (f - 32) * 5 / 9 }").kind
    else {
        panic!("expected CREATE FUNCTION");
    };
    assert_eq!(function.name, Path::short("default", "celsius"));
    assert_eq!(function.params, vec![String::from("f")]);

    assert_eq!(
        parse("CREATE FUNCTION celsius(f) LANGUAGE INLINE AS (f - 32) * 5 / 9"),
        parse("CREATE FUNCTION celsius(f) { (f - 32) * 5 / 9 }")
    );
}

#[test]
fn create_function_body_sees_only_parameters() {
    assert_eq!(
        parse_err("CREATE FUNCTION f(a) { a + b }").to_string(),
        "Ambiguous reference to field b."
    );
}

#[test]
fn create_function_body_resolves_in_function_context() {
    let stmt = parse_statement_in(
        "CREATE FUNCTION other.lib.f() { (SELECT RAW k.a FROM k) }",
        "default",
        "default:b1.s1",
    )
    .unwrap();
    let StatementKind::CreateFunction(function) = stmt.kind else {
        panic!("expected CREATE FUNCTION");
    };
    assert_eq!(function.name, Path::long("default", "other", "lib", "f"));
    let Expr::Subquery(select) = function.body else {
        panic!("expected a subquery body");
    };
    assert_eq!(
        select.first().from,
        Some(FromTerm::Keyspace(KeyspaceTerm::new(
            Path::long("default", "other", "lib", "k")
        )))
    );
}

#[test]
fn drop_function() {
    assert_eq!(
        parse("DROP FUNCTION celsius").kind,
        StatementKind::DropFunction(Path::short("default", "celsius"))
    );
}

#[test]
fn explain() {
    let stmt = parse("EXPLAIN SELECT a FROM t");
    let StatementKind::Explain(inner) = stmt.kind else {
        panic!("expected EXPLAIN");
    };
    assert_eq!(inner.name(), "SELECT");
}

#[test]
fn prepare_forms() {
    for text in [
        "PREPARE p FROM SELECT a FROM t",
        "PREPARE p AS SELECT a FROM t",
    ] {
        let StatementKind::Prepare { name, statement } = parse(text).kind else {
            panic!("expected PREPARE");
        };
        assert_eq!(name.as_deref(), Some("p"), "{text}");
        assert_eq!(statement.name(), "SELECT");
    }

    let StatementKind::Prepare { name, .. } = parse("PREPARE DELETE FROM t WHERE a = 1").kind
    else {
        panic!("expected PREPARE");
    };
    assert!(name.is_none());
}

#[test]
fn prepare_formalizes_the_inner_statement() {
    assert_eq!(
        parse_err("PREPARE SELECT a").to_string(),
        "Ambiguous reference to field a."
    );
}

#[test]
fn execute() {
    assert_eq!(
        parse("EXECUTE 'p1'").kind,
        StatementKind::Execute(Expr::string("p1"))
    );
    assert_eq!(
        parse("EXECUTE p1").kind,
        StatementKind::Execute(Expr::identifier("p1"))
    );
}

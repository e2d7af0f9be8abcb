//! Tests for standalone expressions and operator precedence.

mod common;
use common::*;

use oxide_n1ql::ast::{
    BinaryOp, Binding, Collection, CollectionOp, Expr, FunctionCall, IsCheck, Literal, Parameter,
    UnaryOp,
};
use oxide_n1ql::{Error, parse_expression};

fn ident(name: &str) -> Expr {
    Expr::identifier(name)
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(eval(&parse_expr("1 + 2 * 3")), 7);
    assert_eq!(eval(&parse_expr("(1 + 2) * 3")), 9);
    assert_eq!(eval(&parse_expr("10 - 4 - 3")), 3);
    assert_eq!(eval(&parse_expr("20 / 2 / 5")), 2);
    assert_eq!(eval(&parse_expr("-2 * 3 + 10 % 4")), -4);
}

#[test]
fn logical_precedence() {
    assert_eq!(
        parse_expr("a OR b AND c"),
        ident("a").or(ident("b").and(ident("c")))
    );
    assert_eq!(
        parse_expr("NOT a = b AND c"),
        Expr::unary(UnaryOp::Not, ident("a").eq(ident("b"))).and(ident("c"))
    );
    assert_eq!(
        parse_expr("a < 1 OR b >= 2"),
        ident("a")
            .binary(BinaryOp::Lt, Expr::integer(1))
            .or(ident("b").binary(BinaryOp::GtEq, Expr::integer(2)))
    );
}

#[test]
fn comparison_operators() {
    for (text, op) in [
        ("a = 1", BinaryOp::Eq),
        ("a == 1", BinaryOp::Eq),
        ("a != 1", BinaryOp::NotEq),
        ("a <> 1", BinaryOp::NotEq),
        ("a <= 1", BinaryOp::LtEq),
        ("a > 1", BinaryOp::Gt),
    ] {
        assert_eq!(parse_expr(text), ident("a").binary(op, Expr::integer(1)), "{text}");
    }
}

#[test]
fn string_operators() {
    assert_eq!(
        parse_expr("a || 'x' LIKE 'ax%'"),
        ident("a")
            .binary(BinaryOp::Concat, Expr::string("x"))
            .binary(BinaryOp::Like, Expr::string("ax%"))
    );
    assert_eq!(
        parse_expr("a NOT LIKE 'x%'"),
        ident("a").binary(BinaryOp::NotLike, Expr::string("x%"))
    );
}

#[test]
fn membership_operators() {
    assert_eq!(
        parse_expr("a IN [1, 2]"),
        ident("a").binary(
            BinaryOp::In,
            Expr::Array(vec![Expr::integer(1), Expr::integer(2)])
        )
    );
    assert_eq!(
        parse_expr("a NOT IN b"),
        ident("a").binary(BinaryOp::NotIn, ident("b"))
    );
    assert_eq!(
        parse_expr("a NOT WITHIN b"),
        ident("a").binary(BinaryOp::NotWithin, ident("b"))
    );
}

#[test]
fn between_binds_its_own_and() {
    assert_eq!(
        parse_expr("a BETWEEN 1 AND 5 AND b"),
        Expr::Between {
            expr: Box::new(ident("a")),
            low: Box::new(Expr::integer(1)),
            high: Box::new(Expr::integer(5)),
            negated: false,
        }
        .and(ident("b"))
    );
    assert!(matches!(
        parse_expr("a NOT BETWEEN 1 AND 5"),
        Expr::Between { negated: true, .. }
    ));
}

#[test]
fn is_checks() {
    for (text, check, negated) in [
        ("a IS NULL", IsCheck::Null, false),
        ("a IS NOT NULL", IsCheck::Null, true),
        ("a IS MISSING", IsCheck::Missing, false),
        ("a IS NOT VALUED", IsCheck::Valued, true),
    ] {
        assert_eq!(
            parse_expr(text),
            Expr::Is {
                expr: Box::new(ident("a")),
                check,
                negated,
            },
            "{text}"
        );
    }
}

#[test]
fn paths() {
    assert_eq!(
        parse_expr("a.b[0].c"),
        Expr::Element {
            target: Box::new(ident("a").field("b")),
            index: Box::new(Expr::integer(0)),
        }
        .field("c")
    );
    assert_eq!(
        parse_expr("a[1:3]"),
        Expr::Slice {
            target: Box::new(ident("a")),
            start: Box::new(Expr::integer(1)),
            end: Some(Box::new(Expr::integer(3))),
        }
    );
    assert!(matches!(parse_expr("a[1:]"), Expr::Slice { end: None, .. }));
}

#[test]
fn case_insensitive_identifiers() {
    assert_eq!(
        parse_expr("`Name`i"),
        Expr::Identifier {
            name: String::from("Name"),
            case_insensitive: true,
        }
    );
    assert_eq!(parse_expr("`my field`"), ident("my field"));
}

#[test]
fn literals() {
    assert_eq!(parse_expr("TRUE"), Expr::boolean(true));
    assert_eq!(parse_expr("null"), Expr::null());
    assert_eq!(parse_expr("MISSING"), Expr::Literal(Literal::Missing));
    assert_eq!(parse_expr("2.5"), Expr::float(2.5));
    assert_eq!(parse_expr("\"text\""), Expr::string("text"));
}

#[test]
fn constructors() {
    assert_eq!(parse_expr("[]"), Expr::Array(Vec::new()));
    assert_eq!(
        parse_expr("{'k': 1, 'n': [a]}"),
        Expr::Object(vec![
            (Expr::string("k"), Expr::integer(1)),
            (Expr::string("n"), Expr::Array(vec![ident("a")])),
        ])
    );
}

#[test]
fn case_expressions() {
    assert_eq!(
        parse_expr("CASE WHEN a THEN 1 ELSE 2 END"),
        Expr::Case {
            operand: None,
            when_clauses: vec![(ident("a"), Expr::integer(1))],
            else_clause: Some(Box::new(Expr::integer(2))),
        }
    );
    assert_eq!(
        parse_expr("CASE a WHEN 1 THEN 'one' WHEN 2 THEN 'two' END"),
        Expr::Case {
            operand: Some(Box::new(ident("a"))),
            when_clauses: vec![
                (Expr::integer(1), Expr::string("one")),
                (Expr::integer(2), Expr::string("two")),
            ],
            else_clause: None,
        }
    );
}

#[test]
fn collection_expressions() {
    assert_eq!(
        parse_expr("ANY v IN a SATISFIES v > 1 END"),
        Expr::Collection(Box::new(Collection {
            op: CollectionOp::Any,
            bindings: vec![Binding::new("v", ident("a"))],
            body: ident("v").binary(BinaryOp::Gt, Expr::integer(1)),
            when: None,
        }))
    );

    let Expr::Collection(every) = parse_expr("EVERY v WITHIN a SATISFIES v IS VALUED END") else {
        panic!("expected EVERY");
    };
    assert_eq!(every.op, CollectionOp::Every);
    assert!(every.bindings[0].descend);

    let Expr::Collection(array) = parse_expr("ARRAY v.x FOR v IN a, w IN b WHEN v.y END") else {
        panic!("expected ARRAY");
    };
    assert_eq!(array.op, CollectionOp::Array);
    assert_eq!(array.bindings.len(), 2);
    assert_eq!(array.when, Some(ident("v").field("y")));

    assert!(matches!(
        parse_expr("FIRST v FOR v IN a END"),
        Expr::Collection(c) if c.op == CollectionOp::First
    ));
}

#[test]
fn function_calls() {
    assert_eq!(
        parse_expr("lower(name)"),
        Expr::Function(FunctionCall {
            name: String::from("LOWER"),
            args: vec![ident("name")],
        })
    );
    assert!(matches!(
        parse_expr("ARRAY_APPEND(a, 1, 2, 3)"),
        Expr::Function(call) if call.args.len() == 4
    ));
}

#[test]
fn parameters() {
    assert_eq!(
        parse_expr("$name"),
        Expr::Parameter(Parameter::Named(String::from("name")))
    );
    assert_eq!(parse_expr("$3"), Expr::Parameter(Parameter::Positional(3)));
    assert_eq!(
        parse_expr("? + ?"),
        Expr::Parameter(Parameter::Positional(1))
            .binary(BinaryOp::Add, Expr::Parameter(Parameter::Positional(2)))
    );
}

#[test]
fn expressions_are_not_formalized() {
    // No keyspace is in scope, yet bare names are accepted as written.
    assert_eq!(parse_expr("a.b"), ident("a").field("b"));
}

#[test]
fn inline_expression_restrictions() {
    for (text, message) in [
        ("COUNT(*)", "Cannot use aggregate as an inline expression."),
        ("SUM(DISTINCT a)", "Cannot use aggregate as an inline expression."),
        ("SUM(a)", "Invalid function SUM."),
        ("(SELECT 1)", "Cannot use subquery as an inline expression."),
    ] {
        let Err(Error::Parse(diagnostics)) = parse_expression(text) else {
            panic!("expected a usage error for {text}");
        };
        assert_eq!(diagnostics.len(), 1, "{text}");
        assert_eq!(diagnostics.first().unwrap().message, message);
    }
}

#[test]
fn statement_is_not_an_expression() {
    assert!(matches!(
        parse_expression("SELECT 1"),
        Err(Error::NotAnExpression)
    ));
    assert!(matches!(
        oxide_n1ql::parse_statement("1 + 1"),
        Err(Error::NotAStatement)
    ));
}

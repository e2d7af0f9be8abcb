//! Tests for `ParserConfig`.

use oxide_n1ql::ast::{FromTerm, StatementKind};
use oxide_n1ql::{Error, ParserConfig, Path};

#[test]
fn default_namespace_applies_to_unqualified_keyspaces() {
    let config = ParserConfig::default().with_default_namespace("archive");
    let stmt = config.parse_statement("SELECT * FROM orders").unwrap();
    let StatementKind::Select(select) = stmt.kind else {
        panic!("expected SELECT");
    };
    let Some(FromTerm::Keyspace(term)) = &select.first().from else {
        panic!("expected a keyspace");
    };
    assert_eq!(term.path, Path::short("archive", "orders"));
}

#[test]
fn parse_statement_in_overrides_the_default_namespace() {
    let config = ParserConfig::default().with_default_namespace("archive");
    let stmt = config
        .parse_statement_in("DELETE FROM orders", "default", "default:b.s")
        .unwrap();
    let StatementKind::Delete(delete) = stmt.kind else {
        panic!("expected DELETE");
    };
    assert_eq!(delete.keyspace.path, Path::long("default", "b", "s", "orders"));
}

#[test]
fn expressions_through_config() {
    let config = ParserConfig::default();
    assert!(config.parse_expression("a + 1").is_ok());
    assert!(matches!(
        config.parse_expression("SELECT 1"),
        Err(Error::NotAnExpression)
    ));
}

#[test]
fn parses_with_a_test_subscriber() {
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_env_filter("oxide_n1ql=trace")
            .with_test_writer()
            .finish(),
    );
    let config = ParserConfig::default();
    assert!(config.parse_statement("SELECT a FROM t WHERE b = ?").is_ok());
    assert!(config.parse_statement("SELECT a + FROM t").is_err());
}

#[cfg(feature = "serde")]
#[test]
fn config_from_json() {
    let config: ParserConfig = serde_json::from_str(
        r#"{"namespaces": ["default", "archive"], "snippet_width": 12}"#,
    )
    .unwrap();
    assert_eq!(config.snippet_width, 12);
    assert_eq!(config.max_depth, 200);
    assert!(config.parse_statement("SELECT * FROM archive:orders").is_ok());
}

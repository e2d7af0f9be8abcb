//! Tests for diagnostics and error recovery.

mod common;
use common::*;

use oxide_n1ql::parser::DiagnosticKind;
use oxide_n1ql::{Error, ParserConfig};

#[test]
fn error_position_and_snippet() {
    let diagnostics = diagnostics("select * fro t");
    let first = diagnostics.first().unwrap();
    assert_eq!(first.kind, DiagnosticKind::Syntax);
    assert_eq!((first.position.line, first.position.column), (1, 10));
    assert_eq!(
        first.message,
        "syntax error - line 1, column 10, near 'select * fro', at: fro"
    );
}

#[test]
fn error_position_on_later_line() {
    let diagnostics = diagnostics("SELECT a\nFROM t\nWHERE a = = 1");
    let first = diagnostics.first().unwrap();
    assert_eq!((first.position.line, first.position.column), (3, 11));
    assert!(first.message.contains("near 'WHERE a = ='"), "{first}");
}

#[test]
fn snippet_is_bounded_by_width() {
    let config = ParserConfig::default().with_snippet_width(6);
    let Err(Error::Parse(diagnostics)) = config.parse_statement("SELECT alpha, beta gamma delta FROM t")
    else {
        panic!("expected a syntax error");
    };
    let message = &diagnostics.first().unwrap().message;
    assert!(message.ends_with("near 'gamma delta', at: delta"), "{message}");
}

#[test]
fn error_at_end_of_input() {
    let diagnostics = diagnostics("SELECT * FROM");
    assert!(diagnostics.first().unwrap().message.ends_with("at: end of input"));
}

#[test]
fn error_empty_input() {
    assert!(syntax_errors("") >= 1);
}

#[test]
fn error_unknown_statement() {
    assert!(syntax_errors("TRUNCATE users") >= 1);
}

#[test]
fn error_unclosed_paren() {
    assert!(syntax_errors("SELECT (1 + 2") >= 1);
}

#[test]
fn error_join_without_on_keys() {
    assert!(syntax_errors("SELECT * FROM a JOIN b WHERE a.id = 1") >= 1);
}

#[test]
fn malformed_token_terminates_with_position() {
    let malformed = diagnostics("SELECT a # b FROM t");
    let first = malformed.first().unwrap();
    assert_eq!((first.position.line, first.position.column), (1, 10));
    assert!(
        first.message.contains("(lexer: Unexpected character: #)"),
        "{first}"
    );

    let unterminated = diagnostics("SELECT 'open");
    assert!(!unterminated.is_empty());
}

#[test]
fn unterminated_block_comment_is_a_lexical_error() {
    let unterminated = diagnostics("SELECT 1 /* open");
    let first = unterminated.first().unwrap();
    assert_eq!(first.kind, DiagnosticKind::Syntax);
    assert_eq!((first.position.line, first.position.column), (1, 10));
    assert_eq!(
        first.message,
        "syntax error - line 1, column 10, near 'SELECT 1 /* open', at: /* open \
         (lexer: Unterminated block comment)"
    );
}

#[test]
fn recovery_reports_independent_errors() {
    assert_eq!(syntax_errors("select a + from t where b + limit 1"), 2);
}

#[test]
fn recovery_resumes_after_error_expression() {
    // The malformed projection term is replaced and the rest still parses.
    let diagnostics = diagnostics("SELECT a + FROM t WHERE b = 1");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.first().unwrap().kind, DiagnosticKind::Syntax);
}

#[test]
fn usage_errors() {
    assert_eq!(usage_error("SELECT NOFUNC(a) FROM t"), "Invalid function NOFUNC.");
    assert_eq!(
        usage_error("SELECT LOWER(a, b) FROM t"),
        "Wrong number of arguments to function LOWER."
    );
    assert_eq!(
        usage_error("SELECT NOAGG(DISTINCT a) FROM t"),
        "Invalid aggregate function NOAGG."
    );
    assert_eq!(
        usage_error("SELECT NOAGG(*) FROM t"),
        "Invalid aggregate function NOAGG."
    );
}

#[test]
fn usage_and_syntax_errors_are_collected_together() {
    let diagnostics = diagnostics("SELECT NOFUNC(a) FROM t WHERE b = = 1");
    assert_eq!(diagnostics.count(DiagnosticKind::Usage), 1);
    assert_eq!(diagnostics.count(DiagnosticKind::Syntax), 1);
    let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::Usage, DiagnosticKind::Syntax]);
}

#[test]
fn depth_limit_aborts_the_parse() {
    let text = format!("SELECT {}1{} FROM t", "(".repeat(300), ")".repeat(300));
    let diagnostics = diagnostics(&text);
    let last = diagnostics.iter().last().unwrap();
    assert_eq!(last.kind, DiagnosticKind::ResourceLimit);
    assert_eq!(last.message, "parser stack overflow: depth limit 200 exceeded");
}

#[test]
fn depth_limit_is_configurable() {
    let text = format!("SELECT {}1{}", "(".repeat(300), ")".repeat(300));
    let config = ParserConfig::default().with_max_depth(2000);
    assert!(config.parse_statement(&text).is_ok());
    assert!(oxide_n1ql::parse_statement(&text).is_err());
}

#[test]
fn formalize_errors_are_reported_after_a_clean_parse() {
    let err = parse_err("SELECT a FROM t JOIN u ON KEYS t.uid");
    assert!(matches!(err, Error::Formalize(_)));
    assert!(err.diagnostics().is_none());
    assert_eq!(err.to_string(), "Ambiguous reference to field a.");
}

#[test]
fn invalid_query_context() {
    let err = oxide_n1ql::parse_statement_in("SELECT 1", "default", "a:b:c").unwrap_err();
    assert!(matches!(err, Error::QueryContext { .. }));
    assert_eq!(err.to_string(), "invalid query context 'a:b:c': repeated namespace");
}

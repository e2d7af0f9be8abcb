//! Productions of the N1QL grammar.
//!
//! Upper case names are terminals (see [`Terminal::name`]), lower case names
//! are nonterminals. The `error` terminal marks the recovery points: a
//! malformed expression is replaced by [`crate::ast::Expr::Error`] and
//! parsing resumes at the next token that fits.

use super::actions as a;
use super::{Assoc, Grammar, Rule, Terminal};

const fn r(lhs: &'static str, rhs: &'static [&'static str], action: super::ActionFn) -> Rule {
    Rule::new(lhs, rhs, action)
}

/// Precedence levels, lowest first.
static PRECEDENCE: &[(Assoc, &[&str])] = &[
    (Assoc::Left, &["OR"]),
    (Assoc::Left, &["AND"]),
    (Assoc::Right, &["NOT"]),
    (Assoc::Nonassoc, &["EQ", "DEQ", "NE"]),
    (Assoc::Nonassoc, &["LT", "GT", "LE", "GE"]),
    (Assoc::Nonassoc, &["LIKE"]),
    (Assoc::Nonassoc, &["BETWEEN"]),
    (Assoc::Nonassoc, &["IN", "WITHIN"]),
    (Assoc::Nonassoc, &["EXISTS"]),
    (Assoc::Left, &["IS"]),
    (Assoc::Left, &["CONCAT"]),
    (Assoc::Left, &["PLUS", "MINUS"]),
    (Assoc::Left, &["STAR", "DIV", "MOD"]),
    (Assoc::Right, &["UMINUS"]),
    (Assoc::Left, &["DOT", "LBRACKET", "RBRACKET"]),
];

static RULES: &[Rule] = &[
    // Entry points
    r("input", &["stmt", "opt_semi"], a::accept_statement),
    r("input", &["expr"], a::accept_expression),
    r("opt_semi", &[], a::empty),
    r("opt_semi", &["SEMI"], a::empty),
    // Statements
    r("stmt", &["fullselect"], a::select_statement),
    r("stmt", &["insert_stmt"], a::pass),
    r("stmt", &["delete_stmt"], a::pass),
    r("stmt", &["update_stmt"], a::pass),
    r("stmt", &["create_primary_index"], a::pass),
    r("stmt", &["create_index"], a::pass),
    r("stmt", &["drop_primary_index"], a::pass),
    r("stmt", &["drop_index"], a::pass),
    r("stmt", &["create_function"], a::pass),
    r("stmt", &["drop_function"], a::pass),
    r("stmt", &["EXPLAIN", "stmt"], a::explain),
    r("stmt", &["PREPARE", "opt_name", "stmt"], a::prepare),
    r("stmt", &["EXECUTE", "expr"], a::execute),
    r("opt_name", &[], a::no_name),
    r("opt_name", &["IDENT", "FROM"], a::some_name),
    r("opt_name", &["IDENT", "AS"], a::some_name),
    // SELECT
    r("fullselect", &["select_terms", "opt_order_by", "opt_limit_offset"], a::fullselect),
    r("select_terms", &["subselect"], a::single_body),
    r("select_terms", &["select_terms", "set_op", "subselect"], a::set_operation),
    r("set_op", &["UNION"], a::set_op),
    r("set_op", &["UNION", "ALL"], a::set_op),
    r("set_op", &["INTERSECT"], a::set_op),
    r("set_op", &["INTERSECT", "ALL"], a::set_op),
    r("set_op", &["EXCEPT"], a::set_op),
    r("set_op", &["EXCEPT", "ALL"], a::set_op),
    r(
        "subselect",
        &["select_clause", "opt_from", "opt_let", "opt_where", "opt_group"],
        a::select_from,
    ),
    r(
        "subselect",
        &["from", "opt_let", "opt_where", "opt_group", "select_clause"],
        a::from_select,
    ),
    r("select_clause", &["SELECT", "projection"], a::second),
    r("projection", &["opt_quantifier", "projects"], a::projection),
    r("projection", &["opt_quantifier", "raw", "expr", "opt_as_alias"], a::raw_projection),
    r("opt_quantifier", &[], a::no),
    r("opt_quantifier", &["ALL"], a::no),
    r("opt_quantifier", &["DISTINCT"], a::yes),
    r("raw", &["RAW"], a::pass),
    r("raw", &["ELEMENT"], a::pass),
    r("raw", &["VALUE"], a::pass),
    r("projects", &["project"], a::terms_first),
    r("projects", &["projects", "COMMA", "project"], a::terms_append),
    r("project", &["STAR"], a::wildcard),
    r("project", &["expr", "DOT", "STAR"], a::qualified_wildcard),
    r("project", &["expr", "opt_as_alias"], a::result_expr),
    r("opt_as_alias", &[], a::no_name),
    r("opt_as_alias", &["as_alias"], a::optional_alias),
    r("as_alias", &["IDENT"], a::alias),
    r("as_alias", &["AS", "IDENT"], a::alias),
    // FROM
    r("opt_from", &[], a::no_from),
    r("opt_from", &["from"], a::some_from),
    r("from", &["FROM", "from_term"], a::second),
    r("from_term", &["keyspace_term"], a::keyspace_from),
    r("from_term", &["LPAREN", "fullselect", "RPAREN", "as_alias"], a::subquery_from),
    r(
        "from_term",
        &["from_term", "opt_join_type", "JOIN", "keyspace_term", "on_keys"],
        a::join,
    ),
    r(
        "from_term",
        &["from_term", "opt_join_type", "NEST", "keyspace_term", "on_keys"],
        a::nest,
    ),
    r(
        "from_term",
        &["from_term", "opt_join_type", "UNNEST", "expr", "opt_as_alias"],
        a::unnest,
    ),
    r("opt_join_type", &[], a::inner_join),
    r("opt_join_type", &["INNER"], a::inner_join),
    r("opt_join_type", &["LEFT"], a::left_join),
    r("opt_join_type", &["LEFT", "OUTER"], a::left_join),
    r("keyspace_term", &["keyspace_path", "opt_as_alias", "opt_use_keys"], a::keyspace_term),
    r("keyspace_path", &["IDENT"], a::keyspace_in_context),
    r("keyspace_path", &["IDENT", "DOT", "IDENT", "DOT", "IDENT"], a::scoped_keyspace),
    r("keyspace_path", &["NAMESPACE_ID", "COLON", "IDENT"], a::namespaced_keyspace),
    r(
        "keyspace_path",
        &["NAMESPACE_ID", "COLON", "IDENT", "DOT", "IDENT", "DOT", "IDENT"],
        a::namespaced_scoped_keyspace,
    ),
    r("opt_use_keys", &[], a::no_expr),
    r("opt_use_keys", &["USE", "KEYS", "expr"], a::some_last),
    r("opt_use_keys", &["USE", "PRIMARY", "KEYS", "expr"], a::some_last),
    r("on_keys", &["ON", "KEYS", "expr"], a::last),
    r("on_keys", &["ON", "PRIMARY", "KEYS", "expr"], a::last),
    // LET, WHERE, GROUP BY
    r("opt_let", &[], a::no_bindings),
    r("opt_let", &["LET", "bindings"], a::second),
    r("bindings", &["binding"], a::bindings_first),
    r("bindings", &["bindings", "COMMA", "binding"], a::bindings_append),
    r("binding", &["IDENT", "EQ", "expr"], a::binding),
    r("opt_where", &[], a::no_expr),
    r("opt_where", &["WHERE", "expr"], a::some_last),
    r("opt_group", &[], a::no_group),
    r("opt_group", &["GROUP", "BY", "exprs", "opt_letting", "opt_having"], a::group_by),
    r("opt_group", &["letting"], a::letting_only),
    r("opt_letting", &[], a::no_bindings),
    r("opt_letting", &["letting"], a::pass),
    r("letting", &["LETTING", "bindings"], a::second),
    r("opt_having", &[], a::no_expr),
    r("opt_having", &["HAVING", "expr"], a::some_last),
    // ORDER BY, LIMIT, OFFSET
    r("opt_order_by", &[], a::no_orders),
    r("opt_order_by", &["ORDER", "BY", "sort_terms"], a::last),
    r("sort_terms", &["sort_term"], a::orders_first),
    r("sort_terms", &["sort_terms", "COMMA", "sort_term"], a::orders_append),
    r("sort_term", &["expr", "opt_dir"], a::sort_term),
    r("opt_dir", &[], a::ascending),
    r("opt_dir", &["ASC"], a::ascending),
    r("opt_dir", &["DESC"], a::descending),
    r("opt_limit_offset", &[], a::no_bounds),
    r("opt_limit_offset", &["limit"], a::limit_only),
    r("opt_limit_offset", &["offset"], a::offset_only),
    r("opt_limit_offset", &["limit", "offset"], a::limit_offset),
    r("opt_limit_offset", &["offset", "limit"], a::offset_limit),
    r("limit", &["LIMIT", "expr"], a::last),
    r("offset", &["OFFSET", "expr"], a::last),
    r("opt_limit", &[], a::no_expr),
    r("opt_limit", &["limit"], a::some_first),
    // INSERT and UPSERT
    r(
        "insert_stmt",
        &["INSERT", "INTO", "keyspace_path", "opt_values_header", "values_list", "opt_returning"],
        a::insert_values,
    ),
    r(
        "insert_stmt",
        &["UPSERT", "INTO", "keyspace_path", "opt_values_header", "values_list", "opt_returning"],
        a::insert_values,
    ),
    r(
        "insert_stmt",
        &[
            "INSERT", "INTO", "keyspace_path", "LPAREN", "KEY", "expr", "RPAREN", "fullselect",
            "opt_returning",
        ],
        a::insert_select,
    ),
    r(
        "insert_stmt",
        &[
            "UPSERT", "INTO", "keyspace_path", "LPAREN", "KEY", "expr", "RPAREN", "fullselect",
            "opt_returning",
        ],
        a::insert_select,
    ),
    r(
        "insert_stmt",
        &[
            "INSERT", "INTO", "keyspace_path", "LPAREN", "KEY", "expr", "COMMA", "VALUE", "expr",
            "RPAREN", "fullselect", "opt_returning",
        ],
        a::insert_select_value,
    ),
    r(
        "insert_stmt",
        &[
            "UPSERT", "INTO", "keyspace_path", "LPAREN", "KEY", "expr", "COMMA", "VALUE", "expr",
            "RPAREN", "fullselect", "opt_returning",
        ],
        a::insert_select_value,
    ),
    r("opt_values_header", &[], a::empty),
    r("opt_values_header", &["LPAREN", "KEY", "COMMA", "VALUE", "RPAREN"], a::empty),
    r("values_list", &["VALUES", "values_tuple"], a::values_first),
    r("values_list", &["values_list", "COMMA", "values_tuple"], a::pairs_append),
    r("values_list", &["values_list", "COMMA", "VALUES", "values_tuple"], a::values_append),
    r("values_tuple", &["LPAREN", "expr", "COMMA", "expr", "RPAREN"], a::values_pair),
    r("opt_returning", &[], a::no_returning),
    r("opt_returning", &["RETURNING", "returns"], a::returning),
    r("returns", &["projects"], a::projection),
    r("returns", &["raw", "expr", "opt_as_alias"], a::raw_projection),
    // DELETE and UPDATE
    r(
        "delete_stmt",
        &["DELETE", "FROM", "keyspace_term", "opt_where", "opt_limit", "opt_returning"],
        a::delete,
    ),
    r(
        "update_stmt",
        &["UPDATE", "keyspace_term", "set_unset", "opt_where", "opt_limit", "opt_returning"],
        a::update,
    ),
    r("set_unset", &["set_clause"], a::set_only),
    r("set_unset", &["unset_clause"], a::unset_only),
    r("set_unset", &["set_clause", "unset_clause"], a::set_and_unset),
    r("set_clause", &["SET", "set_terms"], a::second),
    r("set_terms", &["set_term"], a::sets_first),
    r("set_terms", &["set_terms", "COMMA", "set_term"], a::sets_append),
    r("set_term", &["path", "EQ", "expr"], a::set_term),
    r("unset_clause", &["UNSET", "unset_terms"], a::second),
    r("unset_terms", &["path"], a::exprs_first),
    r("unset_terms", &["unset_terms", "COMMA", "path"], a::exprs_append),
    r("path", &["IDENT"], a::identifier),
    r("path", &["path", "DOT", "IDENT"], a::field),
    r("path", &["path", "LBRACKET", "expr", "RBRACKET"], a::element),
    // Index DDL
    r(
        "create_primary_index",
        &["CREATE", "PRIMARY", "INDEX", "opt_index_name", "ON", "keyspace_path", "opt_using"],
        a::create_primary_index,
    ),
    r("opt_index_name", &[], a::no_name),
    r("opt_index_name", &["IDENT"], a::some_name),
    r(
        "create_index",
        &[
            "CREATE", "INDEX", "IDENT", "ON", "keyspace_path", "LPAREN", "index_terms", "RPAREN",
            "opt_where", "opt_using",
        ],
        a::create_index,
    ),
    r("index_terms", &["index_term"], a::exprs_first),
    r("index_terms", &["index_terms", "COMMA", "index_term"], a::exprs_append),
    r("index_term", &["expr"], a::index_key),
    r("opt_using", &[], a::gsi),
    r("opt_using", &["USING", "GSI"], a::gsi),
    r("opt_using", &["USING", "VIEW"], a::view),
    r(
        "drop_primary_index",
        &["DROP", "PRIMARY", "INDEX", "ON", "keyspace_path", "opt_using"],
        a::drop_primary_index,
    ),
    r(
        "drop_index",
        &["DROP", "INDEX", "simple_keyspace_path", "DOT", "IDENT", "opt_using"],
        a::drop_index,
    ),
    r("simple_keyspace_path", &["IDENT"], a::keyspace_in_context),
    r("simple_keyspace_path", &["NAMESPACE_ID", "COLON", "IDENT"], a::namespaced_keyspace),
    // Function DDL
    r(
        "create_function",
        &["CREATE", "FUNCTION", "function_context", "LPAREN", "opt_params", "RPAREN", "function_body"],
        a::create_function,
    ),
    r("function_context", &["keyspace_path"], a::enter_function_context),
    r("opt_params", &[], a::no_params),
    r("opt_params", &["params"], a::pass),
    r("params", &["IDENT"], a::params_first),
    r("params", &["params", "COMMA", "IDENT"], a::params_append),
    r("function_body", &["LBRACE", "expr", "RBRACE"], a::second),
    r("function_body", &["LANGUAGE", "INLINE", "AS", "expr"], a::last),
    r("drop_function", &["DROP", "FUNCTION", "keyspace_path"], a::drop_function),
    // Expressions
    r("expr", &["c_expr"], a::pass),
    r("expr", &["expr", "DOT", "IDENT"], a::field),
    r("expr", &["expr", "DOT", "IDENT_ICASE"], a::field),
    r("expr", &["expr", "LBRACKET", "expr", "RBRACKET"], a::element),
    r("expr", &["expr", "LBRACKET", "expr", "COLON", "RBRACKET"], a::slice),
    r("expr", &["expr", "LBRACKET", "expr", "COLON", "expr", "RBRACKET"], a::slice),
    r("expr", &["expr", "PLUS", "expr"], a::add),
    r("expr", &["expr", "MINUS", "expr"], a::sub),
    r("expr", &["expr", "STAR", "expr"], a::mul),
    r("expr", &["expr", "DIV", "expr"], a::div),
    r("expr", &["expr", "MOD", "expr"], a::modulo),
    r("expr", &["expr", "CONCAT", "expr"], a::concat),
    r("expr", &["expr", "AND", "expr"], a::and),
    r("expr", &["expr", "OR", "expr"], a::or),
    r("expr", &["expr", "EQ", "expr"], a::eq),
    r("expr", &["expr", "DEQ", "expr"], a::eq),
    r("expr", &["expr", "NE", "expr"], a::ne),
    r("expr", &["expr", "LT", "expr"], a::lt),
    r("expr", &["expr", "LE", "expr"], a::le),
    r("expr", &["expr", "GT", "expr"], a::gt),
    r("expr", &["expr", "GE", "expr"], a::ge),
    r("expr", &["expr", "LIKE", "expr"], a::like),
    r("expr", &["expr", "NOT", "LIKE", "expr"], a::not_like).prec("LIKE"),
    r("expr", &["expr", "IN", "expr"], a::in_),
    r("expr", &["expr", "NOT", "IN", "expr"], a::not_in).prec("IN"),
    r("expr", &["expr", "WITHIN", "expr"], a::within),
    r("expr", &["expr", "NOT", "WITHIN", "expr"], a::not_within).prec("WITHIN"),
    r("expr", &["expr", "BETWEEN", "b_expr", "AND", "b_expr"], a::between).prec("BETWEEN"),
    r("expr", &["expr", "NOT", "BETWEEN", "b_expr", "AND", "b_expr"], a::between)
        .prec("BETWEEN"),
    r("expr", &["expr", "IS", "NULL"], a::is_check).prec("IS"),
    r("expr", &["expr", "IS", "MISSING"], a::is_check).prec("IS"),
    r("expr", &["expr", "IS", "VALUED"], a::is_check).prec("IS"),
    r("expr", &["expr", "IS", "NOT", "NULL"], a::is_check).prec("IS"),
    r("expr", &["expr", "IS", "NOT", "MISSING"], a::is_check).prec("IS"),
    r("expr", &["expr", "IS", "NOT", "VALUED"], a::is_check).prec("IS"),
    r("expr", &["NOT", "expr"], a::not),
    r("expr", &["EXISTS", "expr"], a::exists),
    r("expr", &["MINUS", "expr"], a::negate).prec("UMINUS"),
    r("expr", &["error"], a::error_expr),
    // Operands of BETWEEN: no boolean operators, so its AND is unambiguous
    r("b_expr", &["c_expr"], a::pass),
    r("b_expr", &["b_expr", "DOT", "IDENT"], a::field),
    r("b_expr", &["b_expr", "DOT", "IDENT_ICASE"], a::field),
    r("b_expr", &["b_expr", "LBRACKET", "expr", "RBRACKET"], a::element),
    r("b_expr", &["b_expr", "LBRACKET", "expr", "COLON", "RBRACKET"], a::slice),
    r("b_expr", &["b_expr", "LBRACKET", "expr", "COLON", "expr", "RBRACKET"], a::slice),
    r("b_expr", &["b_expr", "PLUS", "b_expr"], a::add),
    r("b_expr", &["b_expr", "MINUS", "b_expr"], a::sub),
    r("b_expr", &["b_expr", "STAR", "b_expr"], a::mul),
    r("b_expr", &["b_expr", "DIV", "b_expr"], a::div),
    r("b_expr", &["b_expr", "MOD", "b_expr"], a::modulo),
    r("b_expr", &["b_expr", "CONCAT", "b_expr"], a::concat),
    r("b_expr", &["MINUS", "b_expr"], a::negate).prec("UMINUS"),
    // Primary expressions
    r("c_expr", &["INT"], a::literal),
    r("c_expr", &["NUM"], a::literal),
    r("c_expr", &["STR"], a::literal),
    r("c_expr", &["NULL"], a::literal),
    r("c_expr", &["MISSING"], a::literal),
    r("c_expr", &["TRUE"], a::literal),
    r("c_expr", &["FALSE"], a::literal),
    r("c_expr", &["IDENT"], a::identifier),
    r("c_expr", &["IDENT_ICASE"], a::identifier),
    r("c_expr", &["NAMED_PARAM"], a::parameter),
    r("c_expr", &["POSITIONAL_PARAM"], a::parameter),
    r("c_expr", &["NEXT_PARAM"], a::parameter),
    r("c_expr", &["LPAREN", "expr", "RPAREN"], a::second),
    r("c_expr", &["LPAREN", "fullselect", "RPAREN"], a::subquery),
    r("c_expr", &["CASE", "expr", "when_thens", "opt_else", "END"], a::simple_case),
    r("c_expr", &["CASE", "when_thens", "opt_else", "END"], a::searched_case),
    r("c_expr", &["ANY", "coll_bindings", "SATISFIES", "expr", "END"], a::satisfies),
    r("c_expr", &["EVERY", "coll_bindings", "SATISFIES", "expr", "END"], a::satisfies),
    r("c_expr", &["ARRAY", "expr", "FOR", "coll_bindings", "opt_when", "END"], a::comprehension),
    r("c_expr", &["FIRST", "expr", "FOR", "coll_bindings", "opt_when", "END"], a::comprehension),
    r("c_expr", &["LBRACKET", "opt_exprs", "RBRACKET"], a::array),
    r("c_expr", &["LBRACE", "opt_members", "RBRACE"], a::object),
    r("c_expr", &["IDENT", "LPAREN", "opt_exprs", "RPAREN"], a::function_call),
    r("c_expr", &["IDENT", "LPAREN", "DISTINCT", "expr", "RPAREN"], a::distinct_aggregate),
    r("c_expr", &["IDENT", "LPAREN", "STAR", "RPAREN"], a::star_aggregate),
    r("when_thens", &["WHEN", "expr", "THEN", "expr"], a::when_then_first),
    r("when_thens", &["when_thens", "WHEN", "expr", "THEN", "expr"], a::when_then_append),
    r("opt_else", &[], a::no_expr),
    r("opt_else", &["ELSE", "expr"], a::some_last),
    r("coll_bindings", &["coll_binding"], a::bindings_first),
    r("coll_bindings", &["coll_bindings", "COMMA", "coll_binding"], a::bindings_append),
    r("coll_binding", &["IDENT", "IN", "expr"], a::collection_binding),
    r("coll_binding", &["IDENT", "WITHIN", "expr"], a::collection_binding),
    r("opt_when", &[], a::no_expr),
    r("opt_when", &["WHEN", "expr"], a::some_last),
    r("opt_exprs", &[], a::no_exprs),
    r("opt_exprs", &["exprs"], a::pass),
    r("exprs", &["expr"], a::exprs_first),
    r("exprs", &["exprs", "COMMA", "expr"], a::exprs_append),
    r("opt_members", &[], a::no_pairs),
    r("opt_members", &["members"], a::pass),
    r("members", &["member"], a::pairs_first),
    r("members", &["members", "COMMA", "member"], a::pairs_append),
    r("member", &["expr", "COLON", "expr"], a::pair),
];

pub(super) static GRAMMAR: Grammar = Grammar {
    version: "n1ql-1",
    start: "input",
    rules: RULES,
    precedence: PRECEDENCE,
    terminals: Terminal::names,
    error_terminal: 1,
    end_terminal: 0,
};

#[cfg(test)]
mod tests {
    use super::super::{Conflicts, n1ql_table};
    use super::*;

    #[test]
    fn test_table_builds_without_conflicts() {
        let table = n1ql_table().unwrap();
        assert_eq!(table.conflicts(), Conflicts::default());
        assert_eq!(table.production_count(), RULES.len() + 1);
        assert_eq!(table.version(), GRAMMAR.version);
    }

    #[test]
    fn test_special_terminal_ids() {
        assert_eq!(Terminal::End.id(), GRAMMAR.end_terminal);
        assert_eq!(Terminal::Error.id(), GRAMMAR.error_terminal);
    }

    #[test]
    fn test_rule_names_are_lower_case() {
        for rule in RULES {
            assert!(
                rule.lhs.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "{rule:?}"
            );
        }
    }

    #[test]
    fn test_precedence_tags_exist() {
        let tags: Vec<&str> = PRECEDENCE.iter().flat_map(|(_, names)| names.iter().copied()).collect();
        for rule in RULES {
            if let Some(tag) = rule.prec {
                assert!(tags.contains(&tag), "{rule:?}");
            }
        }
    }
}

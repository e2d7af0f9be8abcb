//! Semantic actions of the N1QL grammar.
//!
//! Each production names one action. The action receives the values of the
//! production's right-hand side, in order, and builds the value of its
//! left-hand side. Misuse of valid syntax (an unknown function, a subquery
//! in a standalone expression) is reported as a usage error and yields
//! [`Expr::Error`] so that parsing can go on.

use core::mem;

use super::value::{Bounds, Mutations, SetOperator, Value};
use crate::ast::{
    Aggregate, BinaryOp, Binding, Collection, CollectionOp, CreateFunction, CreateIndex,
    CreatePrimaryIndex, DeleteStatement, DropIndex, DropPrimaryIndex, Expr, FromTerm, FunctionCall,
    GroupBy, IndexUsing, InsertSource, InsertStatement, IsCheck, JoinType, KeyspaceTerm, Literal,
    OrderBy, OrderDirection, Parameter, Path, Projection, ResultTerm, Select, SelectBody,
    SetClause, SetOp, StatementKind, Subselect, UnaryOp, UpdateStatement,
};
use crate::catalog;
use crate::lexer::{Keyword, Span, Token, TokenKind};
use crate::parser::{ActionFault, Reporter, Session};

/// A semantic action.
pub(crate) type ActionFn = fn(&mut Reduction<'_, '_>) -> Result<Value, ActionFault>;

type Reduced = Result<Value, ActionFault>;

/// One reduction in progress: the popped values plus the session and
/// reporter the action may consult.
pub(crate) struct Reduction<'r, 'src> {
    pub session: &'r mut Session,
    pub reporter: &'r mut Reporter<'src>,
    /// Source range covered by the right-hand side.
    pub span: Span,
    values: Vec<Value>,
}

impl<'r, 'src> Reduction<'r, 'src> {
    pub(crate) fn new(
        session: &'r mut Session,
        reporter: &'r mut Reporter<'src>,
        span: Span,
        values: Vec<Value>,
    ) -> Self {
        Self {
            session,
            reporter,
            span,
            values,
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    /// Moves value `i` out, leaving [`Value::Empty`] behind.
    fn take(&mut self, i: usize) -> Reduced {
        self.values
            .get_mut(i)
            .map(mem::take)
            .ok_or(ActionFault::Missing(i))
    }

    fn token(&mut self, i: usize) -> Result<Token, ActionFault> {
        self.take(i)?.into_token()
    }

    fn keyword(&mut self, i: usize) -> Result<Keyword, ActionFault> {
        let token = self.token(i)?;
        token.as_keyword().ok_or_else(|| mismatch("keyword", &token))
    }

    /// The text of an identifier, string or parameter token.
    fn text(&mut self, i: usize) -> Result<String, ActionFault> {
        let token = self.token(i)?;
        match token.kind {
            TokenKind::Identifier(text)
            | TokenKind::IdentifierIcase(text)
            | TokenKind::Namespace(text)
            | TokenKind::NamedParam(text)
            | TokenKind::String(text) => Ok(text),
            _ => Err(mismatch("name", &token)),
        }
    }

    fn expr(&mut self, i: usize) -> Result<Expr, ActionFault> {
        self.take(i)?.into_expr()
    }

    fn boxed(&mut self, i: usize) -> Result<Box<Expr>, ActionFault> {
        self.expr(i).map(Box::new)
    }

    fn usage_error(&mut self, message: impl Into<String>) {
        self.reporter.usage_error(message, self.span);
    }
}

fn mismatch(expected: &'static str, token: &Token) -> ActionFault {
    ActionFault::Mismatch {
        expected,
        found: super::Terminal::of(&token.kind).name(),
    }
}

// ---- Generic actions ----

/// Passes the first value through.
pub(crate) fn pass(r: &mut Reduction<'_, '_>) -> Reduced {
    if r.len() == 0 {
        return Ok(Value::Empty);
    }
    r.take(0)
}

pub(crate) fn empty(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Empty)
}

pub(crate) fn second(r: &mut Reduction<'_, '_>) -> Reduced {
    r.take(1)
}

pub(crate) fn last(r: &mut Reduction<'_, '_>) -> Reduced {
    let i = r.len().saturating_sub(1);
    r.take(i)
}

pub(crate) fn no_expr(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::OptExpr(None))
}

/// `KEYWORD... expr` as an optional expression.
pub(crate) fn some_last(r: &mut Reduction<'_, '_>) -> Reduced {
    let i = r.len().saturating_sub(1);
    Ok(Value::OptExpr(Some(r.expr(i)?)))
}

pub(crate) fn some_first(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::OptExpr(Some(r.expr(0)?)))
}

pub(crate) fn no(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Flag(false))
}

pub(crate) fn yes(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Flag(true))
}

pub(crate) fn no_name(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Name(None))
}

/// An identifier token as a name.
pub(crate) fn some_name(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Name(Some(r.text(0)?)))
}

/// A required alias, with or without `AS`.
pub(crate) fn alias(r: &mut Reduction<'_, '_>) -> Reduced {
    let i = r.len().saturating_sub(1);
    Ok(Value::Text(r.text(i)?))
}

pub(crate) fn optional_alias(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Name(Some(r.take(0)?.into_text()?)))
}

pub(crate) fn no_exprs(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Exprs(Vec::new()))
}

pub(crate) fn no_pairs(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Pairs(Vec::new()))
}

pub(crate) fn no_bindings(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Bindings(Vec::new()))
}

/// Builds the `first` and `append` actions of a comma separated list whose
/// items are at positions 0 and 2.
macro_rules! list_actions {
    ($($first:ident, $append:ident => $list:ident($into_list:ident) of $into_item:ident;)*) => {$(
        pub(crate) fn $first(r: &mut Reduction<'_, '_>) -> Reduced {
            Ok(Value::$list(vec![r.take(0)?.$into_item()?]))
        }

        pub(crate) fn $append(r: &mut Reduction<'_, '_>) -> Reduced {
            let mut items = r.take(0)?.$into_list()?;
            items.push(r.take(2)?.$into_item()?);
            Ok(Value::$list(items))
        }
    )*};
}

list_actions! {
    exprs_first, exprs_append => Exprs(into_exprs) of into_expr;
    pairs_first, pairs_append => Pairs(into_pairs) of into_pair;
    bindings_first, bindings_append => Bindings(into_bindings) of into_binding;
    terms_first, terms_append => Terms(into_terms) of into_term;
    orders_first, orders_append => Orders(into_orders) of into_order;
    sets_first, sets_append => Sets(into_sets) of into_set;
}

pub(crate) fn params_first(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Params(vec![r.text(0)?]))
}

pub(crate) fn params_append(r: &mut Reduction<'_, '_>) -> Reduced {
    let mut params = r.take(0)?.into_params()?;
    params.push(r.text(2)?);
    Ok(Value::Params(params))
}

pub(crate) fn no_params(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Params(Vec::new()))
}

// ---- Top level ----

pub(crate) fn accept_statement(r: &mut Reduction<'_, '_>) -> Reduced {
    let statement = r.take(0)?.into_stmt()?;
    r.session.set_statement(statement);
    Ok(Value::Empty)
}

pub(crate) fn accept_expression(r: &mut Reduction<'_, '_>) -> Reduced {
    let expr = r.expr(0)?;
    r.session.set_expression(expr);
    Ok(Value::Empty)
}

pub(crate) fn select_statement(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Stmt(StatementKind::Select(r.take(0)?.into_select()?)))
}

pub(crate) fn explain(r: &mut Reduction<'_, '_>) -> Reduced {
    let statement = r.take(1)?.into_stmt()?;
    Ok(Value::Stmt(StatementKind::Explain(Box::new(statement))))
}

pub(crate) fn prepare(r: &mut Reduction<'_, '_>) -> Reduced {
    let name = r.take(1)?.into_name()?;
    let statement = Box::new(r.take(2)?.into_stmt()?);
    Ok(Value::Stmt(StatementKind::Prepare { name, statement }))
}

pub(crate) fn execute(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Stmt(StatementKind::Execute(r.expr(1)?)))
}

// ---- SELECT ----

pub(crate) fn fullselect(r: &mut Reduction<'_, '_>) -> Reduced {
    let body = r.take(0)?.into_body()?;
    let order_by = r.take(1)?.into_orders()?;
    let Bounds { limit, offset } = r.take(2)?.into_bounds()?;
    Ok(Value::Select(Select {
        body,
        order_by,
        limit,
        offset,
    }))
}

pub(crate) fn single_body(r: &mut Reduction<'_, '_>) -> Reduced {
    let sub = r.take(0)?.into_subselect()?;
    Ok(Value::Body(SelectBody::Subselect(Box::new(sub))))
}

pub(crate) fn set_operation(r: &mut Reduction<'_, '_>) -> Reduced {
    let left = Box::new(r.take(0)?.into_body()?);
    let SetOperator { op, all } = r.take(1)?.into_set_op()?;
    let right = Box::new(r.take(2)?.into_subselect()?);
    Ok(Value::Body(SelectBody::SetOp {
        op,
        all,
        left,
        right,
    }))
}

/// `UNION | INTERSECT | EXCEPT [ALL]`
pub(crate) fn set_op(r: &mut Reduction<'_, '_>) -> Reduced {
    let all = r.len() == 2;
    let op = match r.keyword(0)? {
        Keyword::Union => SetOp::Union,
        Keyword::Intersect => SetOp::Intersect,
        Keyword::Except => SetOp::Except,
        _ => {
            return Err(ActionFault::Mismatch {
                expected: "set operator",
                found: "keyword",
            })
        }
    };
    Ok(Value::SetOp(SetOperator { op, all }))
}

fn subselect(
    projection: Projection,
    from: Option<FromTerm>,
    let_bindings: Vec<Binding>,
    where_clause: Option<Expr>,
    group_by: Option<GroupBy>,
) -> Value {
    Value::Subselect(Subselect {
        projection,
        from,
        let_bindings,
        where_clause,
        group_by,
    })
}

/// `SELECT ... [FROM ...] ...`
pub(crate) fn select_from(r: &mut Reduction<'_, '_>) -> Reduced {
    let projection = r.take(0)?.into_projection()?;
    let from = r.take(1)?.into_opt_from()?;
    let bindings = r.take(2)?.into_bindings()?;
    let where_clause = r.take(3)?.into_opt_expr()?;
    let group_by = r.take(4)?.into_group()?;
    Ok(subselect(projection, from, bindings, where_clause, group_by))
}

/// `FROM ... SELECT ...`
pub(crate) fn from_select(r: &mut Reduction<'_, '_>) -> Reduced {
    let from = r.take(0)?.into_from()?;
    let bindings = r.take(1)?.into_bindings()?;
    let where_clause = r.take(2)?.into_opt_expr()?;
    let group_by = r.take(3)?.into_group()?;
    let projection = r.take(4)?.into_projection()?;
    Ok(subselect(projection, Some(from), bindings, where_clause, group_by))
}

/// `[quantifier] terms`, or the plain terms of a RETURNING clause.
pub(crate) fn projection(r: &mut Reduction<'_, '_>) -> Reduced {
    let i = r.len() - 1;
    let distinct = if i == 1 { r.take(0)?.into_flag()? } else { false };
    let terms = r.take(i)?.into_terms()?;
    Ok(Value::Projection(Projection {
        distinct,
        raw: false,
        terms,
    }))
}

/// `[quantifier] RAW expr [alias]`
pub(crate) fn raw_projection(r: &mut Reduction<'_, '_>) -> Reduced {
    let n = r.len();
    let distinct = if n == 4 { r.take(0)?.into_flag()? } else { false };
    let expr = r.expr(n - 2)?;
    let alias = r.take(n - 1)?.into_name()?;
    Ok(Value::Projection(Projection {
        distinct,
        raw: true,
        terms: vec![ResultTerm::Expr { expr, alias }],
    }))
}

pub(crate) fn wildcard(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Term(ResultTerm::Wildcard))
}

pub(crate) fn qualified_wildcard(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Term(ResultTerm::QualifiedWildcard(r.expr(0)?)))
}

pub(crate) fn result_expr(r: &mut Reduction<'_, '_>) -> Reduced {
    let expr = r.expr(0)?;
    let alias = r.take(1)?.into_name()?;
    Ok(Value::Term(ResultTerm::Expr { expr, alias }))
}

// ---- FROM ----

pub(crate) fn no_from(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::OptFrom(None))
}

pub(crate) fn some_from(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::OptFrom(Some(r.take(0)?.into_from()?)))
}

pub(crate) fn keyspace_from(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::From(FromTerm::Keyspace(r.take(0)?.into_keyspace()?)))
}

/// `( fullselect ) alias`
pub(crate) fn subquery_from(r: &mut Reduction<'_, '_>) -> Reduced {
    let query = Box::new(r.take(1)?.into_select()?);
    let alias = r.take(3)?.into_text()?;
    Ok(Value::From(FromTerm::Subquery { query, alias }))
}

type JoinParts = (Box<FromTerm>, JoinType, KeyspaceTerm, Expr);

fn join_parts(r: &mut Reduction<'_, '_>) -> Result<JoinParts, ActionFault> {
    let left = Box::new(r.take(0)?.into_from()?);
    let join_type = r.take(1)?.into_join_type()?;
    let right = r.take(3)?.into_keyspace()?;
    let on_keys = r.expr(4)?;
    Ok((left, join_type, right, on_keys))
}

pub(crate) fn join(r: &mut Reduction<'_, '_>) -> Reduced {
    let (left, join_type, right, on_keys) = join_parts(r)?;
    Ok(Value::From(FromTerm::Join {
        left,
        join_type,
        right,
        on_keys,
    }))
}

pub(crate) fn nest(r: &mut Reduction<'_, '_>) -> Reduced {
    let (left, join_type, right, on_keys) = join_parts(r)?;
    Ok(Value::From(FromTerm::Nest {
        left,
        join_type,
        right,
        on_keys,
    }))
}

pub(crate) fn unnest(r: &mut Reduction<'_, '_>) -> Reduced {
    let left = Box::new(r.take(0)?.into_from()?);
    let join_type = r.take(1)?.into_join_type()?;
    let expr = r.expr(3)?;
    let alias = r.take(4)?.into_name()?;
    Ok(Value::From(FromTerm::Unnest {
        left,
        join_type,
        expr,
        alias,
    }))
}

pub(crate) fn inner_join(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::JoinType(JoinType::Inner))
}

pub(crate) fn left_join(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::JoinType(JoinType::LeftOuter))
}

pub(crate) fn keyspace_term(r: &mut Reduction<'_, '_>) -> Reduced {
    let path = r.take(0)?.into_path()?;
    let alias = r.take(1)?.into_name()?;
    let keys = r.take(2)?.into_opt_expr()?;
    Ok(Value::Keyspace(KeyspaceTerm { path, alias, keys }))
}

/// An unqualified name, resolved against the active query context.
pub(crate) fn keyspace_in_context(r: &mut Reduction<'_, '_>) -> Reduced {
    let name = r.text(0)?;
    Ok(Value::Path(r.session.resolve(name)))
}

/// `bucket.scope.keyspace` in the session namespace.
pub(crate) fn scoped_keyspace(r: &mut Reduction<'_, '_>) -> Reduced {
    let bucket = r.text(0)?;
    let scope = r.text(2)?;
    let keyspace = r.text(4)?;
    Ok(Value::Path(Path::long(
        r.session.namespace(),
        bucket,
        scope,
        keyspace,
    )))
}

/// `namespace:keyspace`
pub(crate) fn namespaced_keyspace(r: &mut Reduction<'_, '_>) -> Reduced {
    let namespace = r.text(0)?;
    let keyspace = r.text(2)?;
    Ok(Value::Path(Path::short(namespace, keyspace)))
}

/// `namespace:bucket.scope.keyspace`
pub(crate) fn namespaced_scoped_keyspace(r: &mut Reduction<'_, '_>) -> Reduced {
    let namespace = r.text(0)?;
    let bucket = r.text(2)?;
    let scope = r.text(4)?;
    let keyspace = r.text(6)?;
    Ok(Value::Path(Path::long(namespace, bucket, scope, keyspace)))
}

// ---- LET, WHERE, GROUP BY, ORDER BY ----

pub(crate) fn binding(r: &mut Reduction<'_, '_>) -> Reduced {
    let variable = r.text(0)?;
    let expr = r.expr(2)?;
    Ok(Value::Binding(Binding::new(variable, expr)))
}

pub(crate) fn no_group(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Group(None))
}

/// `GROUP BY exprs [LETTING ...] [HAVING ...]`
pub(crate) fn group_by(r: &mut Reduction<'_, '_>) -> Reduced {
    let keys = r.take(2)?.into_exprs()?;
    let letting = r.take(3)?.into_bindings()?;
    let having = r.take(4)?.into_opt_expr()?;
    Ok(Value::Group(Some(GroupBy {
        keys,
        letting,
        having,
    })))
}

pub(crate) fn letting_only(r: &mut Reduction<'_, '_>) -> Reduced {
    let letting = r.take(0)?.into_bindings()?;
    Ok(Value::Group(Some(GroupBy {
        keys: Vec::new(),
        letting,
        having: None,
    })))
}

pub(crate) fn no_orders(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Orders(Vec::new()))
}

pub(crate) fn sort_term(r: &mut Reduction<'_, '_>) -> Reduced {
    let expr = r.expr(0)?;
    let direction = r.take(1)?.into_direction()?;
    Ok(Value::Order(OrderBy { expr, direction }))
}

pub(crate) fn ascending(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Direction(OrderDirection::Asc))
}

pub(crate) fn descending(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Direction(OrderDirection::Desc))
}

pub(crate) fn no_bounds(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Bounds(Bounds::default()))
}

pub(crate) fn limit_only(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Bounds(Bounds {
        limit: Some(r.expr(0)?),
        offset: None,
    }))
}

pub(crate) fn offset_only(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Bounds(Bounds {
        limit: None,
        offset: Some(r.expr(0)?),
    }))
}

pub(crate) fn limit_offset(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Bounds(Bounds {
        limit: Some(r.expr(0)?),
        offset: Some(r.expr(1)?),
    }))
}

pub(crate) fn offset_limit(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Bounds(Bounds {
        offset: Some(r.expr(0)?),
        limit: Some(r.expr(1)?),
    }))
}

// ---- INSERT, UPSERT, DELETE, UPDATE ----

fn insert_statement(
    r: &mut Reduction<'_, '_>,
    source: InsertSource,
    returning_at: usize,
) -> Reduced {
    let upsert = r.keyword(0)? == Keyword::Upsert;
    let keyspace = r.take(2)?.into_path()?;
    let returning = r.take(returning_at)?.into_returning()?;
    let statement = InsertStatement {
        keyspace,
        source,
        returning,
    };
    Ok(Value::Stmt(if upsert {
        StatementKind::Upsert(statement)
    } else {
        StatementKind::Insert(statement)
    }))
}

/// `INSERT INTO ks [(KEY, VALUE)] VALUES ... [RETURNING ...]`
pub(crate) fn insert_values(r: &mut Reduction<'_, '_>) -> Reduced {
    let pairs = r.take(4)?.into_pairs()?;
    insert_statement(r, InsertSource::Values(pairs), 5)
}

/// `INSERT INTO ks (KEY k) SELECT ...`
pub(crate) fn insert_select(r: &mut Reduction<'_, '_>) -> Reduced {
    let key = r.expr(5)?;
    let query = Box::new(r.take(7)?.into_select()?);
    let source = InsertSource::Select {
        key,
        value: None,
        query,
    };
    insert_statement(r, source, 8)
}

/// `INSERT INTO ks (KEY k, VALUE v) SELECT ...`
pub(crate) fn insert_select_value(r: &mut Reduction<'_, '_>) -> Reduced {
    let key = r.expr(5)?;
    let value = Some(r.expr(8)?);
    let query = Box::new(r.take(10)?.into_select()?);
    let source = InsertSource::Select { key, value, query };
    insert_statement(r, source, 11)
}

pub(crate) fn values_first(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Pairs(vec![r.take(1)?.into_pair()?]))
}

/// `values, VALUES (k, v)`
pub(crate) fn values_append(r: &mut Reduction<'_, '_>) -> Reduced {
    let mut pairs = r.take(0)?.into_pairs()?;
    pairs.push(r.take(3)?.into_pair()?);
    Ok(Value::Pairs(pairs))
}

/// `(key, value)` of a VALUES list.
pub(crate) fn values_pair(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Pair((r.expr(1)?, r.expr(3)?)))
}

pub(crate) fn no_returning(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Returning(None))
}

pub(crate) fn returning(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Returning(Some(r.take(1)?.into_projection()?)))
}

pub(crate) fn delete(r: &mut Reduction<'_, '_>) -> Reduced {
    let keyspace = r.take(2)?.into_keyspace()?;
    let where_clause = r.take(3)?.into_opt_expr()?;
    let limit = r.take(4)?.into_opt_expr()?;
    let returning = r.take(5)?.into_returning()?;
    Ok(Value::Stmt(StatementKind::Delete(DeleteStatement {
        keyspace,
        where_clause,
        limit,
        returning,
    })))
}

pub(crate) fn update(r: &mut Reduction<'_, '_>) -> Reduced {
    let keyspace = r.take(1)?.into_keyspace()?;
    let Mutations { set, unset } = r.take(2)?.into_mutations()?;
    let where_clause = r.take(3)?.into_opt_expr()?;
    let limit = r.take(4)?.into_opt_expr()?;
    let returning = r.take(5)?.into_returning()?;
    Ok(Value::Stmt(StatementKind::Update(UpdateStatement {
        keyspace,
        set,
        unset,
        where_clause,
        limit,
        returning,
    })))
}

pub(crate) fn set_only(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Mutations(Mutations {
        set: r.take(0)?.into_sets()?,
        unset: Vec::new(),
    }))
}

pub(crate) fn unset_only(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Mutations(Mutations {
        set: Vec::new(),
        unset: r.take(0)?.into_exprs()?,
    }))
}

pub(crate) fn set_and_unset(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Mutations(Mutations {
        set: r.take(0)?.into_sets()?,
        unset: r.take(1)?.into_exprs()?,
    }))
}

pub(crate) fn set_term(r: &mut Reduction<'_, '_>) -> Reduced {
    let path = r.expr(0)?;
    let value = r.expr(2)?;
    Ok(Value::Set(SetClause { path, value }))
}

// ---- Index and function DDL ----

pub(crate) fn create_primary_index(r: &mut Reduction<'_, '_>) -> Reduced {
    let name = r.take(3)?.into_name()?;
    let keyspace = r.take(5)?.into_path()?;
    let using = r.take(6)?.into_using()?;
    Ok(Value::Stmt(StatementKind::CreatePrimaryIndex(
        CreatePrimaryIndex {
            name,
            keyspace,
            using,
        },
    )))
}

/// `CREATE INDEX name ON ks (keys) [WHERE ...] [USING ...]`
pub(crate) fn create_index(r: &mut Reduction<'_, '_>) -> Reduced {
    let name = r.text(2)?;
    let keyspace = r.take(4)?.into_path()?;
    let keys = r.take(6)?.into_exprs()?;
    let where_clause = r.take(8)?.into_opt_expr()?;
    let using = r.take(9)?.into_using()?;
    Ok(Value::Stmt(StatementKind::CreateIndex(CreateIndex {
        name,
        keyspace,
        keys,
        where_clause,
        using,
    })))
}

pub(crate) fn index_key(r: &mut Reduction<'_, '_>) -> Reduced {
    let expr = r.expr(0)?;
    if !expr.is_indexable() {
        r.usage_error("Expression not indexable.");
    }
    Ok(Value::Expr(expr))
}

pub(crate) fn gsi(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Using(IndexUsing::Gsi))
}

pub(crate) fn view(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Using(IndexUsing::View))
}

pub(crate) fn drop_primary_index(r: &mut Reduction<'_, '_>) -> Reduced {
    let keyspace = r.take(4)?.into_path()?;
    let using = r.take(5)?.into_using()?;
    Ok(Value::Stmt(StatementKind::DropPrimaryIndex(DropPrimaryIndex {
        keyspace,
        using,
    })))
}

/// `DROP INDEX ks.name [USING ...]`
pub(crate) fn drop_index(r: &mut Reduction<'_, '_>) -> Reduced {
    let keyspace = r.take(2)?.into_path()?;
    let name = r.text(4)?;
    let using = r.take(5)?.into_using()?;
    Ok(Value::Stmt(StatementKind::DropIndex(DropIndex {
        keyspace,
        name,
        using,
    })))
}

/// Enters the query context of the function being defined. The context
/// is left when the definition reduces, or when recovery discards it.
pub(crate) fn enter_function_context(r: &mut Reduction<'_, '_>) -> Reduced {
    let path = r.take(0)?.into_path()?;
    r.session.push_query_context(&path);
    Ok(Value::Context(path))
}

pub(crate) fn create_function(r: &mut Reduction<'_, '_>) -> Reduced {
    let name = r.take(2)?.into_context()?;
    r.session.pop_query_context();
    let params = r.take(4)?.into_params()?;
    let body = r.expr(6)?;
    Ok(Value::Stmt(StatementKind::CreateFunction(CreateFunction {
        name,
        params,
        body,
    })))
}

pub(crate) fn drop_function(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Stmt(StatementKind::DropFunction(
        r.take(2)?.into_path()?,
    )))
}

// ---- Expressions ----

pub(crate) fn error_expr(_: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Expr(Expr::Error))
}

pub(crate) fn literal(r: &mut Reduction<'_, '_>) -> Reduced {
    let token = r.token(0)?;
    let literal = match token.kind {
        TokenKind::Integer(n) => Literal::Integer(n),
        TokenKind::Float(f) => Literal::Float(f),
        TokenKind::String(s) => Literal::String(s),
        TokenKind::Keyword(Keyword::True) => Literal::Boolean(true),
        TokenKind::Keyword(Keyword::False) => Literal::Boolean(false),
        TokenKind::Keyword(Keyword::Null) => Literal::Null,
        TokenKind::Keyword(Keyword::Missing) => Literal::Missing,
        _ => return Err(mismatch("literal", &token)),
    };
    Ok(Value::Expr(Expr::Literal(literal)))
}

/// `IDENT` or `` `IDENT`i ``
pub(crate) fn identifier(r: &mut Reduction<'_, '_>) -> Reduced {
    let token = r.token(0)?;
    match token.kind {
        TokenKind::Identifier(name) => Ok(Value::Expr(Expr::Identifier {
            name,
            case_insensitive: false,
        })),
        TokenKind::IdentifierIcase(name) => Ok(Value::Expr(Expr::Identifier {
            name,
            case_insensitive: true,
        })),
        _ => Err(mismatch("identifier", &token)),
    }
}

/// `expr.name`
pub(crate) fn field(r: &mut Reduction<'_, '_>) -> Reduced {
    let target = r.boxed(0)?;
    let token = r.token(2)?;
    let (name, case_insensitive) = match token.kind {
        TokenKind::Identifier(name) => (name, false),
        TokenKind::IdentifierIcase(name) => (name, true),
        _ => return Err(mismatch("field name", &token)),
    };
    Ok(Value::Expr(Expr::Field {
        target,
        name,
        case_insensitive,
    }))
}

/// `expr[index]`
pub(crate) fn element(r: &mut Reduction<'_, '_>) -> Reduced {
    let target = r.boxed(0)?;
    let index = r.boxed(2)?;
    Ok(Value::Expr(Expr::Element { target, index }))
}

/// `expr[start:]` and `expr[start:end]`
pub(crate) fn slice(r: &mut Reduction<'_, '_>) -> Reduced {
    let target = r.boxed(0)?;
    let start = r.boxed(2)?;
    let end = if r.len() == 6 { Some(r.boxed(4)?) } else { None };
    Ok(Value::Expr(Expr::Slice { target, start, end }))
}

fn binary(r: &mut Reduction<'_, '_>, op: BinaryOp) -> Reduced {
    let last = r.len() - 1;
    let left = r.expr(0)?;
    let right = r.expr(last)?;
    Ok(Value::Expr(left.binary(op, right)))
}

/// Declares one action per binary operator. The right operand is the last
/// value, so `NOT LIKE` and friends share the shape of `LIKE`.
macro_rules! binary_actions {
    ($($name:ident => $op:ident,)*) => {$(
        pub(crate) fn $name(r: &mut Reduction<'_, '_>) -> Reduced {
            binary(r, BinaryOp::$op)
        }
    )*};
}

binary_actions! {
    add => Add,
    sub => Sub,
    mul => Mul,
    div => Div,
    modulo => Mod,
    concat => Concat,
    and => And,
    or => Or,
    eq => Eq,
    ne => NotEq,
    lt => Lt,
    le => LtEq,
    gt => Gt,
    ge => GtEq,
    like => Like,
    not_like => NotLike,
    in_ => In,
    not_in => NotIn,
    within => Within,
    not_within => NotWithin,
}

fn unary(r: &mut Reduction<'_, '_>, op: UnaryOp) -> Reduced {
    Ok(Value::Expr(Expr::unary(op, r.expr(1)?)))
}

pub(crate) fn negate(r: &mut Reduction<'_, '_>) -> Reduced {
    unary(r, UnaryOp::Neg)
}

pub(crate) fn not(r: &mut Reduction<'_, '_>) -> Reduced {
    unary(r, UnaryOp::Not)
}

pub(crate) fn exists(r: &mut Reduction<'_, '_>) -> Reduced {
    unary(r, UnaryOp::Exists)
}

/// `expr [NOT] BETWEEN low AND high`
pub(crate) fn between(r: &mut Reduction<'_, '_>) -> Reduced {
    let n = r.len();
    let negated = n == 6;
    let expr = r.boxed(0)?;
    let low = r.boxed(n - 3)?;
    let high = r.boxed(n - 1)?;
    Ok(Value::Expr(Expr::Between {
        expr,
        low,
        high,
        negated,
    }))
}

/// `expr IS [NOT] NULL | MISSING | VALUED`
pub(crate) fn is_check(r: &mut Reduction<'_, '_>) -> Reduced {
    let negated = r.len() == 4;
    let last = r.len() - 1;
    let check = match r.keyword(last)? {
        Keyword::Null => IsCheck::Null,
        Keyword::Missing => IsCheck::Missing,
        _ => IsCheck::Valued,
    };
    Ok(Value::Expr(Expr::Is {
        expr: r.boxed(0)?,
        check,
        negated,
    }))
}

/// `$name`, `$n` or `?`. Every occurrence counts towards the statement's
/// parameters; only `?` is numbered here.
pub(crate) fn parameter(r: &mut Reduction<'_, '_>) -> Reduced {
    let token = r.token(0)?;
    let parameter = match token.kind {
        TokenKind::NamedParam(name) => {
            r.session.count_parameter();
            Parameter::Named(name)
        }
        TokenKind::PositionalParam(n) => {
            r.session.count_parameter();
            Parameter::Positional(n)
        }
        TokenKind::Question => Parameter::Positional(r.session.next_positional()),
        _ => return Err(mismatch("parameter", &token)),
    };
    Ok(Value::Expr(Expr::Parameter(parameter)))
}

/// `( fullselect )` in an expression.
pub(crate) fn subquery(r: &mut Reduction<'_, '_>) -> Reduced {
    let select = r.take(1)?.into_select()?;
    if !r.session.parsing_statement() {
        r.usage_error("Cannot use subquery as an inline expression.");
        return Ok(Value::Expr(Expr::Error));
    }
    Ok(Value::Expr(Expr::Subquery(Box::new(select))))
}

/// `CASE operand WHEN ... END`
pub(crate) fn simple_case(r: &mut Reduction<'_, '_>) -> Reduced {
    let operand = Some(r.boxed(1)?);
    let when_clauses = r.take(2)?.into_pairs()?;
    let else_clause = r.take(3)?.into_opt_expr()?.map(Box::new);
    Ok(Value::Expr(Expr::Case {
        operand,
        when_clauses,
        else_clause,
    }))
}

/// `CASE WHEN ... END`
pub(crate) fn searched_case(r: &mut Reduction<'_, '_>) -> Reduced {
    let when_clauses = r.take(1)?.into_pairs()?;
    let else_clause = r.take(2)?.into_opt_expr()?.map(Box::new);
    Ok(Value::Expr(Expr::Case {
        operand: None,
        when_clauses,
        else_clause,
    }))
}

pub(crate) fn when_then_first(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Pairs(vec![(r.expr(1)?, r.expr(3)?)]))
}

pub(crate) fn when_then_append(r: &mut Reduction<'_, '_>) -> Reduced {
    let mut pairs = r.take(0)?.into_pairs()?;
    pairs.push((r.expr(2)?, r.expr(4)?));
    Ok(Value::Pairs(pairs))
}

/// `ANY | EVERY bindings SATISFIES expr END`
pub(crate) fn satisfies(r: &mut Reduction<'_, '_>) -> Reduced {
    let op = if r.keyword(0)? == Keyword::Every {
        CollectionOp::Every
    } else {
        CollectionOp::Any
    };
    let bindings = r.take(1)?.into_bindings()?;
    let body = r.expr(3)?;
    Ok(Value::Expr(Expr::Collection(Box::new(Collection {
        op,
        bindings,
        body,
        when: None,
    }))))
}

/// `ARRAY | FIRST expr FOR bindings [WHEN expr] END`
pub(crate) fn comprehension(r: &mut Reduction<'_, '_>) -> Reduced {
    let op = if r.keyword(0)? == Keyword::First {
        CollectionOp::First
    } else {
        CollectionOp::Array
    };
    let body = r.expr(1)?;
    let bindings = r.take(3)?.into_bindings()?;
    let when = r.take(4)?.into_opt_expr()?;
    Ok(Value::Expr(Expr::Collection(Box::new(Collection {
        op,
        bindings,
        body,
        when,
    }))))
}

/// `variable IN expr` or `variable WITHIN expr`
pub(crate) fn collection_binding(r: &mut Reduction<'_, '_>) -> Reduced {
    let variable = r.text(0)?;
    let descend = r.keyword(1)? == Keyword::Within;
    let expr = r.expr(2)?;
    Ok(Value::Binding(Binding {
        variable,
        expr,
        descend,
    }))
}

pub(crate) fn array(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Expr(Expr::Array(r.take(1)?.into_exprs()?)))
}

pub(crate) fn object(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Expr(Expr::Object(r.take(1)?.into_pairs()?)))
}

/// `name : value`
pub(crate) fn pair(r: &mut Reduction<'_, '_>) -> Reduced {
    Ok(Value::Pair((r.expr(0)?, r.expr(2)?)))
}

/// `name(args)`: a scalar function, or in a statement a plain aggregate.
pub(crate) fn function_call(r: &mut Reduction<'_, '_>) -> Reduced {
    let name = r.text(0)?;
    let args = r.take(2)?.into_exprs()?;
    let mut info = catalog::function(&name);
    if info.is_none() && r.session.parsing_statement() {
        info = catalog::aggregate(&name);
    }
    let Some(info) = info else {
        r.usage_error(format!("Invalid function {name}."));
        return Ok(Value::Expr(Expr::Error));
    };
    if !info.accepts(args.len()) {
        r.usage_error(format!("Wrong number of arguments to function {name}."));
        return Ok(Value::Expr(Expr::Error));
    }
    let expr = match info.kind {
        catalog::FunctionKind::Scalar => Expr::Function(FunctionCall {
            name: info.name.to_string(),
            args,
        }),
        catalog::FunctionKind::Aggregate => Expr::Aggregate(Aggregate {
            name: info.name.to_string(),
            arg: args.into_iter().next().map(Box::new),
            distinct: false,
        }),
    };
    Ok(Value::Expr(expr))
}

fn aggregate(r: &mut Reduction<'_, '_>, arg: Option<Expr>, distinct: bool) -> Reduced {
    let name = r.text(0)?;
    if !r.session.parsing_statement() {
        r.usage_error("Cannot use aggregate as an inline expression.");
        return Ok(Value::Expr(Expr::Error));
    }
    let Some(info) = catalog::aggregate(&name) else {
        r.usage_error(format!("Invalid aggregate function {name}."));
        return Ok(Value::Expr(Expr::Error));
    };
    Ok(Value::Expr(Expr::Aggregate(Aggregate {
        name: info.name.to_string(),
        arg: arg.map(Box::new),
        distinct,
    })))
}

/// `name(DISTINCT expr)`
pub(crate) fn distinct_aggregate(r: &mut Reduction<'_, '_>) -> Reduced {
    let arg = r.expr(3)?;
    aggregate(r, Some(arg), true)
}

/// `name(*)`
pub(crate) fn star_aggregate(r: &mut Reduction<'_, '_>) -> Reduced {
    aggregate(r, None, false)
}

//! N1QL statement AST types.

use super::expression::{Binding, Expr};
use super::path::Path;

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the N1QL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY clause entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderBy {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction (ASC or DESC).
    pub direction: OrderDirection,
}

/// Join type of JOIN, NEST and UNNEST terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JoinType {
    /// Inner (default).
    #[default]
    Inner,
    /// LEFT [OUTER].
    LeftOuter,
}

impl JoinType {
    /// Returns the N1QL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::LeftOuter => "LEFT OUTER",
        }
    }
}

/// A keyspace with its alias and optional `USE KEYS`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyspaceTerm {
    /// The resolved keyspace path.
    pub path: Path,
    /// Explicit alias.
    pub alias: Option<String>,
    /// `USE [PRIMARY] KEYS` expression.
    pub keys: Option<Expr>,
}

impl KeyspaceTerm {
    /// Creates a term for `path` with no alias.
    #[must_use]
    pub const fn new(path: Path) -> Self {
        Self {
            path,
            alias: None,
            keys: None,
        }
    }

    /// The name this term is referred to by.
    #[must_use]
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.path.alias())
    }
}

/// A term of the FROM clause.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FromTerm {
    /// A keyspace.
    Keyspace(KeyspaceTerm),
    /// A parenthesized subquery.
    Subquery {
        /// The subquery.
        query: Box<Select>,
        /// Alias (required for subqueries).
        alias: String,
    },
    /// `left JOIN keyspace ON KEYS expr`
    Join {
        left: Box<FromTerm>,
        join_type: JoinType,
        right: KeyspaceTerm,
        on_keys: Expr,
    },
    /// `left NEST keyspace ON KEYS expr`
    Nest {
        left: Box<FromTerm>,
        join_type: JoinType,
        right: KeyspaceTerm,
        on_keys: Expr,
    },
    /// `left UNNEST expr [AS alias]`
    Unnest {
        left: Box<FromTerm>,
        join_type: JoinType,
        expr: Expr,
        alias: Option<String>,
    },
}

impl FromTerm {
    /// The leftmost keyspace or subquery alias, the primary term.
    #[must_use]
    pub fn primary_alias(&self) -> Option<&str> {
        match self {
            Self::Keyspace(term) => Some(term.alias()),
            Self::Subquery { alias, .. } => Some(alias.as_str()),
            Self::Join { left, .. } | Self::Nest { left, .. } | Self::Unnest { left, .. } => {
                left.primary_alias()
            }
        }
    }
}

/// A projection result term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResultTerm {
    /// `*`
    Wildcard,
    /// `expr.*`
    QualifiedWildcard(Expr),
    /// `expr [AS alias]`
    Expr {
        expr: Expr,
        alias: Option<String>,
    },
}

/// The SELECT list.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projection {
    /// DISTINCT was specified.
    pub distinct: bool,
    /// RAW / ELEMENT / VALUE: a single unwrapped term.
    pub raw: bool,
    /// The result terms.
    pub terms: Vec<ResultTerm>,
}

/// GROUP BY with its LETTING and HAVING clauses.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupBy {
    /// Grouping keys; empty for a bare LETTING.
    pub keys: Vec<Expr>,
    pub letting: Vec<Binding>,
    pub having: Option<Expr>,
}

/// One SELECT ... FROM ... block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subselect {
    pub projection: Projection,
    pub from: Option<FromTerm>,
    pub let_bindings: Vec<Binding>,
    pub where_clause: Option<Expr>,
    pub group_by: Option<GroupBy>,
}

/// Set operators joining subselects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SetOp {
    Union,
    Intersect,
    Except,
}

/// The body of a SELECT: a subselect or a chain of set operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectBody {
    Subselect(Box<Subselect>),
    SetOp {
        op: SetOp,
        all: bool,
        left: Box<SelectBody>,
        right: Box<Subselect>,
    },
}

impl SelectBody {
    /// Every subselect, left to right.
    #[must_use]
    pub fn subselects(&self) -> Vec<&Subselect> {
        match self {
            Self::Subselect(sub) => vec![&**sub],
            Self::SetOp { left, right, .. } => {
                let mut out = left.subselects();
                out.push(right);
                out
            }
        }
    }
}

/// A full SELECT statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Select {
    pub body: SelectBody,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

impl Select {
    /// The first subselect of the body.
    #[must_use]
    pub fn first(&self) -> &Subselect {
        let mut body = &self.body;
        loop {
            match body {
                SelectBody::Subselect(sub) => return sub,
                SelectBody::SetOp { left, .. } => body = &**left,
            }
        }
    }
}

/// Source of an INSERT or UPSERT.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InsertSource {
    /// `VALUES (key, value), ...`
    Values(Vec<(Expr, Expr)>),
    /// `(KEY k [, VALUE v]) SELECT ...`
    Select {
        key: Expr,
        value: Option<Expr>,
        query: Box<Select>,
    },
}

/// An INSERT or UPSERT statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InsertStatement {
    pub keyspace: Path,
    pub source: InsertSource,
    pub returning: Option<Projection>,
}

/// A `SET path = value` entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetClause {
    pub path: Expr,
    pub value: Expr,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateStatement {
    pub keyspace: KeyspaceTerm,
    pub set: Vec<SetClause>,
    pub unset: Vec<Expr>,
    pub where_clause: Option<Expr>,
    pub limit: Option<Expr>,
    pub returning: Option<Projection>,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeleteStatement {
    pub keyspace: KeyspaceTerm,
    pub where_clause: Option<Expr>,
    pub limit: Option<Expr>,
    pub returning: Option<Projection>,
}

/// Index implementation named by `USING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexUsing {
    #[default]
    Gsi,
    View,
}

/// CREATE PRIMARY INDEX.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatePrimaryIndex {
    pub name: Option<String>,
    pub keyspace: Path,
    pub using: IndexUsing,
}

/// CREATE INDEX.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateIndex {
    pub name: String,
    pub keyspace: Path,
    pub keys: Vec<Expr>,
    pub where_clause: Option<Expr>,
    pub using: IndexUsing,
}

/// DROP PRIMARY INDEX.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropPrimaryIndex {
    pub keyspace: Path,
    pub using: IndexUsing,
}

/// DROP INDEX.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropIndex {
    pub keyspace: Path,
    pub name: String,
    pub using: IndexUsing,
}

/// CREATE FUNCTION with an inline body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateFunction {
    pub name: Path,
    pub params: Vec<String>,
    pub body: Expr,
}

/// A parsed N1QL statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatementKind {
    Select(Select),
    Insert(InsertStatement),
    Upsert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    CreatePrimaryIndex(CreatePrimaryIndex),
    CreateIndex(CreateIndex),
    DropPrimaryIndex(DropPrimaryIndex),
    DropIndex(DropIndex),
    CreateFunction(CreateFunction),
    DropFunction(Path),
    Explain(Box<StatementKind>),
    Prepare {
        name: Option<String>,
        statement: Box<StatementKind>,
    },
    Execute(Expr),
}

impl StatementKind {
    /// The statement's leading keyword(s).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Upsert(_) => "UPSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
            Self::CreatePrimaryIndex(_) => "CREATE PRIMARY INDEX",
            Self::CreateIndex(_) => "CREATE INDEX",
            Self::DropPrimaryIndex(_) => "DROP PRIMARY INDEX",
            Self::DropIndex(_) => "DROP INDEX",
            Self::CreateFunction(_) => "CREATE FUNCTION",
            Self::DropFunction(_) => "DROP FUNCTION",
            Self::Explain(_) => "EXPLAIN",
            Self::Prepare { .. } => "PREPARE",
            Self::Execute(_) => "EXECUTE",
        }
    }
}

/// A statement together with the number of parameters it references.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statement {
    pub kind: StatementKind,
    /// Count of parameter occurrences (`$name`, `$n` and `?`).
    pub param_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subselect(alias: &str) -> Subselect {
        Subselect {
            projection: Projection::default(),
            from: Some(FromTerm::Keyspace(KeyspaceTerm::new(Path::short(
                "default", alias,
            )))),
            let_bindings: Vec::new(),
            where_clause: None,
            group_by: None,
        }
    }

    #[test]
    fn test_order_direction() {
        assert_eq!(OrderDirection::Asc.as_str(), "ASC");
        assert_eq!(OrderDirection::Desc.as_str(), "DESC");
        assert_eq!(OrderDirection::default(), OrderDirection::Asc);
    }

    #[test]
    fn test_keyspace_term_alias() {
        let mut term = KeyspaceTerm::new(Path::short("default", "orders"));
        assert_eq!(term.alias(), "orders");
        term.alias = Some(String::from("o"));
        assert_eq!(term.alias(), "o");
    }

    #[test]
    fn test_primary_alias_of_join() {
        let from = FromTerm::Unnest {
            left: Box::new(FromTerm::Keyspace(KeyspaceTerm::new(Path::short(
                "default", "orders",
            )))),
            join_type: JoinType::Inner,
            expr: Expr::identifier("orders").field("items"),
            alias: Some(String::from("i")),
        };
        assert_eq!(from.primary_alias(), Some("orders"));
    }

    #[test]
    fn test_set_op_subselects() {
        let select = Select {
            body: SelectBody::SetOp {
                op: SetOp::Union,
                all: true,
                left: Box::new(SelectBody::Subselect(Box::new(subselect("a")))),
                right: Box::new(subselect("b")),
            },
            order_by: Vec::new(),
            limit: None,
            offset: None,
        };
        assert_eq!(select.body.subselects().len(), 2);
        assert_eq!(
            select.first().from.as_ref().and_then(FromTerm::primary_alias),
            Some("a")
        );
    }

    #[test]
    fn test_statement_names() {
        let kind = StatementKind::Explain(Box::new(StatementKind::Execute(Expr::string("p"))));
        assert_eq!(kind.name(), "EXPLAIN");
        assert_eq!(StatementKind::DropFunction(Path::short("default", "f")).name(), "DROP FUNCTION");
    }
}

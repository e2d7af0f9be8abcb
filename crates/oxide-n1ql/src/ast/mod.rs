//! Abstract Syntax Tree (AST) types for N1QL statements.

mod expression;
mod path;
mod statement;

pub use expression::{
    Aggregate, BinaryOp, Binding, Collection, CollectionOp, Expr, FunctionCall, IsCheck, Literal,
    Parameter, UnaryOp,
};
pub use path::{Path, QueryContextError, parse_query_context, validate_query_context};
pub use statement::{
    CreateFunction, CreateIndex, CreatePrimaryIndex, DeleteStatement, DropIndex, DropPrimaryIndex,
    FromTerm, GroupBy, IndexUsing, InsertSource, InsertStatement, JoinType, KeyspaceTerm, OrderBy,
    OrderDirection, Projection, ResultTerm, Select, SelectBody, SetClause, SetOp, Statement,
    StatementKind, Subselect, UpdateStatement,
};

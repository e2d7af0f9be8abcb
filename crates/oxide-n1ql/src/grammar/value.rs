//! Semantic values carried on the parser stack.

use crate::ast::{
    Binding, Expr, FromTerm, GroupBy, IndexUsing, JoinType, KeyspaceTerm, OrderBy,
    OrderDirection, Path, Projection, ResultTerm, Select, SelectBody, SetClause, SetOp,
    StatementKind, Subselect,
};
use crate::lexer::Token;
use crate::parser::ActionFault;

/// A set operator with its `ALL` flag.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SetOperator {
    pub op: SetOp,
    pub all: bool,
}

/// `LIMIT` and `OFFSET` of a SELECT, in either order.
#[derive(Debug, Default)]
pub(crate) struct Bounds {
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

/// The SET and UNSET clauses of an UPDATE.
#[derive(Debug, Default)]
pub(crate) struct Mutations {
    pub set: Vec<SetClause>,
    pub unset: Vec<Expr>,
}

/// Declares [`Value`] together with one consuming accessor per variant.
/// An accessor applied to the wrong variant is an [`ActionFault`].
macro_rules! values {
    ($($variant:ident($ty:ty) => $into:ident,)*) => {
        #[derive(Debug, Default)]
        pub(crate) enum Value {
            /// Pushed for the stack bottom, `error`, and rules with no value.
            #[default]
            Empty,
            $($variant($ty),)*
        }

        impl Value {
            /// The variant name, for fault messages.
            pub(crate) const fn kind_name(&self) -> &'static str {
                match self {
                    Self::Empty => "Empty",
                    $(Self::$variant(_) => stringify!($variant),)*
                }
            }

            $(
                pub(crate) fn $into(self) -> Result<$ty, ActionFault> {
                    match self {
                        Self::$variant(inner) => Ok(inner),
                        other => Err(ActionFault::Mismatch {
                            expected: stringify!($variant),
                            found: other.kind_name(),
                        }),
                    }
                }
            )*
        }
    };
}

values! {
    Token(Token) => into_token,
    Expr(Expr) => into_expr,
    Exprs(Vec<Expr>) => into_exprs,
    OptExpr(Option<Expr>) => into_opt_expr,
    Pair((Expr, Expr)) => into_pair,
    Pairs(Vec<(Expr, Expr)>) => into_pairs,
    Binding(Binding) => into_binding,
    Bindings(Vec<Binding>) => into_bindings,
    Stmt(StatementKind) => into_stmt,
    Select(Select) => into_select,
    Body(SelectBody) => into_body,
    Subselect(Subselect) => into_subselect,
    SetOp(SetOperator) => into_set_op,
    Bounds(Bounds) => into_bounds,
    Projection(Projection) => into_projection,
    Term(ResultTerm) => into_term,
    Terms(Vec<ResultTerm>) => into_terms,
    From(FromTerm) => into_from,
    OptFrom(Option<FromTerm>) => into_opt_from,
    Keyspace(KeyspaceTerm) => into_keyspace,
    Path(Path) => into_path,
    Group(Option<GroupBy>) => into_group,
    Order(OrderBy) => into_order,
    Orders(Vec<OrderBy>) => into_orders,
    Direction(OrderDirection) => into_direction,
    JoinType(JoinType) => into_join_type,
    Flag(bool) => into_flag,
    Name(Option<String>) => into_name,
    Text(String) => into_text,
    Returning(Option<Projection>) => into_returning,
    Set(SetClause) => into_set,
    Sets(Vec<SetClause>) => into_sets,
    Mutations(Mutations) => into_mutations,
    Using(IndexUsing) => into_using,
    Params(Vec<String>) => into_params,
    Context(Path) => into_context,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_returns_payload() {
        let value = Value::Flag(true);
        assert_eq!(value.into_flag(), Ok(true));
    }

    #[test]
    fn test_accessor_reports_mismatch() {
        let value = Value::Exprs(Vec::new());
        assert_eq!(
            value.into_expr(),
            Err(ActionFault::Mismatch {
                expected: "Expr",
                found: "Exprs",
            })
        );
        assert_eq!(Value::default().kind_name(), "Empty");
    }
}

//! Expression AST types.

use super::Select;

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Boolean literal.
    Boolean(bool),
    /// NULL literal.
    Null,
    /// MISSING literal.
    Missing,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Concat,
    Like,
    NotLike,

    // Collection membership
    In,
    NotIn,
    Within,
    NotWithin,
}

impl BinaryOp {
    /// Returns the N1QL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Within => "WITHIN",
            Self::NotWithin => "NOT WITHIN",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical NOT
    Not,
    /// EXISTS
    Exists,
}

impl UnaryOp {
    /// Returns the N1QL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "NOT",
            Self::Exists => "EXISTS",
        }
    }
}

/// The value class tested by `IS [NOT] ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IsCheck {
    Null,
    Missing,
    Valued,
}

/// A query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parameter {
    /// `$name`
    Named(String),
    /// `$n`, or `?` numbered in order of appearance
    Positional(usize),
}

/// A scalar function call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionCall {
    /// The canonical (upper case) function name.
    pub name: String,
    /// The arguments.
    pub args: Vec<Expr>,
}

/// An aggregate function call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aggregate {
    /// The canonical (upper case) aggregate name.
    pub name: String,
    /// The operand; `None` for `COUNT(*)`.
    pub arg: Option<Box<Expr>>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
}

/// A variable bound over an expression: `LET` bindings and collection
/// bindings (`x IN expr`, `x WITHIN expr`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binding {
    /// The variable name.
    pub variable: String,
    /// The bound expression.
    pub expr: Expr,
    /// `WITHIN`: the variable ranges over all nested values.
    pub descend: bool,
}

impl Binding {
    /// Creates a `variable = expr` binding.
    #[must_use]
    pub fn new(variable: impl Into<String>, expr: Expr) -> Self {
        Self {
            variable: variable.into(),
            expr,
            descend: false,
        }
    }
}

/// Collection operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionOp {
    /// `ANY ... SATISFIES ... END`
    Any,
    /// `EVERY ... SATISFIES ... END`
    Every,
    /// `ARRAY ... FOR ... END`
    Array,
    /// `FIRST ... FOR ... END`
    First,
}

/// A collection predicate or comprehension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collection {
    pub op: CollectionOp,
    pub bindings: Vec<Binding>,
    /// The `SATISFIES` condition, or the mapping of a comprehension.
    pub body: Expr,
    /// The `WHEN` filter of a comprehension.
    pub when: Option<Expr>,
}

/// A N1QL expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A bare identifier: a keyspace alias, a variable, or (before
    /// formalization) a field of the only keyspace in scope.
    Identifier {
        name: String,
        case_insensitive: bool,
    },

    /// Field access (`target.name`).
    Field {
        target: Box<Expr>,
        name: String,
        case_insensitive: bool,
    },

    /// Element access (`target[index]`).
    Element { target: Box<Expr>, index: Box<Expr> },

    /// Array slice (`target[start:end]`).
    Slice {
        target: Box<Expr>,
        start: Box<Expr>,
        end: Option<Box<Expr>>,
    },

    /// A binary expression.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// A unary expression.
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// BETWEEN expression.
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// `IS [NOT] NULL | MISSING | VALUED`
    Is {
        expr: Box<Expr>,
        check: IsCheck,
        negated: bool,
    },

    /// A scalar function call.
    Function(FunctionCall),

    /// An aggregate function call.
    Aggregate(Aggregate),

    /// A query parameter.
    Parameter(Parameter),

    /// CASE expression.
    Case {
        /// The operand of a simple CASE.
        operand: Option<Box<Expr>>,
        /// WHEN/THEN clauses.
        when_clauses: Vec<(Expr, Expr)>,
        /// ELSE clause.
        else_clause: Option<Box<Expr>>,
    },

    /// ANY, EVERY, ARRAY and FIRST.
    Collection(Box<Collection>),

    /// Array constructor.
    Array(Vec<Expr>),

    /// Object constructor.
    Object(Vec<(Expr, Expr)>),

    /// A parenthesized subquery.
    Subquery(Box<Select>),

    /// Stands in for an expression that failed to parse or was rejected.
    Error,
}

impl Expr {
    /// Creates an identifier.
    #[must_use]
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier {
            name: name.into(),
            case_insensitive: false,
        }
    }

    /// Creates a new integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Creates a new float literal.
    #[must_use]
    pub const fn float(value: f64) -> Self {
        Self::Literal(Literal::Float(value))
    }

    /// Creates a new string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Creates a new boolean literal.
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::Literal(Literal::Boolean(value))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Accesses a field of this expression.
    #[must_use]
    pub fn field(self, name: impl Into<String>) -> Self {
        Self::Field {
            target: Box::new(self),
            name: name.into(),
            case_insensitive: false,
        }
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a unary expression.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    /// Direct sub-expressions, not descending into subqueries.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Literal(_)
            | Self::Identifier { .. }
            | Self::Parameter(_)
            | Self::Subquery(_)
            | Self::Error => Vec::new(),
            Self::Field { target, .. } => vec![&**target],
            Self::Element { target, index } => vec![&**target, &**index],
            Self::Slice { target, start, end } => {
                let mut out: Vec<&Self> = vec![&**target, &**start];
                out.extend(end.as_deref());
                out
            }
            Self::Binary { left, right, .. } => vec![&**left, &**right],
            Self::Unary { operand, .. } => vec![&**operand],
            Self::Between { expr, low, high, .. } => vec![&**expr, &**low, &**high],
            Self::Is { expr, .. } => vec![&**expr],
            Self::Function(call) => call.args.iter().collect(),
            Self::Aggregate(agg) => agg.arg.as_deref().into_iter().collect(),
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let mut out: Vec<&Self> = operand.as_deref().into_iter().collect();
                for (when, then) in when_clauses {
                    out.push(when);
                    out.push(then);
                }
                out.extend(else_clause.as_deref());
                out
            }
            Self::Collection(coll) => {
                let mut out: Vec<&Self> = coll.bindings.iter().map(|b| &b.expr).collect();
                out.push(&coll.body);
                out.extend(coll.when.as_ref());
                out
            }
            Self::Array(items) => items.iter().collect(),
            Self::Object(members) => members.iter().flat_map(|(k, v)| [k, v]).collect(),
        }
    }

    /// Mutable direct sub-expressions, in the order of [`Expr::children`].
    pub fn children_mut(&mut self) -> Vec<&mut Self> {
        match self {
            Self::Literal(_)
            | Self::Identifier { .. }
            | Self::Parameter(_)
            | Self::Subquery(_)
            | Self::Error => Vec::new(),
            Self::Field { target, .. } => vec![&mut **target],
            Self::Element { target, index } => vec![&mut **target, &mut **index],
            Self::Slice { target, start, end } => {
                let mut out: Vec<&mut Self> = vec![&mut **target, &mut **start];
                out.extend(end.as_deref_mut());
                out
            }
            Self::Binary { left, right, .. } => vec![&mut **left, &mut **right],
            Self::Unary { operand, .. } => vec![&mut **operand],
            Self::Between { expr, low, high, .. } => vec![&mut **expr, &mut **low, &mut **high],
            Self::Is { expr, .. } => vec![&mut **expr],
            Self::Function(call) => call.args.iter_mut().collect(),
            Self::Aggregate(agg) => agg.arg.as_deref_mut().into_iter().collect(),
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let mut out: Vec<&mut Self> = operand.as_deref_mut().into_iter().collect();
                for (when, then) in when_clauses {
                    out.push(when);
                    out.push(then);
                }
                out.extend(else_clause.as_deref_mut());
                out
            }
            Self::Collection(coll) => {
                let Collection {
                    bindings,
                    body,
                    when,
                    ..
                } = &mut **coll;
                let mut out: Vec<&mut Self> = bindings.iter_mut().map(|b| &mut b.expr).collect();
                out.push(body);
                out.extend(when.as_mut());
                out
            }
            Self::Array(items) => items.iter_mut().collect(),
            Self::Object(members) => members.iter_mut().flat_map(|(k, v)| [k, v]).collect(),
        }
    }

    /// Whether `pred` holds for this expression or any sub-expression.
    pub fn any(&self, pred: &mut impl FnMut(&Self) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        self.children().into_iter().any(|child| child.any(pred))
    }

    /// Whether this expression contains an aggregate call.
    #[must_use]
    pub fn contains_aggregate(&self) -> bool {
        self.any(&mut |e| matches!(e, Self::Aggregate(_)))
    }

    /// Whether this expression contains a subquery.
    #[must_use]
    pub fn contains_subquery(&self) -> bool {
        self.any(&mut |e| matches!(e, Self::Subquery(_)))
    }

    /// Whether this expression refers to no data: no identifiers, no
    /// parameters and no subqueries.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        !self.any(&mut |e| {
            matches!(
                e,
                Self::Identifier { .. } | Self::Parameter(_) | Self::Subquery(_)
            )
        })
    }

    /// Whether this expression can be an index key.
    #[must_use]
    pub fn is_indexable(&self) -> bool {
        !self.is_constant()
            && !self.any(&mut |e| {
                matches!(
                    e,
                    Self::Parameter(_) | Self::Subquery(_) | Self::Aggregate(_) | Self::Error
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_builders() {
        let ident = Expr::identifier("name");
        assert!(matches!(ident, Expr::Identifier { name, .. } if name == "name"));

        let lit = Expr::integer(42);
        assert!(matches!(lit, Expr::Literal(Literal::Integer(42))));
    }

    #[test]
    fn test_expr_chaining() {
        let expr = Expr::identifier("age")
            .binary(BinaryOp::Gt, Expr::integer(18))
            .and(Expr::identifier("status").eq(Expr::string("active")));

        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
        assert_eq!(expr.children().len(), 2);
    }

    #[test]
    fn test_constant_and_indexable() {
        let constant = Expr::integer(1).binary(BinaryOp::Add, Expr::integer(2));
        assert!(constant.is_constant());
        assert!(!constant.is_indexable());

        let field = Expr::identifier("a").field("b");
        assert!(!field.is_constant());
        assert!(field.is_indexable());

        let param = Expr::identifier("a").eq(Expr::Parameter(Parameter::Positional(1)));
        assert!(!param.is_indexable());

        let agg = Expr::Aggregate(Aggregate {
            name: String::from("SUM"),
            arg: Some(Box::new(Expr::identifier("a"))),
            distinct: false,
        });
        assert!(agg.contains_aggregate());
        assert!(!agg.is_indexable());
    }

    #[test]
    fn test_children_of_collection() {
        let coll = Expr::Collection(Box::new(Collection {
            op: CollectionOp::Array,
            bindings: vec![Binding::new("v", Expr::identifier("items"))],
            body: Expr::identifier("v").field("price"),
            when: Some(Expr::boolean(true)),
        }));
        assert_eq!(coll.children().len(), 3);
    }

    #[test]
    fn test_children_mut_rewrites_in_place() {
        let mut expr = Expr::identifier("a").binary(BinaryOp::Add, Expr::identifier("b"));
        for child in expr.children_mut() {
            *child = Expr::integer(1);
        }
        assert_eq!(expr, Expr::integer(1).binary(BinaryOp::Add, Expr::integer(1)));
    }
}

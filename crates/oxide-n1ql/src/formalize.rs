//! Name resolution over a parsed statement.
//!
//! Every bare identifier must name something in scope: a keyspace or
//! subquery alias, a JOIN, NEST or UNNEST alias, or a LET, LETTING,
//! collection or function variable. Anything else becomes a field of the
//! only keyspace in scope, `a` turning into `orders.a`. With no keyspace,
//! or after a JOIN made the scope ambiguous, it is an error.

use std::collections::HashSet;
use std::mem;

use tracing::trace;

use crate::ast::{
    Binding, DeleteStatement, Expr, FromTerm, InsertSource, InsertStatement, KeyspaceTerm,
    Projection, ResultTerm, Select, SelectBody, StatementKind, Subselect, UpdateStatement,
};
use crate::error::Result;

/// Name resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormalizeError {
    #[error("Duplicate variable {0} already in scope.")]
    DuplicateVariable(String),

    /// Two terms of one FROM clause share an alias.
    #[error("Duplicate {kind} alias {alias}.")]
    DuplicateAlias { kind: &'static str, alias: String },

    #[error("UNNEST term must have a name or alias.")]
    MissingAlias,

    #[error("Ambiguous reference to field {0}.")]
    AmbiguousReference(String),
}

/// Resolves the names of a statement. DDL other than CREATE FUNCTION is
/// returned as is.
///
/// # Errors
///
/// Returns the first [`FormalizeError`] met, walking clauses in
/// evaluation order.
pub fn statement(mut kind: StatementKind) -> Result<StatementKind, FormalizeError> {
    trace!(statement = kind.name(), "formalize");
    formalize(&mut kind)?;
    Ok(kind)
}

fn formalize(kind: &mut StatementKind) -> Result<(), FormalizeError> {
    match kind {
        StatementKind::Select(select) => Scope::default().select(select),
        StatementKind::Insert(insert) | StatementKind::Upsert(insert) => formalize_insert(insert),
        StatementKind::Update(update) => formalize_update(update),
        StatementKind::Delete(delete) => formalize_delete(delete),
        StatementKind::CreateFunction(function) => {
            Scope::with_names(function.params.iter().cloned()).expr(&mut function.body)
        }
        StatementKind::Explain(inner) | StatementKind::Prepare { statement: inner, .. } => {
            formalize(inner)
        }
        StatementKind::CreatePrimaryIndex(_)
        | StatementKind::CreateIndex(_)
        | StatementKind::DropPrimaryIndex(_)
        | StatementKind::DropIndex(_)
        | StatementKind::DropFunction(_)
        | StatementKind::Execute(_) => Ok(()),
    }
}

fn formalize_insert(insert: &mut InsertStatement) -> Result<(), FormalizeError> {
    match &mut insert.source {
        InsertSource::Values(pairs) => {
            let scope = Scope::default();
            for (key, value) in pairs {
                scope.expr(key)?;
                scope.expr(value)?;
            }
        }
        // KEY and VALUE name columns of the query's result.
        InsertSource::Select { query, .. } => Scope::default().select(query)?,
    }
    if let Some(returning) = &mut insert.returning {
        Scope::keyspace(insert.keyspace.alias()).projection(returning)?;
    }
    Ok(())
}

fn formalize_delete(delete: &mut DeleteStatement) -> Result<(), FormalizeError> {
    let scope = keyspace_scope(&mut delete.keyspace, delete.limit.as_mut())?;
    if let Some(condition) = &mut delete.where_clause {
        scope.expr(condition)?;
    }
    if let Some(returning) = &mut delete.returning {
        scope.projection(returning)?;
    }
    Ok(())
}

fn formalize_update(update: &mut UpdateStatement) -> Result<(), FormalizeError> {
    let scope = keyspace_scope(&mut update.keyspace, update.limit.as_mut())?;
    for set in &mut update.set {
        scope.expr(&mut set.path)?;
        scope.expr(&mut set.value)?;
    }
    for path in &mut update.unset {
        scope.expr(path)?;
    }
    if let Some(condition) = &mut update.where_clause {
        scope.expr(condition)?;
    }
    if let Some(returning) = &mut update.returning {
        scope.projection(returning)?;
    }
    Ok(())
}

/// The scope of a DML target. USE KEYS and LIMIT see no names.
fn keyspace_scope(
    term: &mut KeyspaceTerm,
    limit: Option<&mut Expr>,
) -> Result<Scope, FormalizeError> {
    let empty = Scope::default();
    if let Some(keys) = &mut term.keys {
        empty.expr(keys)?;
    }
    if let Some(limit) = limit {
        empty.expr(limit)?;
    }
    Ok(Scope::keyspace(term.alias()))
}

/// The name an expression gets when it is not aliased.
fn implicit_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Identifier { name, .. } | Expr::Field { name, .. } => Some(name),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
struct Scope {
    allowed: HashSet<String>,
    /// The keyspace unknown identifiers are fields of.
    keyspace: Option<String>,
}

impl Scope {
    fn with_names(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: names.into_iter().collect(),
            keyspace: None,
        }
    }

    fn keyspace(alias: &str) -> Self {
        Self::default().with_keyspace(alias.to_string())
    }

    /// This scope with `alias` visible and owning unknown identifiers.
    fn with_keyspace(&self, alias: String) -> Self {
        let mut allowed = self.allowed.clone();
        allowed.insert(alias.clone());
        Self {
            allowed,
            keyspace: Some(alias),
        }
    }

    /// The names of this scope without its keyspace.
    fn nested(&self) -> Self {
        Self {
            allowed: self.allowed.clone(),
            keyspace: None,
        }
    }

    fn bind(&mut self, binding: &mut Binding) -> Result<(), FormalizeError> {
        if self.allowed.contains(&binding.variable) {
            return Err(FormalizeError::DuplicateVariable(binding.variable.clone()));
        }
        self.expr(&mut binding.expr)?;
        self.allowed.insert(binding.variable.clone());
        Ok(())
    }

    fn expr(&self, expr: &mut Expr) -> Result<(), FormalizeError> {
        match expr {
            Expr::Identifier {
                name,
                case_insensitive,
            } => {
                if self.allowed.contains(name.as_str()) {
                    return Ok(());
                }
                let Some(keyspace) = &self.keyspace else {
                    return Err(FormalizeError::AmbiguousReference(name.clone()));
                };
                let field = Expr::Field {
                    target: Box::new(Expr::identifier(keyspace.clone())),
                    name: mem::take(name),
                    case_insensitive: *case_insensitive,
                };
                *expr = field;
                Ok(())
            }
            Expr::Collection(collection) => {
                let mut inner = self.clone();
                for binding in &mut collection.bindings {
                    inner.bind(binding)?;
                }
                inner.expr(&mut collection.body)?;
                if let Some(when) = &mut collection.when {
                    inner.expr(when)?;
                }
                Ok(())
            }
            Expr::Subquery(select) => self.select(select),
            _ => expr
                .children_mut()
                .into_iter()
                .try_for_each(|child| self.expr(child)),
        }
    }

    fn projection(&self, projection: &mut Projection) -> Result<(), FormalizeError> {
        for term in &mut projection.terms {
            match term {
                ResultTerm::Wildcard => {}
                ResultTerm::QualifiedWildcard(expr) | ResultTerm::Expr { expr, .. } => {
                    self.expr(expr)?;
                }
            }
        }
        Ok(())
    }

    /// Formalizes a full SELECT whose enclosing scope is `self`.
    fn select(&self, select: &mut Select) -> Result<(), FormalizeError> {
        let first = self.body(&mut select.body)?;
        let order = match &select.body {
            SelectBody::Subselect(sub) => {
                let mut order = first;
                order.allowed.extend(sub.projection.terms.iter().filter_map(|term| match term {
                    ResultTerm::Expr {
                        alias: Some(alias), ..
                    } => Some(alias.clone()),
                    _ => None,
                }));
                order
            }
            // A set operation is ordered by its result names only.
            SelectBody::SetOp { .. } => {
                let mut order = self.nested();
                order.allowed.extend(select.first().projection.terms.iter().filter_map(
                    |term| match term {
                        ResultTerm::Expr { expr, alias } => {
                            alias.as_deref().or_else(|| implicit_name(expr)).map(String::from)
                        }
                        _ => None,
                    },
                ));
                order
            }
        };
        for term in &mut select.order_by {
            order.expr(&mut term.expr)?;
        }
        if let Some(limit) = &mut select.limit {
            self.expr(limit)?;
        }
        if let Some(offset) = &mut select.offset {
            self.expr(offset)?;
        }
        Ok(())
    }

    /// Formalizes every subselect of a body and returns the scope of the
    /// first one.
    fn body(&self, body: &mut SelectBody) -> Result<Self, FormalizeError> {
        match body {
            SelectBody::Subselect(sub) => self.subselect(sub),
            SelectBody::SetOp { left, right, .. } => {
                let first = self.body(left)?;
                self.subselect(right)?;
                Ok(first)
            }
        }
    }

    fn subselect(&self, sub: &mut Subselect) -> Result<Self, FormalizeError> {
        let mut scope = match &mut sub.from {
            Some(from) => self.from_term(from, &mut HashSet::new())?,
            None => self.nested(),
        };
        for binding in &mut sub.let_bindings {
            scope.bind(binding)?;
        }
        if let Some(condition) = &mut sub.where_clause {
            scope.expr(condition)?;
        }
        if let Some(group) = &mut sub.group_by {
            for key in &mut group.keys {
                scope.expr(key)?;
            }
            for binding in &mut group.letting {
                scope.bind(binding)?;
            }
            if let Some(having) = &mut group.having {
                scope.expr(having)?;
            }
        }
        scope.projection(&mut sub.projection)?;
        Ok(scope)
    }

    /// Formalizes a FROM term. `seen` holds the aliases of this FROM
    /// clause; names of enclosing queries may be shadowed.
    fn from_term(
        &self,
        term: &mut FromTerm,
        seen: &mut HashSet<String>,
    ) -> Result<Self, FormalizeError> {
        match term {
            FromTerm::Keyspace(keyspace) => {
                if let Some(keys) = &mut keyspace.keys {
                    self.expr(keys)?;
                }
                let alias = keyspace.alias().to_string();
                seen.insert(alias.clone());
                Ok(self.with_keyspace(alias))
            }
            FromTerm::Subquery { query, alias } => {
                Self::default().select(query)?;
                seen.insert(alias.clone());
                Ok(self.with_keyspace(alias.clone()))
            }
            FromTerm::Join {
                left,
                right,
                on_keys,
                ..
            } => self.join("JOIN", left, right, on_keys, seen),
            FromTerm::Nest {
                left,
                right,
                on_keys,
                ..
            } => self.join("NEST", left, right, on_keys, seen),
            FromTerm::Unnest {
                left, expr, alias, ..
            } => {
                let mut scope = self.from_term(left, seen)?;
                scope.expr(expr)?;
                let name = alias
                    .as_deref()
                    .or_else(|| implicit_name(expr))
                    .ok_or(FormalizeError::MissingAlias)?
                    .to_string();
                if !seen.insert(name.clone()) {
                    return Err(FormalizeError::DuplicateAlias {
                        kind: "UNNEST",
                        alias: name,
                    });
                }
                scope.keyspace = None;
                scope.allowed.insert(name);
                Ok(scope)
            }
        }
    }

    fn join(
        &self,
        kind: &'static str,
        left: &mut FromTerm,
        right: &mut KeyspaceTerm,
        on_keys: &mut Expr,
        seen: &mut HashSet<String>,
    ) -> Result<Self, FormalizeError> {
        let mut scope = self.from_term(left, seen)?;
        scope.keyspace = None;
        scope.expr(on_keys)?;
        if let Some(keys) = &mut right.keys {
            scope.expr(keys)?;
        }
        let alias = right.alias().to_string();
        if !seen.insert(alias.clone()) {
            return Err(FormalizeError::DuplicateAlias { kind, alias });
        }
        scope.allowed.insert(alias);
        Ok(scope)
    }
}

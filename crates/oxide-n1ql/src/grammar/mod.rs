//! The N1QL grammar and its LALR(1) tables.
//!
//! Rules are plain data ([`Rule`]) paired with a semantic action. The tables
//! are compiled from them on first use and cached for the process lifetime.

pub(crate) mod actions;
mod lalr;
mod n1ql;
mod table;
mod terminal;
pub(crate) mod value;

use std::sync::OnceLock;

pub use lalr::{GrammarError, build};
pub use table::{Action, Conflicts, GrammarTable, Production};
pub use terminal::Terminal;

pub(crate) use actions::ActionFn;

/// Associativity of a precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}

/// One grammar production with its semantic action.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Left-hand side nonterminal (lower case).
    pub lhs: &'static str,
    /// Right-hand side symbols. Upper case names and `error` are terminals.
    pub rhs: &'static [&'static str],
    /// Explicit precedence tag (`%prec`).
    pub prec: Option<&'static str>,
    pub(crate) action: ActionFn,
}

impl Rule {
    pub(crate) const fn new(
        lhs: &'static str,
        rhs: &'static [&'static str],
        action: ActionFn,
    ) -> Self {
        Self {
            lhs,
            rhs,
            prec: None,
            action,
        }
    }

    /// Overrides the precedence of this rule.
    #[must_use]
    pub(crate) const fn prec(mut self, tag: &'static str) -> Self {
        self.prec = Some(tag);
        self
    }
}

impl core::fmt::Debug for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:", self.lhs)?;
        for sym in self.rhs {
            write!(f, " {sym}")?;
        }
        if let Some(tag) = self.prec {
            write!(f, " %prec {tag}")?;
        }
        Ok(())
    }
}

/// A complete grammar definition.
#[derive(Debug, Clone, Copy)]
pub struct Grammar {
    /// Identifies the grammar revision the tables are built from.
    pub version: &'static str,
    /// Start nonterminal.
    pub start: &'static str,
    /// Productions, numbered from 1 in table order.
    pub rules: &'static [Rule],
    /// Precedence levels, lowest first.
    pub precedence: &'static [(Assoc, &'static [&'static str])],
    /// Terminal names indexed by terminal id.
    pub terminals: fn() -> Vec<&'static str>,
    /// Id of the `error` terminal.
    pub error_terminal: usize,
    /// Id of the end-of-input terminal.
    pub end_terminal: usize,
}

/// Returns the N1QL grammar definition.
#[must_use]
pub fn n1ql_grammar() -> &'static Grammar {
    &n1ql::GRAMMAR
}

/// Returns the compiled N1QL tables, building them on first call.
///
/// # Errors
///
/// Returns the build error if the grammar definition is inconsistent.
pub fn n1ql_table() -> Result<&'static GrammarTable, &'static GrammarError> {
    static TABLE: OnceLock<Result<GrammarTable, GrammarError>> = OnceLock::new();
    TABLE.get_or_init(|| build(&n1ql::GRAMMAR)).as_ref()
}

/// Semantic action of production `id` (production 0 is the augmented start
/// rule and has none).
pub(crate) fn n1ql_action(id: usize) -> Option<ActionFn> {
    id.checked_sub(1)
        .and_then(|i| n1ql::GRAMMAR.rules.get(i))
        .map(|rule| rule.action)
}

//! Immutable LALR(1) parse tables.
//!
//! Built once by [`super::lalr::build`] and shared by every parse session.

/// What the driver does for a state and lookahead terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Push the lookahead and move to the given state.
    Shift(usize),
    /// Reduce by the given production.
    Reduce(usize),
    /// The input is complete.
    Accept,
    /// Syntax error.
    Error,
}

/// Length and left-hand side of a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Production {
    /// Nonterminal id of the left-hand side.
    pub lhs: usize,
    /// Number of right-hand side symbols.
    pub len: usize,
}

/// Conflicts met while building the tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conflicts {
    /// Shift/reduce conflicts not settled by precedence.
    pub shift_reduce: usize,
    /// Reduce/reduce conflicts.
    pub reduce_reduce: usize,
}

/// The compiled parse tables of one grammar.
#[derive(Debug, Clone)]
pub struct GrammarTable {
    /// Explicit actions per state, sorted by terminal id.
    pub(crate) actions: Vec<Vec<(usize, Action)>>,
    /// Explicit errors per state (non-associative operators), consulted
    /// before anything else.
    pub(crate) exceptions: Vec<Vec<(usize, Action)>>,
    /// Reduction taken when a state has no explicit action.
    pub(crate) defaults: Vec<Option<usize>>,
    /// Goto entries per state, sorted by nonterminal id.
    pub(crate) gotos: Vec<Vec<(usize, usize)>>,
    pub(crate) productions: Vec<Production>,
    pub(crate) terminals: Vec<&'static str>,
    pub(crate) nonterminals: Vec<&'static str>,
    pub(crate) error_terminal: usize,
    pub(crate) conflicts: Conflicts,
    pub(crate) version: &'static str,
}

fn lookup<T: Copy>(row: &[(usize, T)], key: usize) -> Option<T> {
    row.binary_search_by_key(&key, |&(k, _)| k)
        .ok()
        .map(|i| row[i].1)
}

impl GrammarTable {
    /// Action for `state` on `terminal`: exceptions first, then the explicit
    /// row, then the state's default reduction.
    #[must_use]
    pub fn action(&self, state: usize, terminal: usize) -> Action {
        if let Some(action) = self.exceptions.get(state).and_then(|r| lookup(r, terminal)) {
            return action;
        }
        if let Some(action) = self.actions.get(state).and_then(|r| lookup(r, terminal)) {
            return action;
        }
        self.default_reduction(state)
            .map_or(Action::Error, Action::Reduce)
    }

    /// Default reduction of `state`, if any.
    #[must_use]
    pub fn default_reduction(&self, state: usize) -> Option<usize> {
        self.defaults.get(state).copied().flatten()
    }

    /// The reduction a state takes without looking at the next token: the
    /// state has a default reduction and no explicit entry at all.
    #[must_use]
    pub fn sole_reduction(&self, state: usize) -> Option<usize> {
        let bare = self.actions.get(state).is_some_and(Vec::is_empty)
            && self.exceptions.get(state).is_some_and(Vec::is_empty);
        if bare {
            self.default_reduction(state)
        } else {
            None
        }
    }

    /// Target state if `state` shifts the `error` terminal.
    #[must_use]
    pub fn error_shift(&self, state: usize) -> Option<usize> {
        match self
            .actions
            .get(state)
            .and_then(|r| lookup(r, self.error_terminal))
        {
            Some(Action::Shift(next)) => Some(next),
            _ => None,
        }
    }

    /// Goto target after reducing to `nonterminal` in `state`.
    #[must_use]
    pub fn goto(&self, state: usize, nonterminal: usize) -> Option<usize> {
        self.gotos.get(state).and_then(|r| lookup(r, nonterminal))
    }

    /// The production with the given id.
    #[must_use]
    pub fn production(&self, id: usize) -> Option<Production> {
        self.productions.get(id).copied()
    }

    /// Display name of a terminal.
    #[must_use]
    pub fn terminal_name(&self, id: usize) -> &'static str {
        self.terminals.get(id).copied().unwrap_or("?")
    }

    /// Display name of a nonterminal.
    #[must_use]
    pub fn nonterminal_name(&self, id: usize) -> &'static str {
        self.nonterminals.get(id).copied().unwrap_or("?")
    }

    /// Number of parser states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    /// Number of productions, including the augmented start production.
    #[must_use]
    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    /// Revision of the grammar these tables were compiled from.
    #[must_use]
    pub const fn version(&self) -> &'static str {
        self.version
    }

    /// Conflicts met while building.
    #[must_use]
    pub const fn conflicts(&self) -> Conflicts {
        self.conflicts
    }
}

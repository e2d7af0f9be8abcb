//! LALR(1) table construction.
//!
//! Builds the LR(0) automaton, computes lookaheads by spontaneous generation
//! and propagation, then fills the action rows. Shift/reduce conflicts are
//! settled by operator precedence the way yacc does; anything left over
//! shifts (shift/reduce) or takes the earlier production (reduce/reduce),
//! and is counted in [`Conflicts`].

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::debug;

use super::table::{Action, Conflicts, GrammarTable, Production};
use super::{Assoc, Grammar};

/// Errors in a grammar definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrammarError {
    /// A rule mentions a name that is neither a terminal nor a nonterminal.
    #[error("unknown symbol '{symbol}' in a rule for '{lhs}'")]
    UnknownSymbol {
        lhs: &'static str,
        symbol: &'static str,
    },

    /// A `%prec` tag that names no precedence level.
    #[error("unknown precedence tag '{0}'")]
    UnknownPrecedence(&'static str),

    /// The start symbol has no productions.
    #[error("start symbol '{0}' has no productions")]
    MissingStart(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Sym {
    T(usize),
    N(usize),
}

#[derive(Debug, Clone, Copy)]
struct Prec {
    level: usize,
    assoc: Assoc,
}

struct Prod {
    lhs: usize,
    rhs: Vec<Sym>,
    prec: Option<Prec>,
}

/// `(production, dot position)`
type Item = (usize, usize);

/// Fixed-width bitset over terminal ids.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TermSet(Vec<u64>);

impl TermSet {
    fn new(width: usize) -> Self {
        Self(vec![0; width.div_ceil(64)])
    }

    fn insert(&mut self, t: usize) -> bool {
        let bit = 1u64 << (t % 64);
        let word = &mut self.0[t / 64];
        let added = *word & bit == 0;
        *word |= bit;
        added
    }

    fn contains(&self, t: usize) -> bool {
        self.0[t / 64] & (1u64 << (t % 64)) != 0
    }

    fn union_with(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            let merged = *a | *b;
            if merged != *a {
                *a = merged;
                changed = true;
            }
        }
        changed
    }

    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().flat_map(|(w, &word)| {
            (0..64)
                .filter(move |b| word & (1u64 << b) != 0)
                .map(move |b| w * 64 + b)
        })
    }
}

struct State {
    kernel: Vec<Item>,
    transitions: BTreeMap<Sym, usize>,
}

enum Resolution {
    Shift,
    Reduce,
    Error,
    Unresolved,
}

struct Builder {
    prods: Vec<Prod>,
    by_lhs: Vec<Vec<usize>>,
    term_prec: Vec<Option<Prec>>,
    nullable: Vec<bool>,
    first: Vec<TermSet>,
    /// Bit width of lookahead sets: every terminal plus the propagation marker.
    width: usize,
    /// The propagation marker (`#`).
    marker: usize,
}

/// Compiles a grammar into LALR(1) tables.
///
/// # Errors
///
/// Returns an error if a rule refers to an unknown symbol or precedence tag,
/// or if the start symbol has no productions.
pub fn build(grammar: &Grammar) -> Result<GrammarTable, GrammarError> {
    let terminals = (grammar.terminals)();
    let term_ids: HashMap<&str, usize> = terminals
        .iter()
        .enumerate()
        .map(|(id, name)| (*name, id))
        .collect();

    let mut nonterminals = vec!["$accept"];
    let mut nt_ids: HashMap<&str, usize> = HashMap::from([("$accept", 0)]);
    for rule in grammar.rules {
        nt_ids.entry(rule.lhs).or_insert_with(|| {
            nonterminals.push(rule.lhs);
            nonterminals.len() - 1
        });
    }

    let mut levels: HashMap<&str, Prec> = HashMap::new();
    for (i, (assoc, names)) in grammar.precedence.iter().enumerate() {
        for name in *names {
            levels.insert(
                name,
                Prec {
                    level: i + 1,
                    assoc: *assoc,
                },
            );
        }
    }
    let mut term_prec = vec![None; terminals.len()];
    for (name, prec) in &levels {
        if let Some(&t) = term_ids.get(name) {
            term_prec[t] = Some(*prec);
        }
    }

    let start = nt_ids
        .get(grammar.start)
        .copied()
        .ok_or(GrammarError::MissingStart(grammar.start))?;

    let mut prods = vec![Prod {
        lhs: 0,
        rhs: vec![Sym::N(start)],
        prec: None,
    }];
    for rule in grammar.rules {
        let unknown = |symbol| GrammarError::UnknownSymbol {
            lhs: rule.lhs,
            symbol,
        };
        let lhs = nt_ids.get(rule.lhs).copied().ok_or(unknown(rule.lhs))?;
        let rhs = rule
            .rhs
            .iter()
            .map(|&name| {
                term_ids
                    .get(name)
                    .map(|&t| Sym::T(t))
                    .or_else(|| nt_ids.get(name).map(|&n| Sym::N(n)))
                    .ok_or(unknown(name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let prec = match rule.prec {
            Some(tag) => Some(
                levels
                    .get(tag)
                    .copied()
                    .ok_or(GrammarError::UnknownPrecedence(tag))?,
            ),
            None => rhs.iter().rev().find_map(|sym| match sym {
                Sym::T(t) => term_prec[*t],
                Sym::N(_) => None,
            }),
        };
        prods.push(Prod { lhs, rhs, prec });
    }

    let mut by_lhs = vec![Vec::new(); nonterminals.len()];
    for (id, prod) in prods.iter().enumerate() {
        by_lhs[prod.lhs].push(id);
    }

    let width = terminals.len() + 1;
    let mut builder = Builder {
        prods,
        by_lhs,
        term_prec,
        nullable: vec![false; nonterminals.len()],
        first: vec![TermSet::new(width); nonterminals.len()],
        width,
        marker: terminals.len(),
    };
    builder.compute_first();

    let states = builder.lr0_states();
    let lookaheads = builder.lookaheads(&states, grammar.end_terminal);

    let mut actions = Vec::with_capacity(states.len());
    let mut exceptions = Vec::with_capacity(states.len());
    let mut defaults = Vec::with_capacity(states.len());
    let mut gotos = Vec::with_capacity(states.len());
    let mut conflicts = Conflicts::default();

    for (s, state) in states.iter().enumerate() {
        let mut row = builder.action_row(s, state, &lookaheads[s], grammar, &mut conflicts, &terminals);

        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for action in row.values() {
            if let Action::Reduce(p) = action {
                *counts.entry(*p).or_default() += 1;
            }
        }
        let default = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&p, _)| p);
        if let Some(p) = default {
            row.retain(|_, action| *action != Action::Reduce(p));
        }

        let (errors, rest): (Vec<_>, Vec<_>) = row
            .into_iter()
            .partition(|(_, action)| *action == Action::Error);
        actions.push(rest);
        exceptions.push(errors);
        defaults.push(default);
        gotos.push(
            state
                .transitions
                .iter()
                .filter_map(|(sym, &target)| match sym {
                    Sym::N(n) => Some((*n, target)),
                    Sym::T(_) => None,
                })
                .collect(),
        );
    }

    debug!(
        version = grammar.version,
        states = states.len(),
        productions = builder.prods.len(),
        shift_reduce = conflicts.shift_reduce,
        reduce_reduce = conflicts.reduce_reduce,
        "built LALR tables"
    );

    Ok(GrammarTable {
        actions,
        exceptions,
        defaults,
        gotos,
        productions: builder
            .prods
            .iter()
            .map(|p| Production {
                lhs: p.lhs,
                len: p.rhs.len(),
            })
            .collect(),
        terminals,
        nonterminals,
        error_terminal: grammar.error_terminal,
        conflicts,
        version: grammar.version,
    })
}

impl Builder {
    fn compute_first(&mut self) {
        loop {
            let mut changed = false;
            for prod in &self.prods {
                let lhs = prod.lhs;
                let mut all_nullable = true;
                for sym in &prod.rhs {
                    match *sym {
                        Sym::T(t) => {
                            changed |= self.first[lhs].insert(t);
                            all_nullable = false;
                        }
                        Sym::N(n) => {
                            if n != lhs {
                                let inner = self.first[n].clone();
                                changed |= self.first[lhs].union_with(&inner);
                            }
                            all_nullable = self.nullable[n];
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Adds FIRST of `syms` to `out`; returns whether `syms` is nullable.
    fn first_of_seq(&self, syms: &[Sym], out: &mut TermSet) -> bool {
        for sym in syms {
            match *sym {
                Sym::T(t) => {
                    out.insert(t);
                    return false;
                }
                Sym::N(n) => {
                    out.union_with(&self.first[n]);
                    if !self.nullable[n] {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn lr0_closure(&self, kernel: &[Item]) -> Vec<Item> {
        let mut items = kernel.to_vec();
        let mut added = vec![false; self.by_lhs.len()];
        let mut i = 0;
        while i < items.len() {
            let (p, dot) = items[i];
            if let Some(&Sym::N(n)) = self.prods[p].rhs.get(dot) {
                if !added[n] {
                    added[n] = true;
                    items.extend(self.by_lhs[n].iter().map(|&q| (q, 0)));
                }
            }
            i += 1;
        }
        items
    }

    fn lr1_closure(&self, seed: Vec<(Item, TermSet)>) -> Vec<(Item, TermSet)> {
        let mut items = seed;
        let mut index: HashMap<Item, usize> = items
            .iter()
            .enumerate()
            .map(|(i, (item, _))| (*item, i))
            .collect();
        let mut work: Vec<usize> = (0..items.len()).collect();

        while let Some(i) = work.pop() {
            let (p, dot) = items[i].0;
            let Some(&Sym::N(n)) = self.prods[p].rhs.get(dot) else {
                continue;
            };
            let mut follow = TermSet::new(self.width);
            if self.first_of_seq(&self.prods[p].rhs[dot + 1..], &mut follow) {
                follow.union_with(&items[i].1);
            }
            for &q in &self.by_lhs[n] {
                match index.get(&(q, 0)) {
                    Some(&j) => {
                        if items[j].1.union_with(&follow) {
                            work.push(j);
                        }
                    }
                    None => {
                        index.insert((q, 0), items.len());
                        work.push(items.len());
                        items.push(((q, 0), follow.clone()));
                    }
                }
            }
        }
        items
    }

    fn lr0_states(&self) -> Vec<State> {
        let mut states = vec![State {
            kernel: vec![(0, 0)],
            transitions: BTreeMap::new(),
        }];
        let mut index: HashMap<Vec<Item>, usize> = HashMap::from([(vec![(0, 0)], 0)]);

        let mut i = 0;
        while i < states.len() {
            let mut moves: BTreeMap<Sym, Vec<Item>> = BTreeMap::new();
            for (p, dot) in self.lr0_closure(&states[i].kernel) {
                if let Some(&sym) = self.prods[p].rhs.get(dot) {
                    moves.entry(sym).or_default().push((p, dot + 1));
                }
            }
            for (sym, mut kernel) in moves {
                kernel.sort_unstable();
                kernel.dedup();
                let target = if let Some(&t) = index.get(&kernel) {
                    t
                } else {
                    let t = states.len();
                    index.insert(kernel.clone(), t);
                    states.push(State {
                        kernel,
                        transitions: BTreeMap::new(),
                    });
                    t
                };
                states[i].transitions.insert(sym, target);
            }
            i += 1;
        }
        states
    }

    /// Lookahead sets for every kernel item of every state.
    fn lookaheads(&self, states: &[State], end: usize) -> Vec<Vec<TermSet>> {
        let mut la: Vec<Vec<TermSet>> = states
            .iter()
            .map(|s| vec![TermSet::new(self.width); s.kernel.len()])
            .collect();
        let mut links: Vec<Vec<Vec<(usize, usize)>>> = states
            .iter()
            .map(|s| vec![Vec::new(); s.kernel.len()])
            .collect();
        la[0][0].insert(end);

        for (s, state) in states.iter().enumerate() {
            for (k, &item) in state.kernel.iter().enumerate() {
                let mut probe = TermSet::new(self.width);
                probe.insert(self.marker);
                for ((p, dot), set) in self.lr1_closure(vec![(item, probe)]) {
                    let Some(sym) = self.prods[p].rhs.get(dot) else {
                        continue;
                    };
                    let Some(&target) = state.transitions.get(sym) else {
                        continue;
                    };
                    let Ok(tk) = states[target].kernel.binary_search(&(p, dot + 1)) else {
                        continue;
                    };
                    for t in set.iter() {
                        if t == self.marker {
                            links[s][k].push((target, tk));
                        } else {
                            la[target][tk].insert(t);
                        }
                    }
                }
            }
        }

        loop {
            let mut changed = false;
            for (s, per_item) in links.iter().enumerate() {
                for (k, targets) in per_item.iter().enumerate() {
                    if targets.is_empty() {
                        continue;
                    }
                    let source = la[s][k].clone();
                    for &(ts, tk) in targets {
                        changed |= la[ts][tk].union_with(&source);
                    }
                }
            }
            if !changed {
                break;
            }
        }
        la
    }

    fn resolve(&self, prod: usize, terminal: usize) -> Resolution {
        match (self.prods[prod].prec, self.term_prec[terminal]) {
            (Some(rule), Some(token)) => {
                if rule.level > token.level {
                    Resolution::Reduce
                } else if rule.level < token.level {
                    Resolution::Shift
                } else {
                    match token.assoc {
                        Assoc::Left => Resolution::Reduce,
                        Assoc::Right => Resolution::Shift,
                        Assoc::Nonassoc => Resolution::Error,
                    }
                }
            }
            _ => Resolution::Unresolved,
        }
    }

    fn action_row(
        &self,
        s: usize,
        state: &State,
        kernel_la: &[TermSet],
        grammar: &Grammar,
        conflicts: &mut Conflicts,
        terminals: &[&'static str],
    ) -> BTreeMap<usize, Action> {
        let seed = state
            .kernel
            .iter()
            .zip(kernel_la)
            .map(|(&item, set)| (item, set.clone()))
            .collect();

        let mut row: BTreeMap<usize, Action> = BTreeMap::new();
        let mut reduces: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for ((p, dot), set) in self.lr1_closure(seed) {
            match self.prods[p].rhs.get(dot) {
                Some(&Sym::T(t)) => {
                    if let Some(&target) = state.transitions.get(&Sym::T(t)) {
                        row.insert(t, Action::Shift(target));
                    }
                }
                Some(&Sym::N(_)) => {}
                None if p == 0 => {
                    if set.contains(grammar.end_terminal) {
                        row.insert(grammar.end_terminal, Action::Accept);
                    }
                }
                None => {
                    for t in set.iter().filter(|&t| t != self.marker) {
                        reduces.entry(t).or_default().push(p);
                    }
                }
            }
        }

        for (t, mut prods) in reduces {
            prods.sort_unstable();
            prods.dedup();
            let name = terminals.get(t).copied().unwrap_or("?");
            if prods.len() > 1 {
                conflicts.reduce_reduce += prods.len() - 1;
                debug!(state = s, terminal = name, ?prods, "reduce/reduce conflict");
            }
            let p = prods[0];
            match row.get(&t) {
                None => {
                    row.insert(t, Action::Reduce(p));
                }
                Some(Action::Shift(_)) => match self.resolve(p, t) {
                    Resolution::Shift => {}
                    Resolution::Reduce => {
                        row.insert(t, Action::Reduce(p));
                    }
                    Resolution::Error => {
                        row.insert(t, Action::Error);
                    }
                    Resolution::Unresolved => {
                        conflicts.shift_reduce += 1;
                        debug!(state = s, terminal = name, production = p, "shift/reduce conflict");
                    }
                },
                Some(_) => {
                    conflicts.reduce_reduce += 1;
                    debug!(state = s, terminal = name, production = p, "accept/reduce conflict");
                }
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Rule;
    use crate::grammar::actions::pass;

    fn terminals() -> Vec<&'static str> {
        vec!["$end", "error", "INT", "PLUS", "STAR", "LPAREN", "RPAREN"]
    }

    static ARITH_RULES: &[Rule] = &[
        Rule::new("e", &["e", "PLUS", "e"], pass),
        Rule::new("e", &["e", "STAR", "e"], pass),
        Rule::new("e", &["LPAREN", "e", "RPAREN"], pass),
        Rule::new("e", &["INT"], pass),
        Rule::new("e", &["error"], pass),
    ];

    fn grammar(precedence: &'static [(Assoc, &'static [&'static str])]) -> Grammar {
        Grammar {
            version: "test",
            start: "e",
            rules: ARITH_RULES,
            precedence,
            terminals,
            error_terminal: 1,
            end_terminal: 0,
        }
    }

    #[test]
    fn test_precedence_resolves_conflicts() {
        let table = build(&grammar(&[(Assoc::Left, &["PLUS"]), (Assoc::Left, &["STAR"])]));
        let table = table.unwrap();
        assert_eq!(table.conflicts(), Conflicts::default());
        // $accept and the five rules
        assert_eq!(table.production_count(), 6);
    }

    #[test]
    fn test_unresolved_conflicts_are_counted() {
        let table = build(&grammar(&[])).unwrap();
        // e + e . + / e + e . * / e * e . + / e * e . *
        assert_eq!(table.conflicts().shift_reduce, 4);
        assert_eq!(table.conflicts().reduce_reduce, 0);
    }

    #[test]
    fn test_accept_on_end() {
        let table = build(&grammar(&[(Assoc::Left, &["PLUS", "STAR"])])).unwrap();
        // state 0 shifts INT; after reducing to e the goto state accepts.
        let Action::Shift(_) = table.action(0, 2) else {
            panic!("state 0 should shift INT");
        };
        let after_e = table.goto(0, 1).unwrap();
        assert_eq!(table.action(after_e, 0), Action::Accept);
        assert!(table.error_shift(0).is_some());
    }

    #[test]
    fn test_nonassoc_produces_error_entry() {
        static RULES: &[Rule] = &[
            Rule::new("e", &["e", "PLUS", "e"], pass),
            Rule::new("e", &["INT"], pass),
        ];
        let g = Grammar {
            version: "test",
            start: "e",
            rules: RULES,
            precedence: &[(Assoc::Nonassoc, &["PLUS"])],
            terminals,
            error_terminal: 1,
            end_terminal: 0,
        };
        let table = build(&g).unwrap();
        assert_eq!(table.conflicts(), Conflicts::default());
        let has_error = (0..table.state_count()).any(|s| table.action(s, 3) == Action::Error
            && table.default_reduction(s).is_some());
        assert!(has_error);
    }

    #[test]
    fn test_unknown_symbol() {
        static RULES: &[Rule] = &[Rule::new("e", &["NOPE"], pass)];
        let g = Grammar {
            version: "test",
            start: "e",
            rules: RULES,
            precedence: &[],
            terminals,
            error_terminal: 1,
            end_terminal: 0,
        };
        assert_eq!(
            build(&g).unwrap_err(),
            GrammarError::UnknownSymbol {
                lhs: "e",
                symbol: "NOPE"
            }
        );
    }

    #[test]
    fn test_unknown_precedence_tag() {
        static RULES: &[Rule] = &[Rule::new("e", &["INT"], pass).prec("UMINUS")];
        let g = Grammar {
            version: "test",
            start: "e",
            rules: RULES,
            precedence: &[],
            terminals,
            error_terminal: 1,
            end_terminal: 0,
        };
        assert_eq!(
            build(&g).unwrap_err(),
            GrammarError::UnknownPrecedence("UMINUS")
        );
    }

    #[test]
    fn test_nullable_rules() {
        static RULES: &[Rule] = &[
            Rule::new("list", &[], pass),
            Rule::new("list", &["list", "INT"], pass),
        ];
        let g = Grammar {
            version: "test",
            start: "list",
            rules: RULES,
            precedence: &[],
            terminals,
            error_terminal: 1,
            end_terminal: 0,
        };
        let table = build(&g).unwrap();
        assert_eq!(table.conflicts(), Conflicts::default());
        // Empty input reduces the empty list without reading past $end.
        assert_eq!(table.action(0, 0), Action::Reduce(1));
    }
}

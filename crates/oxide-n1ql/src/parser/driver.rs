//! Table-driven shift-reduce driver.
//!
//! Runs any [`GrammarTable`] over a [`TokenSource`]. Semantic values live on
//! the same stack as states; what they are and how they combine is up to
//! the [`Reducer`]. Error recovery follows yacc: after a syntax error the
//! stack is unwound to the nearest state that shifts `error`, and three
//! tokens must be shifted before another error is reported.

use std::backtrace::Backtrace;

use thiserror::Error;
use tracing::{debug, trace, warn};

use super::guard;
use super::report::Reporter;
use crate::grammar::{Action, GrammarTable, Terminal};
use crate::lexer::{Span, Token, TokenSource};

/// Tokens that must shift cleanly before the next error is reported.
const RECOVERY_SHIFTS: u8 = 3;

/// A semantic action could not build its value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionFault {
    /// A value of the wrong shape was found on the stack.
    #[error("expected {expected} on the value stack, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// An action read past the values of its production.
    #[error("value {0} is missing from the value stack")]
    Missing(usize),

    /// The production has no action.
    #[error("no semantic action for production {0}")]
    NoAction(usize),
}

/// Builds semantic values for a grammar.
pub trait Reducer {
    /// The semantic value type.
    type Value;

    /// Value pushed for a shifted token.
    fn shift_value(&mut self, token: Token) -> Self::Value;

    /// Value pushed for the `error` pseudo-token and the stack bottom.
    fn empty_value(&mut self) -> Self::Value;

    /// Runs the action of `production` over its right-hand side values.
    ///
    /// # Errors
    ///
    /// Returns a fault when the values do not have the expected shape.
    fn reduce(
        &mut self,
        production: usize,
        values: Vec<Self::Value>,
        span: Span,
        reporter: &mut Reporter<'_>,
    ) -> Result<Self::Value, ActionFault>;

    /// Called for each value popped without being reduced: during error
    /// recovery and when the parse is abandoned.
    fn discard(&mut self, value: Self::Value) {
        drop(value);
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum Outcome<V> {
    /// The start symbol was reduced; this is its value.
    Accepted(V),
    /// The parse was abandoned.
    Aborted,
}

struct Frame<V> {
    state: usize,
    value: V,
    span: Span,
}

/// The parser state for one run over one token stream.
pub struct Driver<'t, V> {
    table: &'t GrammarTable,
    stack: Vec<Frame<V>>,
    lookahead: Option<(usize, Token)>,
    /// Shifts left before errors are reported again.
    errflag: u8,
    max_depth: usize,
}

impl<'t, V> Driver<'t, V> {
    /// Creates a driver whose stack may hold at most `max_depth` entries.
    #[must_use]
    pub fn new(table: &'t GrammarTable, max_depth: usize) -> Self {
        Self {
            table,
            stack: Vec::new(),
            lookahead: None,
            errflag: 0,
            max_depth,
        }
    }

    /// Parses the whole token stream.
    pub fn run<S, R>(
        &mut self,
        tokens: &mut S,
        reducer: &mut R,
        reporter: &mut Reporter<'_>,
    ) -> Outcome<V>
    where
        S: TokenSource,
        R: Reducer<Value = V>,
    {
        self.stack.clear();
        self.lookahead = None;
        self.errflag = 0;
        let bottom = reducer.empty_value();
        self.stack.push(Frame {
            state: 0,
            value: bottom,
            span: Span::default(),
        });

        loop {
            let state = self.top_state();
            let action = match self.table.sole_reduction(state) {
                Some(production) => Action::Reduce(production),
                None => {
                    let terminal = self.peek(tokens);
                    self.table.action(state, terminal)
                }
            };

            match action {
                Action::Shift(next) => {
                    let Some((terminal, token)) = self.lookahead.take() else {
                        return self.abort(reducer, reporter);
                    };
                    trace!(state, next, token = self.table.terminal_name(terminal), "shift");
                    let span = token.span;
                    let value = reducer.shift_value(token);
                    if !self.push(next, value, span, reducer, reporter) {
                        return self.abort(reducer, reporter);
                    }
                    if self.errflag == 1 {
                        debug!(state = next, "error recovery complete");
                    }
                    self.errflag = self.errflag.saturating_sub(1);
                }
                Action::Reduce(production) => {
                    if !self.reduce(production, reducer, reporter) {
                        return self.abort(reducer, reporter);
                    }
                }
                Action::Accept => {
                    trace!(state, "accept");
                    let Some(top) = self.stack.pop() else {
                        return self.abort(reducer, reporter);
                    };
                    self.drain(reducer);
                    return Outcome::Accepted(top.value);
                }
                Action::Error => {
                    if !self.recover(tokens, reducer, reporter) {
                        return self.abort(reducer, reporter);
                    }
                }
            }
        }
    }

    fn top_state(&self) -> usize {
        self.stack.last().map_or(0, |frame| frame.state)
    }

    fn peek<S: TokenSource>(&mut self, tokens: &mut S) -> usize {
        if let Some((terminal, _)) = &self.lookahead {
            return *terminal;
        }
        let token = tokens.next_token();
        let terminal = Terminal::of(&token.kind).id();
        self.lookahead = Some((terminal, token));
        terminal
    }

    fn push<R: Reducer<Value = V>>(
        &mut self,
        state: usize,
        value: V,
        span: Span,
        reducer: &mut R,
        reporter: &mut Reporter<'_>,
    ) -> bool {
        if self.stack.len() >= self.max_depth {
            warn!(limit = self.max_depth, "parser stack overflow");
            reporter.depth_exceeded(self.max_depth, span);
            reducer.discard(value);
            return false;
        }
        self.stack.push(Frame { state, value, span });
        true
    }

    fn reduce<R: Reducer<Value = V>>(
        &mut self,
        production: usize,
        reducer: &mut R,
        reporter: &mut Reporter<'_>,
    ) -> bool {
        let Some(prod) = self.table.production(production) else {
            fault(reporter, format!("unknown production {production}"), Span::default());
            return false;
        };
        if prod.len >= self.stack.len() {
            fault(
                reporter,
                format!("value stack underflow reducing production {production}"),
                Span::default(),
            );
            return false;
        }

        let frames = self.stack.split_off(self.stack.len() - prod.len);
        let span = frames
            .iter()
            .map(|frame| frame.span)
            .reduce(Span::merge)
            .unwrap_or_else(|| {
                let end = self.stack.last().map_or(0, |frame| frame.span.end);
                Span::new(end, end)
            });
        let values = frames.into_iter().map(|frame| frame.value).collect();
        let lhs = self.table.nonterminal_name(prod.lhs);
        trace!(production, lhs, "reduce");

        let result = guard::contain(|| reducer.reduce(production, values, span, reporter));
        let value = match result {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => {
                fault(
                    reporter,
                    format!("internal error in action for {lhs}: {err}"),
                    span,
                );
                return false;
            }
            Err(caught) => {
                let message = format!("panic in action for {lhs}: {}", caught.message);
                warn!(%message, "semantic action panicked");
                reporter.fault(message, span, caught.trace);
                return false;
            }
        };

        let exposed = self.top_state();
        let Some(next) = self.table.goto(exposed, prod.lhs) else {
            fault(reporter, format!("no goto from state {exposed} on {lhs}"), span);
            reducer.discard(value);
            return false;
        };
        self.push(next, value, span, reducer, reporter)
    }

    /// Handles a syntax error. Returns false if the parse cannot continue.
    fn recover<S, R>(
        &mut self,
        tokens: &mut S,
        reducer: &mut R,
        reporter: &mut Reporter<'_>,
    ) -> bool
    where
        S: TokenSource,
        R: Reducer<Value = V>,
    {
        let Some((terminal, span)) = self.lookahead.as_ref().map(|(t, token)| (*t, token.span))
        else {
            return false;
        };

        if self.errflag == 0 {
            if let Some((_, token)) = &self.lookahead {
                reporter.syntax_error(token, tokens.take_lex_error());
            }
        }

        if self.errflag < RECOVERY_SHIFTS {
            self.errflag = RECOVERY_SHIFTS;
            while let Some(top) = self.stack.last() {
                if let Some(next) = self.table.error_shift(top.state) {
                    debug!(state = top.state, next, "shifting error token");
                    let value = reducer.empty_value();
                    return self.push(next, value, Span::new(span.start, span.start), reducer, reporter);
                }
                if let Some(frame) = self.stack.pop() {
                    trace!(state = frame.state, "error recovery pops state");
                    reducer.discard(frame.value);
                }
            }
            debug!("no state shifts error; giving up");
            return false;
        }

        if terminal == Terminal::End.id() {
            return false;
        }
        trace!(token = self.table.terminal_name(terminal), "error recovery discards token");
        self.lookahead = None;
        true
    }

    fn abort<R: Reducer<Value = V>>(&mut self, reducer: &mut R, reporter: &mut Reporter<'_>) -> Outcome<V> {
        debug!(depth = self.stack.len(), "parse aborted");
        reporter.stop();
        self.drain(reducer);
        self.lookahead = None;
        Outcome::Aborted
    }

    fn drain<R: Reducer<Value = V>>(&mut self, reducer: &mut R) {
        while let Some(frame) = self.stack.pop() {
            reducer.discard(frame.value);
        }
    }
}

fn fault(reporter: &mut Reporter<'_>, message: String, span: Span) {
    warn!(%message, "semantic action fault");
    let trace = Backtrace::force_capture().to_string();
    reporter.fault(message, span, trace);
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::grammar::actions::pass;
    use crate::grammar::{Assoc, Grammar, Rule, build};
    use crate::lexer::{TokenKind, TokenStream};
    use crate::parser::error::DiagnosticKind;

    static RULES: &[Rule] = &[
        Rule::new("e", &["e", "PLUS", "e"], pass),
        Rule::new("e", &["e", "STAR", "e"], pass),
        Rule::new("e", &["LPAREN", "e", "RPAREN"], pass),
        Rule::new("e", &["INT"], pass),
        Rule::new("e", &["error"], pass),
    ];

    static ARITH: Grammar = Grammar {
        version: "test",
        start: "e",
        rules: RULES,
        precedence: &[(Assoc::Left, &["PLUS"]), (Assoc::Left, &["STAR"])],
        terminals: Terminal::names,
        error_terminal: 1,
        end_terminal: 0,
    };

    /// Evaluates as it reduces; production 4 panics when asked to.
    #[derive(Default)]
    struct Calc {
        panic_on_int: bool,
        discarded: usize,
    }

    impl Reducer for Calc {
        type Value = Option<i64>;

        fn shift_value(&mut self, token: Token) -> Option<i64> {
            match token.kind {
                TokenKind::Integer(n) => Some(n),
                _ => None,
            }
        }

        fn empty_value(&mut self) -> Option<i64> {
            None
        }

        fn reduce(
            &mut self,
            production: usize,
            values: Vec<Option<i64>>,
            _span: Span,
            _reporter: &mut Reporter<'_>,
        ) -> Result<Option<i64>, ActionFault> {
            let get = |i: usize| values.get(i).copied().flatten().ok_or(ActionFault::Missing(i));
            Ok(Some(match production {
                1 => get(0)? + get(2)?,
                2 => get(0)? * get(2)?,
                3 => get(1)?,
                4 if self.panic_on_int => panic!("boom"),
                4 => get(0)?,
                5 => 0,
                other => return Err(ActionFault::NoAction(other)),
            }))
        }

        fn discard(&mut self, _value: Option<i64>) {
            self.discarded += 1;
        }
    }

    fn run(source: &str, max_depth: usize, calc: &mut Calc) -> (Outcome<Option<i64>>, Vec<(DiagnosticKind, String)>) {
        let table = build(&ARITH).unwrap();
        let names = HashSet::new();
        let mut tokens = TokenStream::new(source, &names);
        let mut reporter = Reporter::new(source, 40);
        let outcome = Driver::new(&table, max_depth).run(&mut tokens, calc, &mut reporter);
        let diagnostics = reporter
            .finish()
            .into_iter()
            .map(|d| (d.kind, d.message))
            .collect();
        (outcome, diagnostics)
    }

    #[test]
    fn test_precedence() {
        let (outcome, diagnostics) = run("1 + 2 * 3", 200, &mut Calc::default());
        assert!(matches!(outcome, Outcome::Accepted(Some(7))));
        assert!(diagnostics.is_empty());

        let (outcome, _) = run("(1 + 2) * 3", 200, &mut Calc::default());
        assert!(matches!(outcome, Outcome::Accepted(Some(9))));
    }

    #[test]
    fn test_recovers_from_error() {
        let (outcome, diagnostics) = run("1 + * 2", 200, &mut Calc::default());
        assert!(matches!(outcome, Outcome::Accepted(Some(1))));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].1,
            "syntax error - line 1, column 5, near '1 + *', at: *"
        );
    }

    #[test]
    fn test_error_at_end_of_input() {
        let (outcome, diagnostics) = run("1 +", 200, &mut Calc::default());
        assert!(matches!(outcome, Outcome::Accepted(_)));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].1.ends_with("at: end of input"));
    }

    #[test]
    fn test_depth_limit() {
        let mut calc = Calc::default();
        let (outcome, diagnostics) = run("((((((1))))))", 4, &mut calc);
        assert!(matches!(outcome, Outcome::Aborted));
        assert_eq!(
            diagnostics,
            vec![(
                DiagnosticKind::ResourceLimit,
                String::from("parser stack overflow: depth limit 4 exceeded")
            )]
        );
        // the rejected value and the four frames
        assert_eq!(calc.discarded, 5);
    }

    #[test]
    fn test_panicking_action_is_contained() {
        let mut calc = Calc {
            panic_on_int: true,
            ..Calc::default()
        };
        let (outcome, diagnostics) = run("1 + 2", 200, &mut calc);
        assert!(matches!(outcome, Outcome::Aborted));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].0, DiagnosticKind::Fault);
        assert_eq!(diagnostics[0].1, "panic in action for e: boom");
    }

    #[test]
    fn test_malformed_token_reports_scanner_error() {
        let (_, diagnostics) = run("1 + #", 200, &mut Calc::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(
            diagnostics[0].1.ends_with("(lexer: Unexpected character: #)"),
            "{}",
            diagnostics[0].1
        );
    }
}

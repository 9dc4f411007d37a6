//! Optional instrumentation hooks.
//!
//! An [`Instrument`] is handed to the tokenizer when it is built and is
//! reachable from the token cursor and the parser through it. The
//! tokenizer reports every token it produces; the parser reports entry to
//! and exit from every production. All hooks default to no-ops.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::token::Token;

/// Receiver for tokenizer and parser events.
#[allow(unused_variables)]
pub trait Instrument {
    /// Called after the tokenizer produced `token`.
    fn token(&mut self, token: &Token) {}

    /// Called when the parser starts a production such as `"statement"`.
    fn enter(&mut self, production: &'static str) {}

    /// Called when the parser leaves a production, whether it succeeded
    /// or not.
    fn exit(&mut self, production: &'static str) {}
}

impl<T: Instrument + ?Sized> Instrument for &mut T {
    fn token(&mut self, token: &Token) {
        (**self).token(token);
    }

    fn enter(&mut self, production: &'static str) {
        (**self).enter(production);
    }

    fn exit(&mut self, production: &'static str) {
        (**self).exit(production);
    }
}

/// Instrument that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInstrument;

impl Instrument for NoopInstrument {}

/// Forwards events to `tracing` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInstrument;

impl Instrument for TracingInstrument {
    fn token(&mut self, token: &Token) {
        tracing::trace!(
            target: "luaparse",
            kind = %token.kind,
            text = %token.text,
            line = token.line,
            "token"
        );
    }

    fn enter(&mut self, production: &'static str) {
        tracing::trace!(target: "luaparse", production, "enter");
    }

    fn exit(&mut self, production: &'static str) {
        tracing::trace!(target: "luaparse", production, "exit");
    }
}

/// Call count and cumulative time for one production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductionStats {
    pub calls: usize,
    /// Inclusive of nested productions.
    pub elapsed: Duration,
}

/// Records how often each production ran and how long it took.
#[derive(Debug, Default)]
pub struct Profile {
    tokens: usize,
    stats: BTreeMap<&'static str, ProductionStats>,
    open: Vec<(&'static str, Instant)>,
}

impl Profile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens produced, comments and end-of-input included.
    #[must_use]
    pub const fn tokens(&self) -> usize {
        self.tokens
    }

    #[must_use]
    pub fn get(&self, production: &str) -> Option<&ProductionStats> {
        self.stats.get(production)
    }

    /// Productions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ProductionStats)> {
        self.stats.iter().map(|(name, stats)| (*name, stats))
    }
}

impl Instrument for Profile {
    fn token(&mut self, _token: &Token) {
        self.tokens += 1;
    }

    fn enter(&mut self, production: &'static str) {
        self.stats.entry(production).or_default().calls += 1;
        self.open.push((production, Instant::now()));
    }

    fn exit(&mut self, production: &'static str) {
        if let Some((name, started)) = self.open.pop() {
            debug_assert_eq!(name, production, "unbalanced production exit");
            self.stats.entry(name).or_default().elapsed += started.elapsed();
        }
    }
}

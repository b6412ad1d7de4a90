//! Scanner module.
//!
//! [`parse`] runs a [`Dispatcher`] over a fresh [`ScanContext`] with the
//! built-in rules; [`parse_with_rules`] takes a caller-built [`Rules`].

/// Cursor and pending-text primitives.
pub mod context;
/// The single-pass token dispatch loop.
pub mod dispatcher;
/// Events, the handler trait and the event collector.
pub mod event;
/// Rule sets and their configuration.
pub mod rules;

use std::sync::LazyLock;

pub use context::ScanContext;
pub use dispatcher::Dispatcher;
pub use event::{ClosingToken, DataElement, Event, EventCollector, EventKind, Handler, Quote};
pub use rules::{DataElementRule, DataElementSpec, RuleError, RuleSpec, Rules, RulesBuilder};

static DEFAULT_RULES: LazyLock<Rules> = LazyLock::new(Rules::default);

/// Scan `input` with the built-in rules, reporting every token to `handler`.
pub fn parse<H: Handler + ?Sized>(input: &str, handler: &mut H) {
    parse_with_rules(input, handler, &DEFAULT_RULES);
}

/// Scan `input` with `rules`, reporting every token to `handler`.
///
/// Returns once the whole input has been consumed. Malformed markup never
/// aborts the scan; it degrades to text or to a best-effort token.
pub fn parse_with_rules<H: Handler + ?Sized>(input: &str, handler: &mut H, rules: &Rules) {
    Dispatcher::new(ScanContext::new(input, handler, rules)).run();
}

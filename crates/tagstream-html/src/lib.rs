//! Streaming SAX-style scanner for HTML/XML-like markup.
//!
//! # Scope
//!
//! This crate implements:
//! - **Scan Context** - cursor, lookahead and pending-text primitives over one input
//! - **Token Dispatcher** - the single left-to-right pass that recognizes
//!   - open tags, attributes and their closing token (`>`, `/>`, `?>`)
//!   - end tags and the `<?xml ... ?>` declaration
//!   - raw-text `script`/`style` bodies
//!   - data elements: comments, CDATA, doctype, and caller-defined regions
//! - **Rules** - identifier patterns and the ordered data-element table,
//!   deep-merged from caller overrides or a JSON configuration
//!
//! Events are delivered to a [`Handler`]; nothing is buffered into a tree.
//!
//! # Not Implemented
//!
//! - Tree construction or nesting validation
//! - Character reference decoding
//! - Encoding detection

/// The scanner: context, dispatcher, rules and events.
pub mod scanner;

pub use scanner::{
    ClosingToken, DataElement, DataElementRule, DataElementSpec, Dispatcher, Event,
    EventCollector, EventKind, Handler, Quote, RuleError, RuleSpec, Rules, RulesBuilder,
    ScanContext, parse, parse_with_rules,
};

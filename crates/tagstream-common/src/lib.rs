//! Common utilities for the tagstream scanner.
//!
//! This crate provides the small support library the scanner is built on:
//! - **Patterns** - literal and regex pattern specs, normalized into compiled matchers
//! - **Merging** - deep-merge of partial configuration onto defaults
//! - **Warning System** - colored terminal output for degraded input

pub mod merge;
pub mod pattern;
pub mod warning;

pub use merge::{Merge, merge_keyed};
pub use pattern::{Pattern, PatternError, PatternFlags};

//! Pattern specs for rule configuration.
//!
//! A rule delimiter is given either as a literal string, matched exactly, or
//! as a regex source carrying JS-style flags (`i`, `m`, `s`, `g`). Both forms
//! are normalized into a compiled [`Regex`] once, when a rule set is built,
//! and never mutated afterwards.
//!
//! The `g` flag is accepted for compatibility but has no effect: the scanner
//! only ever runs single searches relative to its cursor.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while turning a [`Pattern`] into a compiled matcher.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A flag character other than `g`, `i`, `m`, `s`, `u`.
    #[error("unknown pattern flag '{0}'")]
    UnknownFlag(char),
    /// The regex source failed to compile.
    #[error("invalid pattern {pattern}: {error}")]
    Invalid {
        /// The offending pattern, rendered as `/source/flags`.
        pattern: String,
        /// Underlying compile error.
        #[source]
        error: regex::Error,
    },
}

/// Flags carried by a regex pattern.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct PatternFlags {
    /// `i`: case-insensitive matching.
    pub ignore_case: bool,
    /// `m`: `^` and `$` match at line boundaries.
    pub multi_line: bool,
    /// `s`: `.` matches newlines.
    pub dot_all: bool,
    /// `g`: kept for round-tripping configuration, ignored when compiling.
    pub global: bool,
}

impl FromStr for PatternFlags {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::default();
        for c in s.chars() {
            match c {
                'i' => flags.ignore_case = true,
                'm' => flags.multi_line = true,
                's' => flags.dot_all = true,
                'g' => flags.global = true,
                // Matching is always Unicode-aware.
                'u' => {}
                other => return Err(PatternError::UnknownFlag(other)),
            }
        }
        Ok(flags)
    }
}

impl TryFrom<String> for PatternFlags {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PatternFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, letter) in [
            (self.global, 'g'),
            (self.ignore_case, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
        ] {
            if set {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// A delimiter or identifier pattern, as written in configuration.
///
/// Deserializes from either a JSON string (a literal) or an object
/// `{ "regex": "...", "flags": "i" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Pattern {
    /// Matched exactly; regex metacharacters carry no meaning.
    Literal(String),
    /// A regex source with its flags.
    Regex {
        /// Regex source, in the syntax of the `regex` crate.
        regex: String,
        /// Flags applied when compiling.
        #[serde(default)]
        flags: PatternFlags,
    },
}

impl Pattern {
    /// A pattern matching `text` exactly.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// A regex pattern with no flags.
    #[must_use]
    pub fn regex(source: impl Into<String>) -> Self {
        Self::Regex {
            regex: source.into(),
            flags: PatternFlags::default(),
        }
    }

    /// A regex pattern with JS-style flags, e.g. `"gi"`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownFlag`] for an unsupported flag letter.
    pub fn regex_with_flags(source: impl Into<String>, flags: &str) -> Result<Self, PatternError> {
        Ok(Self::Regex {
            regex: source.into(),
            flags: flags.parse()?,
        })
    }

    /// The regex source this pattern compiles from. Literals are escaped.
    #[must_use]
    pub fn source(&self) -> Cow<'_, str> {
        match self {
            Self::Literal(text) => Cow::Owned(escape(text)),
            Self::Regex { regex, .. } => Cow::Borrowed(regex),
        }
    }

    /// Flags of this pattern; literals have none.
    #[must_use]
    pub const fn flags(&self) -> PatternFlags {
        match self {
            Self::Literal(_) => PatternFlags {
                ignore_case: false,
                multi_line: false,
                dot_all: false,
                global: false,
            },
            Self::Regex { flags, .. } => *flags,
        }
    }

    /// Compile into an unanchored matcher.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Invalid`] if the regex source does not compile.
    pub fn compile(&self) -> Result<Regex, PatternError> {
        self.build(&self.source())
    }

    /// Compile into a matcher that only matches at the start of the haystack.
    ///
    /// For any haystack, this finds a match exactly when [`Pattern::compile`]
    /// finds one starting at offset 0, and it finds the same match.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Invalid`] if the regex source does not compile.
    pub fn compile_anchored(&self) -> Result<Regex, PatternError> {
        self.build(&format!(r"\A(?:{})", self.source()))
    }

    fn build(&self, source: &str) -> Result<Regex, PatternError> {
        let flags = self.flags();
        RegexBuilder::new(source)
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .build()
            .map_err(|error| PatternError::Invalid {
                pattern: self.to_string(),
                error,
            })
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{text:?}"),
            Self::Regex { regex, flags } => write!(f, "/{regex}/{flags}"),
        }
    }
}

/// Escape `text` so it matches literally inside a regex.
#[must_use]
pub fn escape(text: &str) -> String {
    regex::escape(text)
}

impl crate::Merge for Pattern {
    /// Patterns are leaves: an override replaces the whole pattern.
    fn merge(&mut self, overrides: Self) {
        *self = overrides;
    }
}

//! The scan context: one input, one cursor, one pending-text buffer.
//!
//! The cursor is a byte offset that always sits on a char boundary and only
//! ever moves forward. Counts passed to [`ScanContext::read`] and
//! [`ScanContext::peek`] are in characters; lengths passed to
//! [`ScanContext::read_len`] are in bytes and come from pattern matches.

use std::cell::OnceCell;

use regex::Regex;

use super::event::Handler;
use super::rules::Rules;

/// Cursor state for a single left-to-right pass over `raw`.
///
/// The current character and the remaining substring are cached on first
/// use; every cursor move drops both caches.
pub struct ScanContext<'a, H: ?Sized> {
    raw: &'a str,
    index: usize,
    current: OnceCell<Option<char>>,
    remaining: OnceCell<&'a str>,
    text: String,
    handler: &'a mut H,
    rules: &'a Rules,
}

impl<'a, H: Handler + ?Sized> ScanContext<'a, H> {
    /// A context positioned at the start of `raw`.
    #[must_use]
    pub fn new(raw: &'a str, handler: &'a mut H, rules: &'a Rules) -> Self {
        Self {
            raw,
            index: 0,
            current: OnceCell::new(),
            remaining: OnceCell::new(),
            text: String::new(),
            handler,
            rules,
        }
    }

    /// The whole input.
    #[must_use]
    pub const fn raw(&self) -> &'a str {
        self.raw
    }

    /// Cursor position, in bytes.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether the cursor has reached the end of input.
    #[must_use]
    pub const fn eof(&self) -> bool {
        self.index >= self.raw.len()
    }

    /// The rule set in effect.
    #[must_use]
    pub const fn rules(&self) -> &'a Rules {
        self.rules
    }

    /// The event receiver.
    pub fn handler(&mut self) -> &mut H {
        &mut *self.handler
    }

    /// Text accumulated since the last flush.
    #[must_use]
    pub fn pending_text(&self) -> &str {
        &self.text
    }

    /// The character under the cursor, `None` at end of input.
    #[must_use]
    pub fn current(&self) -> Option<char> {
        *self
            .current
            .get_or_init(|| self.remaining().chars().next())
    }

    /// Everything from the cursor to the end of input.
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        *self.remaining.get_or_init(|| &self.raw[self.index..])
    }

    /// Up to `count` characters following the current one.
    #[must_use]
    pub fn peek(&self, count: usize) -> &'a str {
        let remaining = self.remaining();
        let after = self.current().map_or(0, char::len_utf8);
        let tail = &remaining[after..];
        let end = tail.char_indices().nth(count).map_or(tail.len(), |(i, _)| i);
        &tail[..end]
    }

    /// Up to `count` non-whitespace characters following the current one,
    /// skipping any whitespace in between.
    #[must_use]
    pub fn peek_ignore_whitespace(&self, count: usize) -> String {
        self.remaining()
            .chars()
            .skip(1)
            .filter(|c| !c.is_whitespace())
            .take(count)
            .collect()
    }

    /// Advance by `count` characters, stopping at end of input. Returns the
    /// text skipped over.
    pub fn read(&mut self, count: usize) -> &'a str {
        let remaining = self.remaining();
        let len = remaining
            .char_indices()
            .nth(count)
            .map_or(remaining.len(), |(i, _)| i);
        self.read_len(len)
    }

    /// Advance by `len` bytes, stopping at end of input. Returns the text
    /// skipped over.
    ///
    /// # Panics
    ///
    /// Panics if the new position does not fall on a char boundary.
    pub fn read_len(&mut self, len: usize) -> &'a str {
        let start = self.index;
        let end = (start + len).min(self.raw.len());
        self.set_index(end);
        &self.raw[start..end]
    }

    /// Step forward one character at a time until the cursor sits on a
    /// non-whitespace character or the input ends. Returns every character
    /// stepped onto, the final non-whitespace one included.
    pub fn read_until_non_whitespace(&mut self) -> String {
        let mut value = String::new();
        while !self.eof() {
            let _ = self.read(1);
            let Some(c) = self.current() else {
                break;
            };
            value.push(c);
            if !c.is_whitespace() {
                break;
            }
        }
        value
    }

    /// Search `pattern` in the remaining input and advance past the match.
    ///
    /// The search is unanchored: anything between the cursor and the match
    /// is skipped without being reported. Callers must only use this where
    /// that gap is known to be empty, e.g. after checking that the current
    /// character starts a name. Returns `None` and stays put if there is no
    /// match.
    pub fn read_match(&mut self, pattern: &Regex) -> Option<&'a str> {
        let found = pattern.find(self.remaining())?;
        let _ = self.read_len(found.end());
        Some(found.as_str())
    }

    /// Add `value` to the pending text.
    pub fn append_text(&mut self, value: &str) {
        self.text.push_str(value);
    }

    /// Report the pending text, if any, and clear it.
    pub fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.handler.text(&self.text);
            self.text.clear();
        }
    }

    fn set_index(&mut self, index: usize) {
        debug_assert!(index >= self.index, "cursor moved backwards");
        debug_assert!(self.raw.is_char_boundary(index));
        self.index = index;
        self.current = OnceCell::new();
        self.remaining = OnceCell::new();
    }
}

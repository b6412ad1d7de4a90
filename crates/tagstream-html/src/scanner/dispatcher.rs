//! The token dispatcher.
//!
//! Each [`Dispatcher::step`] looks at the cursor and decides, in priority
//! order, whether an end tag, an XML declaration, an open tag, a data element
//! or a plain character starts there, then advances past it. Ordinary
//! characters pile up in the context's pending text, which is flushed as a
//! single `text` event right before the next structural event.
//!
//! Every path advances the cursor by at least one character, so a scan over
//! any input ends after at most one step per character.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tagstream_common::warning::warn_once;

use super::context::ScanContext;
use super::event::{ClosingToken, DataElement, Handler, Quote};
use super::rules::{DataElementRule, is_void_element};

/// Component name used in warnings.
const COMPONENT: &str = "Scanner";

// Warning texts never include input text.
const UNCLOSED_TAG: &str = "open tag is not closed before end of input";
const UNCLOSED_RAW_TEXT: &str = "script or style element has no closing tag; reading to end of input";

static EQUALS: LazyLock<Regex> = LazyLock::new(|| static_pattern(r"\s*=\s*"));
// No whitespace after `</`: the closer must also read as an end tag.
static SCRIPT_CLOSE: LazyLock<Regex> = LazyLock::new(|| static_pattern(r"(?i)</script\s*>"));
static STYLE_CLOSE: LazyLock<Regex> = LazyLock::new(|| static_pattern(r"(?i)</style\s*>"));

fn static_pattern(source: &str) -> Regex {
    Regex::new(source).expect("static scanner pattern compiles")
}

/// The closing-tag pattern of a raw-text element, `None` for other elements.
fn raw_text_closer(name: &str) -> Option<&'static Regex> {
    if name.eq_ignore_ascii_case("script") {
        Some(&*SCRIPT_CLOSE)
    } else if name.eq_ignore_ascii_case("style") {
        Some(&*STYLE_CLOSE)
    } else {
        None
    }
}

/// What kind of tag starts at the cursor.
enum TagStart {
    /// `</` followed by a name character.
    End,
    /// `<?xml`
    XmlDeclaration,
    /// `<` followed by a name character.
    Open,
}

/// Drives one scan of a [`ScanContext`] to completion.
pub struct Dispatcher<'a, H: ?Sized> {
    ctx: ScanContext<'a, H>,
}

// =============================================================================
// Main loop
// =============================================================================

impl<'a, H: Handler + ?Sized> Dispatcher<'a, H> {
    /// A dispatcher over `ctx`.
    #[must_use]
    pub const fn new(ctx: ScanContext<'a, H>) -> Self {
        Self { ctx }
    }

    /// The underlying context.
    #[must_use]
    pub const fn context(&self) -> &ScanContext<'a, H> {
        &self.ctx
    }

    /// Scan the whole input and flush trailing text.
    pub fn run(mut self) {
        while self.step() {}
        self.finish();
    }

    /// Dispatch one token (or one character of text). Returns `false`, doing
    /// nothing, once the input is exhausted.
    pub fn step(&mut self) -> bool {
        if self.ctx.eof() {
            return false;
        }
        self.parse_next();
        true
    }

    /// Flush any pending text. Content after the last token is still text.
    pub fn finish(mut self) {
        self.ctx.flush_text();
    }

    fn parse_next(&mut self) {
        match self.tag_start() {
            Some(TagStart::End) => self.parse_end_element(),
            Some(TagStart::XmlDeclaration) => self.parse_xml_type(),
            Some(TagStart::Open) => self.parse_open_element(),
            None => {
                if !self.parse_data_element() {
                    self.consume_as_text();
                }
            }
        }
    }

    fn tag_start(&self) -> Option<TagStart> {
        let remaining = self.ctx.remaining();
        let mut chars = remaining.chars();
        if chars.next() != Some('<') {
            return None;
        }

        let rules = self.ctx.rules();
        let next = chars.next()?;
        if next == '/' && chars.next().is_some_and(|c| rules.is_name_start(c)) {
            Some(TagStart::End)
        } else if next == '?' && remaining.starts_with("<?xml") {
            Some(TagStart::XmlDeclaration)
        } else if rules.is_name_start(next) {
            Some(TagStart::Open)
        } else {
            None
        }
    }

    fn consume_as_text(&mut self) {
        let text = self.ctx.read(1);
        self.ctx.append_text(text);
    }
}

// =============================================================================
// Tags
// =============================================================================

impl<'a, H: Handler + ?Sized> Dispatcher<'a, H> {
    /// `</name ...>`: anything after the name up to `>` is dropped.
    fn parse_end_element(&mut self) {
        let _ = self.ctx.read(2);
        self.ctx.flush_text();

        let rules = self.ctx.rules();
        let name = self.ctx.read_match(rules.name()).unwrap_or_default();
        self.ctx.handler().close_element(name);

        let remaining = self.ctx.remaining();
        let tail = remaining.find('>').map_or(remaining.len(), |at| at + 1);
        let _ = self.ctx.read_len(tail);
    }

    /// `<?xml` attributes `?>`
    fn parse_xml_type(&mut self) {
        let _ = self.ctx.read("<?xml".len());
        self.ctx.flush_text();

        self.ctx.handler().xml_type();
        self.read_attributes(true);
        let _ = self.read_closer("?xml");
    }

    fn parse_open_element(&mut self) {
        let _ = self.ctx.read(1);
        self.ctx.flush_text();

        let rules = self.ctx.rules();
        let name = self.ctx.read_match(rules.name()).unwrap_or_default();
        self.ctx.handler().open_element(name);
        self.read_attributes(false);
        let token = self.read_closer(name);

        if token == ClosingToken::Close
            && let Some(closer) = raw_text_closer(name)
        {
            self.parse_raw_text(closer);
        }
    }

    fn is_closing_token(&self, xml: bool) -> bool {
        match self.ctx.current() {
            Some('?') if xml => self.ctx.peek(1) == ">",
            Some('>') => !xml,
            Some('/') => !xml && self.ctx.peek_ignore_whitespace(1) == ">",
            _ => false,
        }
    }

    /// Attributes up to the closing token. Anything that is neither an
    /// attribute nor a data element is kept as stray text.
    fn read_attributes(&mut self, xml: bool) {
        while !self.ctx.eof() && !self.is_closing_token(xml) {
            let rules = self.ctx.rules();
            let at_attribute = self
                .ctx
                .current()
                .is_some_and(|c| rules.is_attribute_start(c));

            if at_attribute && self.read_attribute() {
                continue;
            }
            if !self.parse_data_element() {
                self.consume_as_text();
            }
        }
    }

    /// One attribute. Returns `false` without emitting if no name could be read.
    fn read_attribute(&mut self) -> bool {
        self.ctx.flush_text();

        let before = self.ctx.index();
        let rules = self.ctx.rules();
        let name = self.ctx.read_match(rules.attribute()).unwrap_or_default();
        if self.ctx.index() == before {
            return false;
        }

        let (value, quote) = if self.at_equals() {
            let _ = self.ctx.read_match(&EQUALS);
            let quote = Quote::from_char(self.ctx.current());
            (Some(self.read_attribute_value(quote)), quote)
        } else {
            (None, Quote::Unquoted)
        };

        self.ctx.handler().attribute(name, value, quote);
        true
    }

    /// `=` at the cursor, or after whitespace.
    fn at_equals(&self) -> bool {
        match self.ctx.current() {
            Some('=') => true,
            Some(c) if c.is_whitespace() => self.ctx.peek_ignore_whitespace(1) == "=",
            _ => false,
        }
    }

    fn read_attribute_value(&mut self, quote: Quote) -> &'a str {
        let remaining = self.ctx.remaining();
        match quote.as_char() {
            Some(q) => {
                let body = &remaining[q.len_utf8()..];
                match body.find(q) {
                    Some(end) => {
                        let _ = self.ctx.read_len(end + 2 * q.len_utf8());
                        &body[..end]
                    }
                    // Unmatched quote: the quote itself is left to be read as text.
                    None => "",
                }
            }
            None => {
                let end = remaining
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(remaining.len());
                self.ctx.read_len(end)
            }
        }
    }

    fn read_closer(&mut self, name: &str) -> ClosingToken {
        let token = match self.ctx.current() {
            Some('/') => {
                let _ = self.ctx.read_until_non_whitespace();
                let _ = self.ctx.read(1);
                ClosingToken::SelfClose
            }
            Some('?') => {
                let _ = self.ctx.read(2);
                ClosingToken::XmlClose
            }
            Some(_) => {
                let _ = self.ctx.read(1);
                ClosingToken::Close
            }
            None => {
                warn_once(COMPONENT, UNCLOSED_TAG);
                ClosingToken::Close
            }
        };

        self.ctx.flush_text();
        let unary = token == ClosingToken::SelfClose || is_void_element(name);
        self.ctx.handler().close_opened_element(name, token, unary);
        token
    }

    /// Body of a `script` or `style` element, up to its closing tag.
    ///
    /// Data elements still take priority; every other run is folded into the
    /// pending text. The closing tag itself is left for the main loop.
    fn parse_raw_text(&mut self, closer: &Regex) {
        let remaining = self.ctx.remaining();
        let boundary = self.ctx.index()
            + closer.find(remaining).map_or_else(
                || {
                    warn_once(COMPONENT, UNCLOSED_RAW_TEXT);
                    remaining.len()
                },
                |found| found.start(),
            );

        while self.ctx.index() < boundary {
            if self.parse_data_element() {
                continue;
            }

            let run = &self.ctx.remaining()[..boundary - self.ctx.index()];
            let len = match self.next_data_element_start(run) {
                Some(0) => self.ctx.current().map_or(1, char::len_utf8),
                Some(at) => at,
                None => run.len(),
            };
            let text = self.ctx.read_len(len);
            self.ctx.append_text(text);
        }
    }
}

// =============================================================================
// Data elements
// =============================================================================

impl<'a, H: Handler + ?Sized> Dispatcher<'a, H> {
    /// The first rule, in declaration order, whose start delimiter sits at
    /// the cursor, with the delimiter text.
    fn match_data_element(&self) -> Option<(&'a DataElementRule, &'a str)> {
        let remaining = self.ctx.remaining();
        self.ctx
            .rules()
            .data_elements()
            .iter()
            .find_map(|rule| rule.match_start(remaining).map(|start| (rule, start)))
    }

    /// Offset of the nearest data-element start in `haystack`.
    fn next_data_element_start(&self, haystack: &str) -> Option<usize> {
        self.ctx
            .rules()
            .data_elements()
            .iter()
            .filter_map(|rule| rule.find_start(haystack))
            .min()
    }

    /// Parse a data element at the cursor. Returns `false`, leaving the
    /// cursor alone, if none starts here.
    fn parse_data_element(&mut self) -> bool {
        let Some((rule, start)) = self.match_data_element() else {
            return false;
        };

        self.ctx.flush_text();
        let _ = self.ctx.read_len(start.len());

        let remaining = self.ctx.remaining();
        let found = rule.find_end(remaining);
        let (raw, end) = match found {
            Some(m) => (&remaining[..m.start()], m.as_str()),
            None => {
                warn_once(
                    COMPONENT,
                    &format!("{} is not terminated before end of input", rule.key()),
                );
                (remaining, "")
            }
        };
        let _ = self.ctx.read_len(raw.len() + end.len());

        let transformed = rule.transform(raw);
        let element = DataElement {
            key: rule.key(),
            resolved: transformed.is_some(),
            value: transformed.map_or(Cow::Borrowed(raw), Cow::Owned),
            raw,
            start,
            end,
            terminated: found.is_some(),
        };
        self.ctx.handler().data_element(&element);
        true
    }
}

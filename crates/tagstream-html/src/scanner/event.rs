use std::borrow::Cow;

use strum_macros::{AsRefStr, Display, EnumString};

use super::rules::{CDATA, COMMENT, DOC_TYPE};

/// The token that closed an open tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
pub enum ClosingToken {
    /// `>`; also reported when the input ends inside the tag.
    #[strum(serialize = ">")]
    Close,
    /// `/>`, possibly written with whitespace between the two characters.
    #[strum(serialize = "/>")]
    SelfClose,
    /// `?>`, closing an XML declaration.
    #[strum(serialize = "?>")]
    XmlClose,
}

/// Quote character around an attribute value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
pub enum Quote {
    /// Bare attribute, or an unquoted value.
    #[default]
    #[strum(serialize = "")]
    Unquoted,
    /// `"value"`
    #[strum(serialize = "\"")]
    Double,
    /// `'value'`
    #[strum(serialize = "'")]
    Single,
}

impl Quote {
    /// Classify the character that opens an attribute value.
    #[must_use]
    pub const fn from_char(c: Option<char>) -> Self {
        match c {
            Some('"') => Self::Double,
            Some('\'') => Self::Single,
            _ => Self::Unquoted,
        }
    }

    /// The quote character, if any.
    #[must_use]
    pub const fn as_char(self) -> Option<char> {
        match self {
            Self::Unquoted => None,
            Self::Double => Some('"'),
            Self::Single => Some('\''),
        }
    }
}

/// A recognized data element: comment, CDATA, doctype, or a custom region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataElement<'a> {
    /// Key of the rule that matched (`comment`, `cdata`, `docType`, or a custom key).
    pub key: &'a str,
    /// The content after the rule's transform; the raw content if there is none
    /// or it declined.
    pub value: Cow<'a, str>,
    /// Content between the delimiters, untouched.
    pub raw: &'a str,
    /// Start delimiter text as it appeared in the input.
    pub start: &'a str,
    /// End delimiter text; empty when the element runs to end of input.
    pub end: &'a str,
    /// False when no end delimiter was found.
    pub terminated: bool,
    /// True when the rule's transform produced `value`.
    pub resolved: bool,
}

impl DataElement<'_> {
    /// `[start, end]` delimiter text.
    #[must_use]
    pub const fn delimiters(&self) -> [&str; 2] {
        [self.start, self.end]
    }
}

/// Receiver for scanner events.
///
/// Every method has a no-op default, so a handler only implements the events
/// it cares about. Events arrive in document order; pending text is always
/// delivered through [`Handler::text`] before the next structural event.
pub trait Handler {
    /// `<name` was read.
    fn open_element(&mut self, _name: &str) {}

    /// The open tag `name` was closed by `token`. `unary` is set for void
    /// elements and for the `/>` closer; an XML declaration is never unary.
    fn close_opened_element(&mut self, _name: &str, _token: ClosingToken, _unary: bool) {}

    /// `</name ...>` was read.
    fn close_element(&mut self, _name: &str) {}

    /// An attribute inside an open tag. `value` is `None` for a bare attribute.
    fn attribute(&mut self, _name: &str, _value: Option<&str>, _quote: Quote) {}

    /// A run of text between structural tokens.
    fn text(&mut self, _value: &str) {}

    /// `<?xml` was read; its attributes and closer follow.
    fn xml_type(&mut self) {}

    /// A `comment` data element.
    fn comment(&mut self, _element: &DataElement<'_>) {}

    /// A `cdata` data element.
    fn cdata(&mut self, _element: &DataElement<'_>) {}

    /// A `docType` data element.
    fn doc_type(&mut self, _element: &DataElement<'_>) {}

    /// Every data element, whatever its key.
    ///
    /// The default routes the built-in keys to [`Handler::comment`],
    /// [`Handler::cdata`] and [`Handler::doc_type`] and ignores custom keys.
    /// Override this to receive custom data elements.
    fn data_element(&mut self, element: &DataElement<'_>) {
        match element.key {
            COMMENT => self.comment(element),
            CDATA => self.cdata(element),
            DOC_TYPE => self.doc_type(element),
            _ => {}
        }
    }
}

/// Event names, as used in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum EventKind {
    /// [`Event::OpenElement`]
    OpenElement,
    /// [`Event::CloseOpenedElement`]
    CloseOpenedElement,
    /// [`Event::CloseElement`]
    CloseElement,
    /// [`Event::Attribute`]
    Attribute,
    /// [`Event::Text`]
    Text,
    /// [`Event::XmlType`]
    XmlType,
    /// [`Event::DataElement`]
    DataElement,
}

/// An owned scanner event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// See [`Handler::open_element`].
    OpenElement {
        /// Element name.
        name: String,
    },
    /// See [`Handler::close_opened_element`].
    CloseOpenedElement {
        /// Element name.
        name: String,
        /// Closing token.
        token: ClosingToken,
        /// Void element or self-closed.
        unary: bool,
    },
    /// See [`Handler::close_element`].
    CloseElement {
        /// Element name.
        name: String,
    },
    /// See [`Handler::attribute`].
    Attribute {
        /// Attribute name.
        name: String,
        /// Value, `None` for a bare attribute.
        value: Option<String>,
        /// Quote around the value.
        quote: Quote,
    },
    /// See [`Handler::text`].
    Text {
        /// The text run.
        value: String,
    },
    /// See [`Handler::xml_type`].
    XmlType,
    /// See [`Handler::data_element`].
    DataElement {
        /// Rule key.
        key: String,
        /// Resolved value.
        value: String,
        /// Raw content.
        raw: String,
        /// Start delimiter text.
        start: String,
        /// End delimiter text.
        end: String,
        /// Whether an end delimiter was found.
        terminated: bool,
        /// Whether the transform produced the value.
        resolved: bool,
    },
}

impl Event {
    /// The kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::OpenElement { .. } => EventKind::OpenElement,
            Self::CloseOpenedElement { .. } => EventKind::CloseOpenedElement,
            Self::CloseElement { .. } => EventKind::CloseElement,
            Self::Attribute { .. } => EventKind::Attribute,
            Self::Text { .. } => EventKind::Text,
            Self::XmlType => EventKind::XmlType,
            Self::DataElement { .. } => EventKind::DataElement,
        }
    }
}

impl From<&DataElement<'_>> for Event {
    fn from(element: &DataElement<'_>) -> Self {
        Self::DataElement {
            key: element.key.to_string(),
            value: element.value.to_string(),
            raw: element.raw.to_string(),
            start: element.start.to_string(),
            end: element.end.to_string(),
            terminated: element.terminated,
            resolved: element.resolved,
        }
    }
}

/// A [`Handler`] that records every event, custom data elements included.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
}

impl EventCollector {
    /// An empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consume the collector and return its events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Handler for EventCollector {
    fn open_element(&mut self, name: &str) {
        self.events.push(Event::OpenElement {
            name: name.to_string(),
        });
    }

    fn close_opened_element(&mut self, name: &str, token: ClosingToken, unary: bool) {
        self.events.push(Event::CloseOpenedElement {
            name: name.to_string(),
            token,
            unary,
        });
    }

    fn close_element(&mut self, name: &str) {
        self.events.push(Event::CloseElement {
            name: name.to_string(),
        });
    }

    fn attribute(&mut self, name: &str, value: Option<&str>, quote: Quote) {
        self.events.push(Event::Attribute {
            name: name.to_string(),
            value: value.map(str::to_string),
            quote,
        });
    }

    fn text(&mut self, value: &str) {
        self.events.push(Event::Text {
            value: value.to_string(),
        });
    }

    fn xml_type(&mut self) {
        self.events.push(Event::XmlType);
    }

    fn data_element(&mut self, element: &DataElement<'_>) {
        self.events.push(element.into());
    }
}

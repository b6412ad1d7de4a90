//! Reassembles a document from scanner events.

use std::fmt::Write;

use tagstream_html::{ClosingToken, DataElement, Handler, Quote};

/// Rebuilds the scanned text.
///
/// Every event is written back as it appeared in the input, except the
/// placeholder data element: a terminated placeholder whose transform
/// returned a value is replaced by it, any other one is kept verbatim.
pub struct Reassembler {
    placeholder: String,
    output: String,
}

impl Reassembler {
    /// A reassembler substituting data elements with key `placeholder`.
    #[must_use]
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            output: String::new(),
        }
    }

    /// The rebuilt document.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }
}

impl Handler for Reassembler {
    fn open_element(&mut self, name: &str) {
        self.output.push('<');
        self.output.push_str(name);
    }

    fn close_opened_element(&mut self, _name: &str, token: ClosingToken, _unary: bool) {
        self.output.push_str(token.as_ref());
    }

    fn close_element(&mut self, name: &str) {
        let _ = write!(self.output, "</{name}>");
    }

    fn attribute(&mut self, name: &str, value: Option<&str>, quote: Quote) {
        self.output.push_str(name);
        if let Some(value) = value {
            let _ = write!(self.output, "={quote}{value}{quote}");
        }
    }

    fn text(&mut self, value: &str) {
        self.output.push_str(value);
    }

    fn xml_type(&mut self) {
        self.output.push_str("<?xml");
    }

    fn data_element(&mut self, element: &DataElement<'_>) {
        if element.key == self.placeholder && element.terminated && element.resolved {
            self.output.push_str(&element.value);
        } else {
            let [start, end] = element.delimiters();
            let _ = write!(self.output, "{start}{}{end}", element.raw);
        }
    }
}

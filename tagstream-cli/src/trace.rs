//! Colored event trace for `--trace`.

use std::io::{self, Write};

use owo_colors::OwoColorize;
use tagstream_html::{ClosingToken, DataElement, EventKind, Handler, Quote};

/// Writes one colored line per event.
///
/// Handler methods cannot fail, so the first write error is kept and
/// reported by [`Tracer::finish`]; later events are dropped.
pub struct Tracer<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> Tracer<W> {
    /// A tracer writing to `out`.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flush the output.
    ///
    /// # Errors
    ///
    /// Returns the first write error seen while tracing, or the flush error.
    pub fn finish(mut self) -> io::Result<()> {
        match self.error.take() {
            Some(error) => Err(error),
            None => self.out.flush(),
        }
    }

    fn line(&mut self, kind: EventKind, detail: &str) {
        if self.error.is_some() {
            return;
        }
        let label = format!("{:<18}", kind.as_ref());
        let result = match kind {
            EventKind::OpenElement | EventKind::CloseOpenedElement | EventKind::CloseElement => {
                writeln!(self.out, "{} {detail}", label.cyan())
            }
            EventKind::Attribute => writeln!(self.out, "{} {detail}", label.yellow()),
            EventKind::Text => writeln!(self.out, "{} {detail}", label.dimmed()),
            EventKind::XmlType | EventKind::DataElement => {
                writeln!(self.out, "{} {detail}", label.magenta())
            }
        };
        if let Err(error) = result {
            self.error = Some(error);
        }
    }
}

impl<W: Write> Handler for Tracer<W> {
    fn open_element(&mut self, name: &str) {
        self.line(EventKind::OpenElement, &name.bold().to_string());
    }

    fn close_opened_element(&mut self, name: &str, token: ClosingToken, unary: bool) {
        self.line(
            EventKind::CloseOpenedElement,
            &format!("{} {token} unary={unary}", name.bold()),
        );
    }

    fn close_element(&mut self, name: &str) {
        self.line(EventKind::CloseElement, &name.bold().to_string());
    }

    fn attribute(&mut self, name: &str, value: Option<&str>, quote: Quote) {
        let detail = match value {
            Some(value) => format!("{name}={quote}{value}{quote}"),
            None => name.to_string(),
        };
        self.line(EventKind::Attribute, &detail);
    }

    fn text(&mut self, value: &str) {
        self.line(EventKind::Text, &format!("{value:?}"));
    }

    fn xml_type(&mut self) {
        self.line(EventKind::XmlType, "");
    }

    fn data_element(&mut self, element: &DataElement<'_>) {
        let mut detail = format!(
            "{} {:?} raw={:?} {:?}",
            element.key.bold(),
            element.value,
            element.raw,
            element.delimiters(),
        );
        if !element.terminated {
            detail.push_str(" (unterminated)");
        }
        if element.resolved {
            detail.push_str(" (resolved)");
        }
        self.line(EventKind::DataElement, &detail);
    }
}

//! Shared helpers for the scanner integration tests.

#![allow(dead_code)]

use std::fmt::Write;

use tagstream_html::{
    ClosingToken, Event, EventCollector, Quote, Rules, parse, parse_with_rules,
};

/// Scan `input` with the built-in rules and return every event.
pub fn scan(input: &str) -> Vec<Event> {
    tagstream_common::warning::set_quiet(true);
    let mut collector = EventCollector::new();
    parse(input, &mut collector);
    collector.into_events()
}

/// Scan `input` with `rules` and return every event.
pub fn scan_with(input: &str, rules: &Rules) -> Vec<Event> {
    tagstream_common::warning::set_quiet(true);
    let mut collector = EventCollector::new();
    parse_with_rules(input, &mut collector, rules);
    collector.into_events()
}

/// Events without the text runs.
pub fn structural(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| !matches!(event, Event::Text { .. }))
        .collect()
}

/// Rebuild the source text from events, the way the CLI does it.
pub fn reassemble(events: &[Event]) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            Event::OpenElement { name } => {
                let _ = write!(out, "<{name}");
            }
            Event::CloseOpenedElement { token, .. } => out.push_str(token.as_ref()),
            Event::CloseElement { name } => {
                let _ = write!(out, "</{name}>");
            }
            Event::Attribute { name, value, quote } => {
                out.push_str(name);
                if let Some(value) = value {
                    let _ = write!(out, "={quote}{value}{quote}");
                }
            }
            Event::Text { value } => out.push_str(value),
            Event::XmlType => out.push_str("<?xml"),
            Event::DataElement {
                start, raw, end, ..
            } => {
                let _ = write!(out, "{start}{raw}{end}");
            }
        }
    }
    out
}

pub fn text(value: &str) -> Event {
    Event::Text {
        value: value.to_string(),
    }
}

pub fn open(name: &str) -> Event {
    Event::OpenElement {
        name: name.to_string(),
    }
}

pub fn close_opened(name: &str, token: ClosingToken, unary: bool) -> Event {
    Event::CloseOpenedElement {
        name: name.to_string(),
        token,
        unary,
    }
}

pub fn close(name: &str) -> Event {
    Event::CloseElement {
        name: name.to_string(),
    }
}

pub fn attribute(name: &str, value: Option<&str>, quote: Quote) -> Event {
    Event::Attribute {
        name: name.to_string(),
        value: value.map(str::to_string),
        quote,
    }
}

/// A terminated data element whose value is its raw content.
pub fn data(key: &str, raw: &str, start: &str, end: &str) -> Event {
    Event::DataElement {
        key: key.to_string(),
        value: raw.to_string(),
        raw: raw.to_string(),
        start: start.to_string(),
        end: end.to_string(),
        terminated: true,
        resolved: false,
    }
}

/// A terminated data element whose value came from its rule's transform.
pub fn resolved(key: &str, value: &str, raw: &str, start: &str, end: &str) -> Event {
    Event::DataElement {
        key: key.to_string(),
        value: value.to_string(),
        raw: raw.to_string(),
        start: start.to_string(),
        end: end.to_string(),
        terminated: true,
        resolved: true,
    }
}

//! Integration tests for the scan context primitives.

use regex::Regex;
use tagstream_html::{Event, EventCollector, Rules, ScanContext};

#[test]
fn test_current_and_peek() {
    let rules = Rules::default();
    let mut collector = EventCollector::new();
    let ctx = ScanContext::new("ab  cd", &mut collector, &rules);

    assert_eq!(ctx.current(), Some('a'));
    assert_eq!(ctx.peek(2), "b ");
    assert_eq!(ctx.peek_ignore_whitespace(2), "bc");
    assert_eq!(ctx.remaining(), "ab  cd");
    assert_eq!(ctx.index(), 0);
}

#[test]
fn test_peek_past_end() {
    let rules = Rules::default();
    let mut collector = EventCollector::new();
    let ctx = ScanContext::new("a", &mut collector, &rules);

    assert_eq!(ctx.peek(3), "");
    assert_eq!(ctx.peek_ignore_whitespace(3), "");
}

#[test]
fn test_read_moves_cursor() {
    let rules = Rules::default();
    let mut collector = EventCollector::new();
    let mut ctx = ScanContext::new("ab  cd", &mut collector, &rules);

    assert_eq!(ctx.read(1), "a");
    assert_eq!(ctx.current(), Some('b'));
    assert_eq!(ctx.read_until_non_whitespace(), "  c");
    assert_eq!(ctx.index(), 4);
    assert_eq!(ctx.current(), Some('c'));

    // Reads are clamped at end of input.
    assert_eq!(ctx.read(10), "cd");
    assert!(ctx.eof());
    assert_eq!(ctx.current(), None);
    assert_eq!(ctx.read(1), "");
}

#[test]
fn test_read_until_non_whitespace_at_eof() {
    let rules = Rules::default();
    let mut collector = EventCollector::new();
    let mut ctx = ScanContext::new("/   ", &mut collector, &rules);

    assert_eq!(ctx.read_until_non_whitespace(), "   ");
    assert!(ctx.eof());
}

#[test]
fn test_reads_count_characters() {
    let rules = Rules::default();
    let mut collector = EventCollector::new();
    let mut ctx = ScanContext::new("é€<", &mut collector, &rules);

    assert_eq!(ctx.current(), Some('é'));
    assert_eq!(ctx.peek(1), "€");
    assert_eq!(ctx.read(2), "é€");
    assert_eq!(ctx.index(), "é€".len());
    assert_eq!(ctx.current(), Some('<'));
}

#[test]
fn test_read_match_skips_gap() {
    let rules = Rules::default();
    let mut collector = EventCollector::new();
    let mut ctx = ScanContext::new("   name=1", &mut collector, &rules);
    let word = Regex::new("[a-z]+").unwrap();
    let digits = Regex::new("[0-9]{2}").unwrap();

    assert_eq!(ctx.read_match(&digits), None);
    assert_eq!(ctx.index(), 0);

    assert_eq!(ctx.read_match(&word), Some("name"));
    assert_eq!(ctx.index(), 7);
    assert_eq!(ctx.current(), Some('='));
}

#[test]
fn test_flush_text_reports_once() {
    let rules = Rules::default();
    let mut collector = EventCollector::new();
    {
        let mut ctx = ScanContext::new("", &mut collector, &rules);
        ctx.append_text("x");
        ctx.append_text("y");
        assert_eq!(ctx.pending_text(), "xy");
        ctx.flush_text();
        assert_eq!(ctx.pending_text(), "");
        ctx.flush_text();
    }
    assert_eq!(
        collector.events(),
        [Event::Text {
            value: "xy".to_string()
        }]
    );
}

//! Integration tests for rule configuration and compilation.

use tagstream_common::{Pattern, PatternError};
use tagstream_html::{DataElementRule, DataElementSpec, RuleError, RuleSpec, Rules};

fn keys(rules: &Rules) -> Vec<&str> {
    rules
        .data_elements()
        .iter()
        .map(DataElementRule::key)
        .collect()
}

#[test]
fn test_default_order() {
    let rules = Rules::default();
    assert_eq!(keys(&rules), ["cdata", "comment", "docType"]);
    assert!(rules.is_name_start('a'));
    assert!(rules.is_name_start('_'));
    assert!(!rules.is_name_start('1'));
    assert!(!rules.is_name_start('!'));
}

#[test]
fn test_rules_are_shareable() {
    fn assert_send_sync<T: Send + Sync + Clone>() {}
    assert_send_sync::<Rules>();
}

#[test]
fn test_new_keys_append_and_overrides_keep_position() {
    let rules = Rules::builder()
        .data_element("vars", DataElementSpec::delimited("{{", "}}"))
        .data_element("comment", DataElementSpec::new().end("--!>"))
        .build()
        .unwrap();
    assert_eq!(keys(&rules), ["cdata", "comment", "docType", "vars"]);

    let comment = rules.data_element("comment").unwrap();
    assert_eq!(comment.match_start("<!-- x --!>"), Some("<!--"));
    assert_eq!(comment.find_end(" x --!>").map(|m| m.start()), Some(3));
    assert!(comment.find_end(" x -->").is_none());
}

#[test]
fn test_missing_delimiter() {
    let err = Rules::builder()
        .data_element("vars", DataElementSpec::new().start("{{"))
        .build()
        .unwrap_err();
    assert!(matches!(
        &err,
        RuleError::MissingDelimiter { key, field: "end" } if key == "vars"
    ));
    assert_eq!(
        err.to_string(),
        "rules.dataElements.vars.end must be a string or regexp"
    );
}

#[test]
fn test_invalid_pattern_names_field() {
    let err = Rules::builder()
        .data_element(
            "bad",
            DataElementSpec::delimited(Pattern::regex("(unclosed"), ">"),
        )
        .build()
        .unwrap_err();
    match err {
        RuleError::Pattern { field, error } => {
            assert_eq!(field, "dataElements.bad.start");
            assert!(matches!(error, PatternError::Invalid { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = Rules::builder()
        .attribute(Pattern::regex("[a-"))
        .build()
        .unwrap_err();
    assert!(err.to_string().starts_with("rules.attribute: "));
}

#[test]
fn test_transform_resolution() {
    let rules = Rules::builder()
        .data_element(
            "vars",
            DataElementSpec::delimited("{{", "}}").data(|raw| (raw == "a").then(|| "A".into())),
        )
        .build()
        .unwrap();
    let vars = rules.data_element("vars").unwrap();
    assert_eq!(vars.resolve("a"), "A");
    assert_eq!(vars.resolve("b"), "b");

    let comment = rules.data_element("comment").unwrap();
    assert_eq!(comment.resolve(" hi "), " hi ");
}

#[test]
fn test_start_matching() {
    let rules = Rules::default();
    let comment = rules.data_element("comment").unwrap();
    assert_eq!(comment.match_start("<!-- x -->"), Some("<!--"));
    assert_eq!(comment.match_start("a<!--"), None);
    assert_eq!(comment.find_start("abc<!--"), Some(3));

    let doc_type = rules.data_element("docType").unwrap();
    assert_eq!(doc_type.match_start("<!doctype html>"), Some("<!doctype "));
    // `^` only anchors at the start of the searched text.
    assert_eq!(doc_type.find_start("x<!DOCTYPE html>"), None);
}

#[test]
fn test_empty_start_never_matches() {
    let rules = Rules::builder()
        .data_element(
            "maybe",
            DataElementSpec::delimited(Pattern::regex("x*"), ";"),
        )
        .build()
        .unwrap();
    let maybe = rules.data_element("maybe").unwrap();
    assert_eq!(maybe.match_start("abc"), None);
    assert_eq!(maybe.match_start("xxa"), Some("xx"));
    assert_eq!(maybe.find_start("abxc"), Some(2));
}

#[test]
fn test_json_preserves_declaration_order() {
    let rules = Rules::from_json(
        r#"{
            "dataElements": {
                "zeta": { "start": "<%", "end": "%>" },
                "alpha": { "start": { "regex": "\\{\\{\\s*" }, "end": { "regex": "\\s*\\}\\}" } },
                "comment": { "end": "--!>" }
            }
        }"#,
    )
    .unwrap();
    assert_eq!(keys(&rules), ["cdata", "comment", "docType", "zeta", "alpha"]);
    assert_eq!(
        rules.data_element("alpha").unwrap().match_start("{{  x }}"),
        Some("{{  ")
    );
}

#[test]
fn test_json_name_and_flags() {
    let spec = RuleSpec::from_json(
        r#"{ "name": { "regex": "[a-z]+", "flags": "gi" } }"#,
    )
    .unwrap();
    let rules = Rules::from_spec(spec).unwrap();
    assert!(rules.is_name_start('Q'));
    assert!(!rules.is_name_start('_'));
}

#[test]
fn test_json_errors() {
    for json in [
        r#"{ "dataElements": { "x": { "start": 5, "end": ">" } } }"#,
        r#"{ "dataElements": { "x": { "begin": "<" } } }"#,
        r#"{ "unknown": true }"#,
        r#"{ "name": { "regex": "a", "flags": "z" } }"#,
        "not json",
    ] {
        let err = Rules::from_json(json).unwrap_err();
        assert!(matches!(err, RuleError::Config(_)), "{json}: {err}");
    }
}

#[test]
fn test_builder_merges_specs() {
    let spec = RuleSpec::from_json(r#"{ "dataElements": { "vars": { "start": "{{" } } }"#)
        .unwrap();
    let rules = Rules::builder()
        .merge(spec)
        .data_element("vars", DataElementSpec::new().end("}}"))
        .build()
        .unwrap();
    let vars = rules.data_element("vars").unwrap();
    assert_eq!(vars.match_start("{{a}}"), Some("{{"));
    assert_eq!(vars.find_end("a}}").map(|m| m.start()), Some(1));
}

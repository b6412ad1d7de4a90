//! tagstream CLI
//!
//! Scans a document with a `{{ name }}` placeholder rule, substitutes the
//! names it knows and prints the document reassembled from the events.

mod render;
mod trace;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tagstream_common::{Pattern, warning};
use tagstream_html::{DataElementSpec, RuleSpec, Rules, parse_with_rules};

use render::Reassembler;
use trace::Tracer;

/// Key of the placeholder data element.
const VARS: &str = "vars";

/// tagstream: streaming markup scanner with pluggable data elements
#[derive(Parser, Debug)]
#[command(name = "tagstream")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Reassemble a file, substituting {{ filename }} and {{ basename }}
    tagstream ./index.html

    # Substitute your own placeholders
    tagstream --var title=Home --var lang=en ./index.html

    # Add data elements from a JSON rule file
    tagstream --rules rules.json ./page.tpl

    # Print every event instead of the document
    tagstream --trace --html '<p class="x">{{ title }}</p>'
"#)]
struct Cli {
    /// Path to the document to scan
    #[arg(value_name = "FILE", required_unless_present = "html", conflicts_with = "html")]
    path: Option<PathBuf>,

    /// Scan this string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// JSON rule configuration merged onto the built-in rules
    #[arg(short, long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Placeholder value (repeatable)
    #[arg(short, long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Print every event instead of the reassembled document
    #[arg(short, long)]
    trace: bool,

    /// Suppress scanner warnings
    #[arg(short, long)]
    quiet: bool,
}

fn parse_var(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty variable name in '{arg}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Built-in placeholders for `path`, overridden by `--var` flags.
///
/// `basename` is the directory holding the document, with `/` separators;
/// `filename` is the document's file name.
fn variables(path: Option<&Path>, overrides: &[(String, String)]) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    if let Some(path) = path {
        let full = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if let Some(dir) = full.parent() {
            let _ = vars.insert(
                "basename".to_string(),
                dir.to_string_lossy().replace('\\', "/"),
            );
        }
        if let Some(name) = path.file_name() {
            let _ = vars.insert("filename".to_string(), name.to_string_lossy().into_owned());
        }
    }
    vars.extend(overrides.iter().cloned());
    vars
}

fn build_rules(vars: HashMap<String, String>, config: Option<&Path>) -> Result<Rules> {
    let placeholder =
        DataElementSpec::delimited(Pattern::regex(r"\{\{\s*"), Pattern::regex(r"\s*\}\}"))
            .data(move |name| vars.get(name.trim()).cloned());
    let mut builder = Rules::builder().data_element(VARS, placeholder);

    if let Some(path) = config {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read rules from {}", path.display()))?;
        let spec = RuleSpec::from_json(&json)
            .with_context(|| format!("failed to parse rules from {}", path.display()))?;
        builder = builder.merge(spec);
    }

    builder.build().context("invalid rule configuration")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    warning::clear_warnings();
    warning::set_quiet(cli.quiet);

    let source = match (&cli.html, &cli.path) {
        (Some(html), _) => html.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("nothing to scan: pass a FILE or --html"),
    };

    let vars = variables(cli.path.as_deref(), &cli.vars);
    let rules = build_rules(vars, cli.rules.as_deref())?;

    if cli.trace {
        let mut tracer = Tracer::new(io::stdout().lock());
        parse_with_rules(&source, &mut tracer, &rules);
        tracer.finish().context("failed to write trace")?;
    } else {
        let mut reassembler = Reassembler::new(VARS);
        parse_with_rules(&source, &mut reassembler, &rules);
        print!("{}", reassembler.into_output());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("title=Home = Page"),
            Ok(("title".to_string(), "Home = Page".to_string()))
        );
        assert_eq!(parse_var("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_requires_input() {
        assert!(Cli::try_parse_from(["tagstream"]).is_err());
        assert!(Cli::try_parse_from(["tagstream", "a.html", "--html", "<p>"]).is_err());

        let cli = Cli::try_parse_from(["tagstream", "--html", "<p>", "-v", "a=1", "--var", "b=2"])
            .unwrap();
        assert_eq!(cli.html.as_deref(), Some("<p>"));
        assert_eq!(cli.vars.len(), 2);
    }

    #[test]
    fn test_variables() {
        let vars = variables(
            Some(Path::new("docs/index.html")),
            &[("title".to_string(), "Home".to_string())],
        );
        assert_eq!(vars["filename"], "index.html");
        assert!(vars["basename"].ends_with("docs"));
        assert_eq!(vars["title"], "Home");

        let vars = variables(None, &[("filename".to_string(), "x".to_string())]);
        assert_eq!(vars["filename"], "x");
        assert!(!vars.contains_key("basename"));
    }

    #[test]
    fn test_substitution() {
        let vars = variables(None, &[("title".to_string(), "Home".to_string())]);
        let rules = build_rules(vars, None).unwrap();

        let mut reassembler = Reassembler::new(VARS);
        parse_with_rules(
            "<h1>{{ title }}</h1><p>{{missing}}</p><!-- {{ title }} -->",
            &mut reassembler,
            &rules,
        );
        assert_eq!(
            reassembler.into_output(),
            "<h1>Home</h1><p>{{missing}}</p><!-- {{ title }} -->"
        );
    }

    #[test]
    fn test_var_named_after_itself() {
        let vars = variables(None, &[("x".to_string(), "x".to_string())]);
        let rules = build_rules(vars, None).unwrap();

        let mut reassembler = Reassembler::new(VARS);
        parse_with_rules("[{{ x }}]", &mut reassembler, &rules);
        assert_eq!(reassembler.into_output(), "[x]");
    }
}

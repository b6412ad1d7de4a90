//! Rule sets: identifier patterns and the ordered data-element table.
//!
//! A [`RuleSpec`] is the configuration form (every field optional, JSON
//! deserializable); [`Rules`] is the compiled form the scanner runs on.
//! Caller specs are deep-merged onto [`RuleSpec::defaults`] before compiling,
//! so adding a data element never requires restating the built-ins.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use regex::{Match, Regex};
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use tagstream_common::{Merge, Pattern, PatternError, PatternFlags, merge_keyed};
use thiserror::Error;

/// Key of the built-in `<!-- ... -->` rule.
pub const COMMENT: &str = "comment";
/// Key of the built-in `<![CDATA[ ... ]]>` rule.
pub const CDATA: &str = "cdata";
/// Key of the built-in `<!DOCTYPE ...>` rule.
pub const DOC_TYPE: &str = "docType";

/// Default element and attribute name pattern.
const IDENTIFIER: &str = r"[A-Za-z_][A-Za-z0-9_:.-]*";

/// Elements that never take a matching close tag.
pub const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "basefont", "br", "col", "embed", "frame", "hr", "img", "input", "isindex",
    "link", "meta", "param",
];

/// Whether `name` (compared in lowercase) is a void element.
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Content transform of a data element. `None` keeps the raw content.
pub type Transform = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Errors raised while building a rule set.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A pattern failed to compile or carried an unknown flag.
    #[error("rules.{field}: {error}")]
    Pattern {
        /// Dotted path of the offending field, e.g. `dataElements.vars.start`.
        field: String,
        /// Underlying pattern error.
        #[source]
        error: PatternError,
    },
    /// A data element ended up without a `start` or `end` after merging.
    #[error("rules.dataElements.{key}.{field} must be a string or regexp")]
    MissingDelimiter {
        /// Data element key.
        key: String,
        /// `start` or `end`.
        field: &'static str,
    },
    /// A JSON rule configuration could not be read.
    #[error("invalid rule configuration: {0}")]
    Config(#[from] serde_json::Error),
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration of one data element. Unset fields inherit on merge.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataElementSpec {
    /// Start delimiter.
    #[serde(default)]
    pub start: Option<Pattern>,
    /// End delimiter.
    #[serde(default)]
    pub end: Option<Pattern>,
    /// Content transform. Not representable in JSON.
    #[serde(skip)]
    pub data: Option<Transform>,
}

impl DataElementSpec {
    /// An empty spec; every field inherits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A spec with both delimiters set.
    #[must_use]
    pub fn delimited(start: impl Into<Pattern>, end: impl Into<Pattern>) -> Self {
        Self::new().start(start).end(end)
    }

    /// Set the start delimiter.
    #[must_use]
    pub fn start(mut self, pattern: impl Into<Pattern>) -> Self {
        self.start = Some(pattern.into());
        self
    }

    /// Set the end delimiter.
    #[must_use]
    pub fn end(mut self, pattern: impl Into<Pattern>) -> Self {
        self.end = Some(pattern.into());
        self
    }

    /// Set the content transform.
    #[must_use]
    pub fn data<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.data = Some(Arc::new(transform));
        self
    }
}

impl fmt::Debug for DataElementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataElementSpec")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("data", &self.data.as_ref().map(|_| "<transform>"))
            .finish()
    }
}

impl Merge for DataElementSpec {
    fn merge(&mut self, overrides: Self) {
        self.start.merge(overrides.start);
        self.end.merge(overrides.end);
        if overrides.data.is_some() {
            self.data = overrides.data;
        }
    }
}

/// Configuration of a whole rule set. Unset fields inherit on merge.
///
/// In JSON:
///
/// ```json
/// {
///   "name": { "regex": "[a-z]+" },
///   "dataElements": {
///     "vars": { "start": { "regex": "\\{\\{\\s*" }, "end": { "regex": "\\s*\\}\\}" } }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleSpec {
    /// Element name pattern.
    #[serde(default)]
    pub name: Option<Pattern>,
    /// Attribute name pattern.
    #[serde(default)]
    pub attribute: Option<Pattern>,
    /// Data elements in declaration order.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub data_elements: Vec<(String, DataElementSpec)>,
}

impl RuleSpec {
    /// The built-in rule set: identifier patterns plus `cdata`, `comment`
    /// and `docType`, in that order.
    #[must_use]
    pub fn defaults() -> Self {
        let doc_type_start = Pattern::Regex {
            regex: "^<!DOCTYPE ".to_string(),
            flags: PatternFlags {
                ignore_case: true,
                ..PatternFlags::default()
            },
        };
        Self {
            name: Some(Pattern::regex(IDENTIFIER)),
            attribute: Some(Pattern::regex(IDENTIFIER)),
            data_elements: vec![
                (
                    CDATA.to_string(),
                    DataElementSpec::delimited("<![CDATA[", "]]>"),
                ),
                (COMMENT.to_string(), DataElementSpec::delimited("<!--", "-->")),
                (
                    DOC_TYPE.to_string(),
                    DataElementSpec::delimited(doc_type_start, ">"),
                ),
            ],
        }
    }

    /// Read a spec from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Config`] for malformed JSON, unknown fields, or a
    /// pattern that is neither a string nor a `{ "regex", "flags" }` object.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Merge for RuleSpec {
    fn merge(&mut self, overrides: Self) {
        self.name.merge(overrides.name);
        self.attribute.merge(overrides.attribute);
        merge_keyed(&mut self.data_elements, overrides.data_elements);
    }
}

/// Deserialize a JSON object into entries, keeping document order.
fn ordered_entries<'de, D>(deserializer: D) -> Result<Vec<(String, DataElementSpec)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, DataElementSpec)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of data element rules")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, DataElementSpec>()? {
                merge_keyed(&mut entries, [entry]);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

// =============================================================================
// Compiled rules
// =============================================================================

fn compile(field: impl Into<String>, pattern: &Pattern) -> Result<Regex, RuleError> {
    pattern.compile().map_err(|error| RuleError::Pattern {
        field: field.into(),
        error,
    })
}

/// A compiled data-element rule.
#[derive(Clone)]
pub struct DataElementRule {
    key: String,
    start: Regex,
    start_at_cursor: Regex,
    end: Regex,
    data: Option<Transform>,
}

impl DataElementRule {
    fn compile(key: String, spec: DataElementSpec) -> Result<Self, RuleError> {
        let missing = |field| RuleError::MissingDelimiter {
            key: key.clone(),
            field,
        };
        let start = spec.start.ok_or_else(|| missing("start"))?;
        let end = spec.end.ok_or_else(|| missing("end"))?;

        let start_at_cursor =
            start
                .compile_anchored()
                .map_err(|error| RuleError::Pattern {
                    field: format!("dataElements.{key}.start"),
                    error,
                })?;

        Ok(Self {
            start: compile(format!("dataElements.{key}.start"), &start)?,
            end: compile(format!("dataElements.{key}.end"), &end)?,
            start_at_cursor,
            data: spec.data,
            key,
        })
    }

    /// The rule's key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Compiled start delimiter.
    #[must_use]
    pub const fn start(&self) -> &Regex {
        &self.start
    }

    /// Compiled end delimiter.
    #[must_use]
    pub const fn end(&self) -> &Regex {
        &self.end
    }

    /// The start delimiter at offset 0 of `haystack`, if it is there and non-empty.
    #[must_use]
    pub fn match_start<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        self.start_at_cursor
            .find(haystack)
            .map(|m| m.as_str())
            .filter(|start| !start.is_empty())
    }

    /// Offset of the leftmost non-empty start delimiter in `haystack`.
    #[must_use]
    pub fn find_start(&self, haystack: &str) -> Option<usize> {
        self.start
            .find_iter(haystack)
            .find(|m| !m.is_empty())
            .map(|m| m.start())
    }

    /// The leftmost end delimiter in `haystack`.
    #[must_use]
    pub fn find_end<'h>(&self, haystack: &'h str) -> Option<Match<'h>> {
        self.end.find(haystack)
    }

    /// Run the transform on `raw`. `None` if there is no transform or it
    /// declined.
    #[must_use]
    pub fn transform(&self, raw: &str) -> Option<String> {
        self.data.as_ref().and_then(|transform| transform(raw))
    }

    /// Apply the transform to `raw`, falling back to `raw` itself.
    #[must_use]
    pub fn resolve<'h>(&self, raw: &'h str) -> Cow<'h, str> {
        self.transform(raw).map_or(Cow::Borrowed(raw), Cow::Owned)
    }
}

impl fmt::Debug for DataElementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataElementRule")
            .field("key", &self.key)
            .field("start", &self.start.as_str())
            .field("end", &self.end.as_str())
            .finish_non_exhaustive()
    }
}

/// A compiled, immutable rule set.
#[derive(Debug, Clone)]
pub struct Rules {
    name: Regex,
    attribute: Regex,
    data_elements: Vec<DataElementRule>,
}

impl Rules {
    /// Start building a rule set from the built-in defaults.
    #[must_use]
    pub fn builder() -> RulesBuilder {
        RulesBuilder::default()
    }

    /// Merge `spec` onto the defaults and compile.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if a pattern fails to compile or a new data
    /// element lacks a delimiter.
    pub fn from_spec(spec: RuleSpec) -> Result<Self, RuleError> {
        let mut full = RuleSpec::defaults();
        full.merge(spec);
        Self::compile(full)
    }

    /// Read a spec from JSON, merge it onto the defaults and compile.
    ///
    /// # Errors
    ///
    /// See [`RuleSpec::from_json`] and [`Rules::from_spec`].
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        Self::from_spec(RuleSpec::from_json(json)?)
    }

    fn compile(spec: RuleSpec) -> Result<Self, RuleError> {
        let name = spec.name.unwrap_or_else(|| Pattern::regex(IDENTIFIER));
        let attribute = spec.attribute.unwrap_or_else(|| Pattern::regex(IDENTIFIER));
        let data_elements: Vec<DataElementRule> = spec
            .data_elements
            .into_iter()
            .map(|(key, element)| DataElementRule::compile(key, element))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            name: compile("name", &name)?,
            attribute: compile("attribute", &attribute)?,
            data_elements,
        })
    }

    /// Element name pattern.
    #[must_use]
    pub const fn name(&self) -> &Regex {
        &self.name
    }

    /// Attribute name pattern.
    #[must_use]
    pub const fn attribute(&self) -> &Regex {
        &self.attribute
    }

    /// Data-element rules in declaration order.
    #[must_use]
    pub fn data_elements(&self) -> &[DataElementRule] {
        &self.data_elements
    }

    /// The data-element rule registered under `key`.
    #[must_use]
    pub fn data_element(&self, key: &str) -> Option<&DataElementRule> {
        self.data_elements.iter().find(|rule| rule.key == key)
    }

    /// Whether `c` can start an element name.
    #[must_use]
    pub fn is_name_start(&self, c: char) -> bool {
        self.name.is_match(c.encode_utf8(&mut [0; 4]))
    }

    /// Whether `c` can start an attribute name.
    #[must_use]
    pub fn is_attribute_start(&self, c: char) -> bool {
        self.attribute.is_match(c.encode_utf8(&mut [0; 4]))
    }
}

impl Default for Rules {
    fn default() -> Self {
        // The built-in patterns are fixed and known to compile.
        Self::compile(RuleSpec::defaults()).expect("built-in rules compile")
    }
}

/// Builder for [`Rules`], merging every call onto the built-in defaults.
#[derive(Debug, Default)]
pub struct RulesBuilder {
    spec: RuleSpec,
}

impl RulesBuilder {
    /// Override the element name pattern.
    #[must_use]
    pub fn name(mut self, pattern: impl Into<Pattern>) -> Self {
        self.spec.name = Some(pattern.into());
        self
    }

    /// Override the attribute name pattern.
    #[must_use]
    pub fn attribute(mut self, pattern: impl Into<Pattern>) -> Self {
        self.spec.attribute = Some(pattern.into());
        self
    }

    /// Add a data element, or merge into an existing one with the same key.
    #[must_use]
    pub fn data_element(mut self, key: impl Into<String>, spec: DataElementSpec) -> Self {
        merge_keyed(&mut self.spec.data_elements, [(key.into(), spec)]);
        self
    }

    /// Merge a whole spec, e.g. one read from JSON.
    #[must_use]
    pub fn merge(mut self, spec: RuleSpec) -> Self {
        self.spec.merge(spec);
        self
    }

    /// Compile the merged rules.
    ///
    /// # Errors
    ///
    /// See [`Rules::from_spec`].
    pub fn build(self) -> Result<Rules, RuleError> {
        Rules::from_spec(self.spec)
    }
}

//! Read and write the YAML frontmatter block at the head of a note.
//!
//! The block runs from a first line of three or more `-` to the next such
//! line. Location is a plain two-pass line scan: the opening delimiter must be
//! the note's first line, the closing one is the next delimiter line after it.
//! Delimiter-looking lines further down the body (horizontal rules) are never
//! taken for a second block. Only the block is rewritten; every other byte of
//! the note is carried over unchanged.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::ops::Range;
use std::sync::LazyLock;

pub const ALIASES_KEY: &str = "aliases";
/// Singular spelling some notes use instead of `aliases`
const ALIAS_KEY: &str = "alias";
/// Aliases as they were before the first inflection run
pub const INFLECTABLE_ALIASES_KEY: &str = "alinf-inflectable-aliases";
pub const INCLUDE_PLURAL_KEY: &str = "alinf-include-plural";
pub const INFLECT_FILE_NAME_KEY: &str = "alinf-inflect-file-name";

const BOM: char = '\u{feff}';

static DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-{3,}[ \t]*\r?$").unwrap());

/// Parsed frontmatter: an ordered mapping, unknown keys kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    fields: Mapping,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(fields: Mapping) -> Self {
        Self { fields }
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Value of `key` if it is a YAML boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// Value of `key` read as a list of names: a sequence, or a
    /// comma-separated string. `None` when the key is absent.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        self.fields.get(key).map(names_from_value)
    }

    /// Current aliases (`aliases`, else `alias`); empty when neither is set.
    pub fn aliases(&self) -> Vec<String> {
        self.string_list(ALIASES_KEY)
            .or_else(|| self.string_list(ALIAS_KEY))
            .unwrap_or_default()
    }

    /// The saved pre-inflection aliases, if a snapshot exists.
    pub fn inflectable_aliases(&self) -> Option<Vec<String>> {
        self.string_list(INFLECTABLE_ALIASES_KEY)
    }

    /// Set `key` to a sequence of strings. An existing key keeps its position.
    pub fn set_string_list(&mut self, key: &str, values: &[String]) {
        let seq = values.iter().cloned().map(Value::String).collect();
        self.fields
            .insert(Value::String(key.to_string()), Value::Sequence(seq));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.fields
            .insert(Value::String(key.to_string()), Value::Bool(value));
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn names_from_value(value: &Value) -> Vec<String> {
    let names: Vec<String> = match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        Value::String(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    };
    names
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .collect()
}

/// Where the block sits in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockSpan {
    /// Start of the opening delimiter
    start: usize,
    /// End of the closing delimiter (its line break is not part of the block)
    end: usize,
    /// YAML between the delimiters
    content: Range<usize>,
}

fn is_delimiter(line: &str) -> bool {
    DELIMITER_RE.is_match(line)
}

/// (start offset, line without '\n', offset of the next line)
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str, usize)> {
    text.split_inclusive('\n').scan(0usize, |offset, raw| {
        let start = *offset;
        *offset += raw.len();
        Some((start, raw.strip_suffix('\n').unwrap_or(raw), *offset))
    })
}

fn locate_block(document: &str) -> Option<BlockSpan> {
    let skip = if document.starts_with(BOM) { BOM.len_utf8() } else { 0 };
    let text = &document[skip..];
    let mut lines = lines_with_offsets(text);

    // Pass 1: the opening delimiter is the first line
    let (_, first, content_start) = lines.next()?;
    if !is_delimiter(first) {
        return None;
    }

    // Pass 2: the next delimiter line closes the block
    lines
        .find(|(_, line, _)| is_delimiter(line))
        .map(|(line_start, line, _)| BlockSpan {
            start: skip,
            end: skip + line_start + line.len(),
            content: skip + content_start..skip + line_start,
        })
}

fn decode(yaml: &str) -> Result<Frontmatter, String> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::new());
    }
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(fields)) => Ok(Frontmatter::from_mapping(fields)),
        Ok(Value::Null) => Ok(Frontmatter::new()),
        Ok(_) => Err("Frontmatter is not a key/value mapping".to_string()),
        Err(e) => Err(format!("Failed to parse frontmatter: {}", e)),
    }
}

fn encode(frontmatter: &Frontmatter) -> Result<String, String> {
    if frontmatter.is_empty() {
        return Ok(String::new());
    }
    serde_yaml::to_string(frontmatter.as_mapping())
        .map_err(|e| format!("Failed to serialize frontmatter: {}", e))
}

/// Parse the frontmatter of `document`. A missing block is an empty mapping;
/// a block that is not valid YAML or not a mapping is an error.
pub fn try_extract(document: &str) -> Result<Frontmatter, String> {
    match locate_block(document) {
        Some(span) => decode(&document[span.content]),
        None => Ok(Frontmatter::new()),
    }
}

/// Lenient `try_extract`: malformed blocks give an empty mapping.
pub fn extract(document: &str) -> Frontmatter {
    try_extract(document).unwrap_or_else(|e| {
        log::warn!("[FRONTMATTER] {}, treating as empty", e);
        Frontmatter::new()
    })
}

/// Write `frontmatter` into `document`, replacing the existing block or
/// prepending a new one.
pub fn merge(document: &str, frontmatter: &Frontmatter) -> Result<String, String> {
    let yaml = encode(frontmatter)?;
    let updated = match locate_block(document) {
        Some(span) => format!(
            "{}---\n{}---{}",
            &document[..span.start],
            yaml,
            &document[span.end..]
        ),
        None => format!("---\n{}---\n{}", yaml, document),
    };
    Ok(updated)
}

/// Merge and report whether the document text changed.
pub fn apply_metadata(document: &str, frontmatter: &Frontmatter) -> Result<(String, bool), String> {
    let updated = merge(document, frontmatter)?;
    let changed = updated != document;
    Ok((updated, changed))
}

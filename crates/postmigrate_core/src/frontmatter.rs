//! Ordered front-matter block: building, rendering, and reading it back.

use std::borrow::Cow;

use anyhow::{Context, Result, bail};
use serde_yaml::{Mapping, Value};

pub const DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontValue {
    /// Rendered after `key: `, double-quoted only when the plain form would
    /// not read back as the same value.
    Scalar(String),
    /// Rendered as a quoted lowercase string.
    Flag(bool),
    /// Rendered as indented, quoted bullet lines.
    List(Vec<String>),
}

impl FrontValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

/// Key order is insertion order and is part of the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    entries: Vec<(String, FrontValue)>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the end, or replace in place when the key already exists.
    pub fn set(&mut self, key: &str, value: FrontValue) {
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FrontValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(DELIMITER);
        output.push('\n');
        for (key, value) in &self.entries {
            render_entry(&mut output, key, value);
        }
        output.push_str(DELIMITER);
        output.push('\n');
        output
    }
}

fn render_entry(output: &mut String, key: &str, value: &FrontValue) {
    match value {
        FrontValue::Scalar(value) => {
            output.push_str(&format!("{key}: {}\n", render_scalar(value)));
        }
        FrontValue::Flag(flag) => {
            output.push_str(&format!("{key}: \"{flag}\"\n"));
        }
        FrontValue::List(items) => {
            output.push_str(&format!("{key}: \n"));
            for item in items {
                output.push_str(&format!("  - {}\n", double_quoted(item)));
            }
        }
    }
}

fn render_scalar(value: &str) -> Cow<'_, str> {
    if reads_back_plain(value) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(double_quoted(value))
    }
}

/// Whether YAML reads the unquoted value back as written.
fn reads_back_plain(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if value.contains(['\n', '\r']) {
        return false;
    }
    match serde_yaml::from_str::<Value>(value) {
        Ok(Value::String(parsed)) => parsed == value || is_double_quoted(value),
        Ok(Value::Bool(_) | Value::Number(_)) => true,
        _ => false,
    }
}

fn is_double_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

fn double_quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Quote a free-text value so it stays a single YAML scalar.
pub fn quote_scalar(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "'"))
}

/// A document split at its front-matter delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub front_matter: &'a str,
    pub body: &'a str,
}

/// Split `---\n<block>\n---\n<body>`. Returns `None` without a leading block.
pub fn split_document(document: &str) -> Option<SplitDocument<'_>> {
    let rest = document
        .strip_prefix("---\n")
        .or_else(|| document.strip_prefix("---\r\n"))?;
    if let Some(body) = rest.strip_prefix("---\n") {
        return Some(SplitDocument {
            front_matter: "",
            body,
        });
    }
    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some(SplitDocument {
                front_matter: &rest[..offset],
                body: &rest[offset + line.len()..],
            });
        }
        offset += line.len();
    }
    None
}

/// Parse the front-matter block of `document` into an ordered YAML mapping.
pub fn parse_front_matter(document: &str) -> Result<Mapping> {
    let Some(split) = split_document(document) else {
        bail!("document has no front matter block");
    };
    if split.front_matter.trim().is_empty() {
        return Ok(Mapping::new());
    }
    serde_yaml::from_str(split.front_matter).context("failed to parse front matter YAML")
}

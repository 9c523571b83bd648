//! Defines [`FrontMatter`] and [`split`], which separates a source document
//! into its YAML metadata block and its markdown body.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

const FENCE: &str = "---";

/// The metadata block at the top of a source document. Every field is
/// optional; scalar fields accept strings, numbers or booleans.
#[derive(Debug, Default, Deserialize)]
pub struct FrontMatter {
    #[serde(default)]
    title: Value,

    #[serde(default)]
    date: Value,

    #[serde(default)]
    description: Value,

    #[serde(default)]
    category: Value,

    #[serde(default)]
    tags: Value,

    /// Keys folio doesn't interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FrontMatter {
    pub fn title(&self) -> Option<String> {
        scalar_to_string(&self.title)
    }

    pub fn description(&self) -> Option<String> {
        scalar_to_string(&self.description)
    }

    pub fn category(&self) -> Option<String> {
        scalar_to_string(&self.category)
    }

    /// Returns the tags in declaration order. Duplicates are kept. A `tags`
    /// value that isn't a sequence yields no tags.
    pub fn tags(&self) -> Vec<String> {
        match &self.tags {
            Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
            _ => Vec::new(),
        }
    }

    /// Parses the `date` field. Date-only and zone-less values are taken to be
    /// UTC. A missing or empty date is `Ok(None)`.
    pub fn date(&self) -> Result<Option<DateTime<Utc>>> {
        match scalar_to_string(&self.date) {
            None => Ok(None),
            Some(raw) => parse_date(&raw).map(Some),
        }
    }
}

/// Splits `input` into its front matter and body. A document that doesn't
/// start with a `---` line has empty front matter and the whole text as its
/// body.
pub fn split(input: &str) -> Result<(FrontMatter, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let after_open = match strip_fence_line(input) {
        Some(rest) => rest,
        None => return Ok((FrontMatter::default(), input)),
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok((parse_yaml(yaml)?, body));
        }
        offset += line.len();
    }
    Err(Error::Unterminated)
}

/// If `input` opens with a fence line, returns the text after it.
fn strip_fence_line(input: &str) -> Option<&str> {
    let rest = input.strip_prefix(FENCE)?;
    let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
    if rest[..line_end].trim().is_empty() {
        Some(&rest[line_end..])
    } else {
        None
    }
}

fn parse_yaml(yaml: &str) -> Result<FrontMatter> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Ok(FrontMatter::default()),
        value @ Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
        _ => Err(Error::NotAMapping),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    match s.is_empty() {
        true => None,
        false => Some(s),
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Ok(date.and_time(chrono::NaiveTime::MIN).and_utc()),
        Err(_) => Err(Error::Date(raw.to_owned())),
    }
}

/// The result of a fallible front matter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem parsing front matter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the opening `---` has no matching closing line.
    #[error("Missing closing `---` for front matter")]
    Unterminated,

    /// Returned when the front matter is valid YAML but not a mapping.
    #[error("Front matter must be a mapping of keys to values")]
    NotAMapping,

    /// Returned for malformed YAML.
    #[error("Invalid front matter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Returned when `date` isn't in a recognized format.
    #[error("Unrecognized date `{0}`")]
    Date(String),
}

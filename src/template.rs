//! Defines [`Template`], a flat `{{ key }}` substitution template. There are
//! no conditionals, loops, or includes: callers pre-build any conditional
//! HTML and pass it in as a value.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").unwrap())
}

/// The values substituted into a [`Template`], keyed by placeholder name.
pub type Values<'a> = HashMap<&'a str, &'a str>;

/// A loaded HTML template.
#[derive(Clone, Debug)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Template {
            source: source.into(),
        }
    }

    /// Reads a template from disk.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(source) => Ok(Template::new(source)),
            Err(err) => Err(Error {
                path: path.to_owned(),
                err,
            }),
        }
    }

    /// Replaces every `{{ key }}` (whitespace inside the braces is optional)
    /// whose key is in `values` with the corresponding value, verbatim. Keys
    /// are limited to ASCII letters, digits, `_`, `.` and `-`; a placeholder
    /// using any other character is never substituted, even if `values` has
    /// an entry for it.
    /// Placeholders with no value are left untouched and values not named by
    /// any placeholder are ignored. Substitution is a single pass, so a value
    /// that itself contains `{{ ... }}` is not expanded again.
    pub fn apply(&self, values: &Values) -> String {
        placeholder()
            .replace_all(&self.source, |caps: &Captures| match values.get(&caps[1]) {
                Some(value) => (*value).to_owned(),
                None => caps[0].to_owned(),
            })
            .into_owned()
    }
}

/// The result of loading a template.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when a template file can't be read.
#[derive(Debug, thiserror::Error)]
#[error("Opening template file '{}': {}", .path.display(), .err)]
pub struct Error {
    pub path: PathBuf,
    #[source]
    pub err: std::io::Error,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_apply_replaces_every_occurrence() {
        let t = Template::new("<title>{{title}}</title><h1>{{ title }}</h1>{{  title\t}}");
        let values: Values = [("title", "Hi")].into_iter().collect();
        assert_eq!(t.apply(&values), "<title>Hi</title><h1>Hi</h1>Hi");
    }

    #[test]
    fn test_apply_leaves_unknown_placeholders() {
        let t = Template::new("{{ siteName }} - {{ missing }}");
        let values: Values = [("siteName", "Site"), ("unused", "x")].into_iter().collect();
        assert_eq!(t.apply(&values), "Site - {{ missing }}");
    }

    #[test]
    fn test_apply_is_literal() {
        let t = Template::new("{{ content }}|{{ title }}");
        let values: Values = [("content", "<p>$1 {{ title }} $&</p>"), ("title", "T")]
            .into_iter()
            .collect();
        assert_eq!(t.apply(&values), "<p>$1 {{ title }} $&</p>|T");
    }

    #[test]
    fn test_apply_key_charset() {
        let t = Template::new("{{ page.title }}|{{ og-type }}|{{ has space }}|{{ café }}");
        let values: Values = [
            ("page.title", "T"),
            ("og-type", "article"),
            ("has space", "x"),
            ("café", "y"),
        ]
        .into_iter()
        .collect();
        assert_eq!(t.apply(&values), "T|article|{{ has space }}|{{ café }}");
    }

    #[test]
    fn test_apply_empty_values() {
        let t = Template::new("a {{ x }} b");
        assert_eq!(t.apply(&Values::new()), "a {{ x }} b");
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Template::load(&dir.path().join("missing.html")).unwrap_err();
        assert!(err.to_string().contains("missing.html"));
    }
}

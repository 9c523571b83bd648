//! Defines [`slugify`], which turns display text (titles, category and tag
//! names, file stems) into the lowercase, hyphenated path segments used in
//! every generated URL.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();
static HYPHEN_RUN: OnceLock<Regex> = OnceLock::new();

fn whitespace_run() -> &'static Regex {
    WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn hyphen_run() -> &'static Regex {
    HYPHEN_RUN.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Returns true for the characters a slug may retain: ASCII letters and
/// digits, CJK unified ideographs, whitespace (later turned into hyphens) and
/// hyphens.
fn is_kept(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_digit()
        || ('\u{4e00}'..='\u{9fa5}').contains(&c)
        || c.is_whitespace()
        || c == '-'
}

/// Converts `text` into a URL-safe slug.
///
/// The text is lowercased, every character other than a Latin letter, a
/// digit, a CJK ideograph, whitespace or a hyphen is dropped, whitespace runs
/// become single hyphens, hyphen runs collapse to one, and leading/trailing
/// hyphens are trimmed. Empty input yields the empty string.
///
/// ```
/// use folio::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Rust -- 笔记 "), "rust-笔记");
/// ```
pub fn slugify(text: &str) -> String {
    let kept: String = text.to_lowercase().chars().filter(|&c| is_kept(c)).collect();
    let hyphenated = whitespace_run().replace_all(&kept, "-");
    let collapsed = hyphen_run().replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Rust Programming 101"), "rust-programming-101");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("C++ & Rust: a comparison"), "c-rust-a-comparison");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("node.js"), "nodejs");
    }

    #[test]
    fn test_slugify_drops_accented_latin() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn test_slugify_keeps_cjk() {
        assert_eq!(slugify("学习 Rust"), "学习-rust");
        assert_eq!(slugify("随笔"), "随笔");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("a   b\t\nc"), "a-b-c");
        assert_eq!(slugify("a---b"), "a-b");
        assert_eq!(slugify("a - - b"), "a-b");
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("--hello--"), "hello");
        assert_eq!(slugify("  !hello!  "), "hello");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(" - "), "");
    }

    #[test]
    fn test_slugify_idempotent() {
        for input in [
            "Hello World",
            "  --Mixed  CASE -- text-- ",
            "学习 Rust 2024!",
            "a_b_c",
            "Ünïcödé Fun",
            "",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_slugify_has_no_stray_hyphens() {
        for input in ["- a -", "a -- b", "---", "x - y - z", " 中文 -- 标签 "] {
            let slug = slugify(input);
            assert!(!slug.starts_with('-'), "{:?}", slug);
            assert!(!slug.ends_with('-'), "{:?}", slug);
            assert!(!slug.contains("--"), "{:?}", slug);
        }
    }
}

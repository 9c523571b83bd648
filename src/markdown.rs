//! Converts markdown bodies to HTML. The [`Render`] trait is the seam the
//! build depends on; [`MarkdownRenderer`] is the default implementation,
//! backed by [`pulldown_cmark`] with [`syntect`] highlighting for fenced code
//! blocks.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tracing::debug;

/// The theme used when none is configured or the configured one is unknown.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Renders a document body to HTML. Implementations are handed to
/// [`crate::build::Builder`] at construction time.
pub trait Render {
    fn render(&self, markdown: &str) -> Result<String>;
}

/// The standard renderer: CommonMark plus tables, footnotes, strikethrough,
/// task lists and smart punctuation, with highlighted code blocks.
pub struct MarkdownRenderer {
    options: Options,
    theme: &'static Theme,
}

impl MarkdownRenderer {
    /// Creates a renderer that highlights code with `theme_name`, falling
    /// back to [`DEFAULT_THEME`] if syntect doesn't ship that theme.
    pub fn new(theme_name: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        Self::with_options(theme_name, options)
    }

    /// Like [`MarkdownRenderer::new`] but with caller-chosen parser options.
    pub fn with_options(theme_name: &str, options: Options) -> Self {
        let themes = &theme_set().themes;
        let theme = match themes.get(theme_name) {
            Some(theme) => theme,
            None => {
                debug!(theme = theme_name, "unknown highlight theme, using default");
                &themes[DEFAULT_THEME]
            }
        };
        MarkdownRenderer { options, theme }
    }

    /// Highlights `code` if syntect knows `lang`, by token or by extension.
    fn highlight(&self, code: &str, lang: &str) -> Option<String> {
        let ss = syntax_set();
        let syntax = ss
            .find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_extension(lang))?;
        match highlighted_html_for_string(code, ss, syntax, self.theme) {
            Ok(html) => Some(html),
            Err(err) => {
                debug!(lang, %err, "highlighting failed, emitting plain block");
                None
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        MarkdownRenderer::new(DEFAULT_THEME)
    }
}

impl Render for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String> {
        let mut events: Vec<Event> = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => language_token(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, buffer)) = code.as_mut() {
                        buffer.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buffer)) = code.take() {
                        match lang.as_deref().and_then(|lang| self.highlight(&buffer, lang)) {
                            Some(block) => events.push(Event::Html(CowStr::from(block))),
                            None => {
                                // pulldown-cmark escapes the text and adds the
                                // `language-*` class.
                                let info = CowStr::from(lang.unwrap_or_default());
                                events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))));
                                events.push(Event::Text(CowStr::from(buffer)));
                                events.push(Event::End(TagEnd::CodeBlock));
                            }
                        }
                    }
                }
                event => events.push(event),
            }
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        Ok(output)
    }
}

/// Extracts the language from a fence info string such as `rust,ignore` or
/// `python title="x"`.
fn language_token(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to render a document body. The standard renderer
/// never fails; custom [`Render`] implementations use [`Error::Custom`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Rendering markdown: {0}")]
    Custom(String),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_heading() -> Result<()> {
        let html = MarkdownRenderer::default().render("# Hi")?;
        assert_eq!(html.trim(), "<h1>Hi</h1>");
        Ok(())
    }

    #[test]
    fn test_render_extensions() -> Result<()> {
        let html = MarkdownRenderer::default().render("~~gone~~\n\n| a |\n|---|\n| 1 |\n")?;
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
        Ok(())
    }

    #[test]
    fn test_render_known_language_is_highlighted() -> Result<()> {
        let html = MarkdownRenderer::default().render("```rust\nfn main() {}\n```\n")?;
        assert!(html.contains("<pre style="), "{}", html);
        assert!(html.contains("main"));
        assert!(!html.contains("language-rust"));
        Ok(())
    }

    #[test]
    fn test_render_unknown_language_falls_back() -> Result<()> {
        let html = MarkdownRenderer::default().render("```nosuchlang\nx < y\n```\n")?;
        assert!(html.contains("<pre><code class=\"language-nosuchlang\">x &lt; y\n</code></pre>"));
        Ok(())
    }

    #[test]
    fn test_render_unknown_language_with_attributes() -> Result<()> {
        let html = MarkdownRenderer::default().render("```nosuchlang,ignore\na & b\n```\n")?;
        assert!(html.contains(
            "<pre><code class=\"language-nosuchlang\">a &amp; b\n</code></pre>"
        ));
        Ok(())
    }

    #[test]
    fn test_render_indented_block_is_plain() -> Result<()> {
        let html = MarkdownRenderer::default().render("    <i>\n")?;
        assert!(html.contains("<pre><code>&lt;i&gt;\n</code></pre>"));
        Ok(())
    }

    #[test]
    fn test_render_unlabelled_block_is_plain() -> Result<()> {
        let html = MarkdownRenderer::default().render("```\n<b>\n```\n")?;
        assert!(html.contains("<pre><code>&lt;b&gt;\n</code></pre>"));
        Ok(())
    }

    #[test]
    fn test_unknown_theme_uses_default() -> Result<()> {
        let html = MarkdownRenderer::new("no-such-theme").render("```rust\nlet x = 1;\n```\n")?;
        assert!(html.contains("<pre style="));
        Ok(())
    }

    #[test]
    fn test_language_token() {
        assert_eq!(language_token("rust,ignore").as_deref(), Some("rust"));
        assert_eq!(language_token("python title=\"x\"").as_deref(), Some("python"));
        assert_eq!(language_token(""), None);
    }
}

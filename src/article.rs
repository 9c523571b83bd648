//! Defines [`Article`], the normalized record kept for every successfully
//! rendered document, along with the shared ordering rule ([`sort`]), the
//! archive kinds ([`ArchiveKind`]) and the distinct category/tag sets
//! ([`Taxonomy`]).

use crate::slug::slugify;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// One rendered document.
#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    /// The page's path relative to the output root, always `/`-separated and
    /// prefixed with `./` (e.g., `./notes/hello.html`).
    pub url: String,

    /// The front matter title, or the source file's base name.
    pub title: String,

    /// Absent dates sort after every dated article.
    pub date: Option<DateTime<Utc>>,

    /// Empty when the front matter has none.
    pub description: String,

    pub category: Option<String>,

    /// In declaration order, duplicates kept.
    pub tags: Vec<String>,

    /// The rendered body, kept for the feed.
    pub html: String,
}

impl Article {
    /// Returns the site-root-absolute path for the article, i.e. [`Article::url`]
    /// with its leading `./` replaced by `/`.
    pub fn path(&self) -> String {
        match self.url.strip_prefix("./") {
            Some(rest) => format!("/{}", rest),
            None => self.url.clone(),
        }
    }
}

/// Orders articles newest first. Undated articles count as the oldest
/// possible date; equal dates fall back to title, then URL, ascending.
pub fn compare(a: &Article, b: &Article) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.url.cmp(&b.url))
}

/// Sorts `articles` in place by [`compare`].
pub fn sort<A: std::borrow::Borrow<Article>>(articles: &mut [A]) {
    articles.sort_by(|a, b| compare(a.borrow(), b.borrow()));
}

/// The two kinds of archive page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveKind {
    Category,
    Tag,
}

impl ArchiveKind {
    /// The directory under the output root that holds this kind of archive.
    pub fn dir_name(self) -> &'static str {
        match self {
            ArchiveKind::Category => "category",
            ArchiveKind::Tag => "tag",
        }
    }

    /// The heading shown on an archive page for `name`.
    pub fn title(self, name: &str) -> String {
        match self {
            ArchiveKind::Category => format!("Category: {}", name),
            ArchiveKind::Tag => format!("Tag: #{}", name),
        }
    }

    /// The site-root-absolute path for the archive of `name`, e.g.
    /// `/tag/rust/`.
    pub fn path(self, name: &str) -> String {
        format!("/{}/{}/", self.dir_name(), slugify(name))
    }

    /// Whether `article` belongs in the archive for `name`. Matching is by
    /// exact string equality, before slugification.
    pub fn contains(self, article: &Article, name: &str) -> bool {
        match self {
            ArchiveKind::Category => article.category.as_deref() == Some(name),
            ArchiveKind::Tag => article.tags.iter().any(|tag| tag == name),
        }
    }
}

/// The distinct, non-empty category and tag names across a set of articles,
/// each sorted ascending.
#[derive(Debug, Default, PartialEq)]
pub struct Taxonomy {
    pub categories: BTreeSet<String>,
    pub tags: BTreeSet<String>,
}

impl Taxonomy {
    pub fn collect(articles: &[Article]) -> Self {
        let mut taxonomy = Taxonomy::default();
        for article in articles {
            if let Some(category) = article.category.as_ref().filter(|c| !c.is_empty()) {
                taxonomy.categories.insert(category.clone());
            }
            for tag in article.tags.iter().filter(|t| !t.is_empty()) {
                taxonomy.tags.insert(tag.clone());
            }
        }
        taxonomy
    }

    /// Iterates over every archive as a `(kind, name)` pair, categories first.
    pub fn archives(&self) -> impl Iterator<Item = (ArchiveKind, &str)> {
        self.categories
            .iter()
            .map(|c| (ArchiveKind::Category, c.as_str()))
            .chain(self.tags.iter().map(|t| (ArchiveKind::Tag, t.as_str())))
    }
}

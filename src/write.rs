use crate::article::{self, ArchiveKind, Article, Taxonomy};
use crate::config::Config;
use crate::template::{Template, Values};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Composes post, index and archive pages from their templates and writes
/// them under the output directory.
pub struct Writer<'a> {
    pub config: &'a Config,

    /// Receives `siteName`, `content`, `title`, `description`, `dateHtml`,
    /// `categoryHtml` and `tagsHtml`.
    pub post_template: &'a Template,

    /// Receives `siteName`, `articleListHtml`, `categoriesListHtml` and
    /// `tagsListHtml`.
    pub index_template: &'a Template,

    /// Receives `siteName`, `archiveTitle` and `articleListHtml`.
    pub archive_template: &'a Template,
}

impl Writer<'_> {
    /// Composes the page for a single article.
    pub fn render_post(&self, article: &Article) -> String {
        let date_html = match article.date {
            Some(date) => format!("<span>Published: {}</span>", date.format(DATE_FORMAT)),
            None => String::new(),
        };
        let category_html = match &article.category {
            Some(category) => format!(
                "<span>Category: <a href=\"{}\">{}</a></span>",
                ArchiveKind::Category.path(category),
                category
            ),
            None => String::new(),
        };
        let tags_html = match article.tags.is_empty() {
            true => String::new(),
            false => format!(
                "<span>Tags: {}</span>",
                article
                    .tags
                    .iter()
                    .map(|tag| format!("<a href=\"{}\">{}</a>", ArchiveKind::Tag.path(tag), tag))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };

        let values: Values = [
            ("siteName", self.config.site_name.as_str()),
            ("content", article.html.as_str()),
            ("title", article.title.as_str()),
            ("description", article.description.as_str()),
            ("dateHtml", date_html.as_str()),
            ("categoryHtml", category_html.as_str()),
            ("tagsHtml", tags_html.as_str()),
        ]
        .into_iter()
        .collect();
        self.post_template.apply(&values)
    }

    /// Writes an article's page to `file_path`, creating parent directories
    /// as needed.
    pub fn write_post(&self, article: &Article, file_path: &Path) -> Result<()> {
        write_file(file_path, &self.render_post(article))
    }

    /// Composes the home page: every article, newest first, plus links to
    /// every category and tag archive.
    pub fn render_index(&self, articles: &[Article], taxonomy: &Taxonomy) -> String {
        let mut sorted: Vec<&Article> = articles.iter().collect();
        article::sort(&mut sorted);

        let categories_html = link_list(
            "Categories",
            ArchiveKind::Category,
            taxonomy.categories.iter(),
        );
        let tags_html = link_list("Tags", ArchiveKind::Tag, taxonomy.tags.iter());
        let list_html = article_list(&sorted);

        let values: Values = [
            ("siteName", self.config.site_name.as_str()),
            ("articleListHtml", list_html.as_str()),
            ("categoriesListHtml", categories_html.as_str()),
            ("tagsListHtml", tags_html.as_str()),
        ]
        .into_iter()
        .collect();
        self.index_template.apply(&values)
    }

    /// Writes `index.html` at the output root and returns its path.
    pub fn write_index(&self, articles: &[Article], taxonomy: &Taxonomy) -> Result<PathBuf> {
        info!("Generating index page");
        let path = self.config.output_directory.join("index.html");
        write_file(&path, &self.render_index(articles, taxonomy))?;
        Ok(path)
    }

    /// Composes the archive page for one category or tag. Only articles that
    /// [`ArchiveKind::contains`] are listed.
    pub fn render_archive(&self, kind: ArchiveKind, name: &str, articles: &[Article]) -> String {
        let mut matching: Vec<&Article> = articles
            .iter()
            .filter(|article| kind.contains(article, name))
            .collect();
        article::sort(&mut matching);

        let title = kind.title(name);
        let list_html = article_list(&matching);
        let values: Values = [
            ("siteName", self.config.site_name.as_str()),
            ("archiveTitle", title.as_str()),
            ("articleListHtml", list_html.as_str()),
        ]
        .into_iter()
        .collect();
        self.archive_template.apply(&values)
    }

    /// Writes `{output}/{kind}/{slug}/index.html` and returns its path.
    pub fn write_archive(
        &self,
        kind: ArchiveKind,
        name: &str,
        articles: &[Article],
    ) -> Result<PathBuf> {
        info!(kind = kind.dir_name(), name, "Generating archive page");
        let path = archive_file_path(&self.config.output_directory, kind, name);
        write_file(&path, &self.render_archive(kind, name, articles))?;
        Ok(path)
    }
}

/// The output file for an archive page.
pub fn archive_file_path(output_directory: &Path, kind: ArchiveKind, name: &str) -> PathBuf {
    output_directory
        .join(kind.dir_name())
        .join(crate::slug::slugify(name))
        .join("index.html")
}

/// Renders `articles`, in the order given, as a `<ul>` of list items.
fn article_list(articles: &[&Article]) -> String {
    let mut html = String::from("<ul>\n");
    for article in articles {
        let _ = write!(
            html,
            "<li class=\"article-list-item\">\n    <h3><a href=\"{}\">{}</a></h3>\n",
            article.path(),
            article.title
        );
        if !article.description.is_empty() {
            let _ = writeln!(html, "    <p>{}</p>", article.description);
        }
        html.push_str("    <p>\n");
        if let Some(date) = article.date {
            let _ = writeln!(html, "      <small>Published: {}</small>", date.format(DATE_FORMAT));
        }
        if let Some(category) = &article.category {
            let _ = writeln!(html, "      <small>Category: {}</small>", category);
        }
        if !article.tags.is_empty() {
            let _ = writeln!(html, "      <small>Tags: {}</small>", article.tags.join(", "));
        }
        html.push_str("    </p>\n</li>\n");
    }
    html.push_str("</ul>");
    html
}

/// Renders a headed `<ul>` of archive links, or nothing when there are no
/// names.
fn link_list<'a>(
    heading: &str,
    kind: ArchiveKind,
    names: impl Iterator<Item = &'a String>,
) -> String {
    let items: Vec<String> = names
        .map(|name| format!("<li><a href=\"{}\">{}</a></li>", kind.path(name), name))
        .collect();
    match items.is_empty() {
        true => String::new(),
        false => format!("<h2>{}</h2><ul>{}</ul>", heading, items.join("\n")),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    let io_err = |err| Error {
        path: path.to_owned(),
        err,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when an output page can't be written.
#[derive(Debug, thiserror::Error)]
#[error("Writing '{}': {}", .path.display(), .err)]
pub struct Error {
    pub path: PathBuf,
    #[source]
    pub err: std::io::Error,
}

//! Exports [`build_site`] and [`Builder`], which stitch together the
//! high-level steps of a build: loading templates, rendering every source
//! document into a post page ([`crate::write`]), writing the index and archive
//! pages, and emitting the sitemap ([`crate::sitemap`]) and feed
//! ([`crate::feed`]).
//!
//! A document that can't be read, parsed, rendered or written is logged and
//! skipped; it contributes nothing to the index, archives, sitemap or feed.
//! Everything else that fails aborts the build.

use crate::article::{self, Article, Taxonomy};
use crate::config::Config;
use crate::frontmatter;
use crate::markdown::{self, MarkdownRenderer, Render};
use crate::slug::slugify;
use crate::source::{self, base_name};
use crate::template::{self, Template};
use crate::write::{self, Writer};
use crate::{feed, sitemap};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Builds the site described by `config` with the standard markdown renderer.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    Builder::new(config).build()
}

/// Summarizes a finished build.
#[derive(Debug, Default, PartialEq)]
pub struct BuildReport {
    /// Files found under the source directory.
    pub documents: usize,

    /// Post pages written.
    pub articles: usize,

    /// Documents skipped because of a per-document error.
    pub skipped: Vec<PathBuf>,

    pub categories: usize,
    pub tags: usize,

    pub sitemap: Option<PathBuf>,
    pub feed: Option<PathBuf>,
}

/// Runs a build. The renderer is chosen at construction time; see
/// [`Builder::with_renderer`].
pub struct Builder<'a> {
    config: &'a Config,
    renderer: Box<dyn Render + 'a>,
}

impl<'a> Builder<'a> {
    /// Creates a builder that renders with [`MarkdownRenderer`], highlighting
    /// code with the configured theme.
    pub fn new(config: &'a Config) -> Self {
        Builder {
            config,
            renderer: Box::new(MarkdownRenderer::new(&config.highlight_theme)),
        }
    }

    /// Creates a builder that renders document bodies with `renderer`.
    pub fn with_renderer(config: &'a Config, renderer: impl Render + 'a) -> Self {
        Builder {
            config,
            renderer: Box::new(renderer),
        }
    }

    pub fn build(&self) -> Result<BuildReport> {
        let config = self.config;
        info!(source = %config.source_directory.display(), "Starting site build");

        fs::create_dir_all(&config.output_directory).map_err(|err| Error::OutputDirectory {
            path: config.output_directory.clone(),
            err,
        })?;
        let post_template = Template::load(&config.post_template)?;
        let index_template = Template::load(&config.index_template)?;
        let archive_template = Template::load(&config.archive_template)?;
        let writer = Writer {
            config,
            post_template: &post_template,
            index_template: &index_template,
            archive_template: &archive_template,
        };

        let documents = source::list_documents(&config.source_directory)?;
        info!(count = documents.len(), "Found source documents");

        let mut report = BuildReport {
            documents: documents.len(),
            ..BuildReport::default()
        };
        let mut articles: Vec<Article> = Vec::with_capacity(documents.len());
        let mut sources_by_output: HashMap<PathBuf, PathBuf> = HashMap::new();

        for document in &documents {
            let file_path = match self.output_path(document) {
                Ok(file_path) => file_path,
                Err(err) => {
                    error!(path = %document.display(), %err, "Skipping document");
                    report.skipped.push(document.clone());
                    continue;
                }
            };
            if let Some(previous) = sources_by_output.insert(file_path.clone(), document.clone()) {
                warn!(
                    path = %document.display(),
                    previous = %previous.display(),
                    output = %file_path.display(),
                    "Output path collides with an earlier document; it will be overwritten"
                );
            }

            match self.process_document(&writer, document, &file_path) {
                Ok(article) => articles.push(article),
                Err(err) => {
                    error!(path = %document.display(), %err, "Skipping document");
                    report.skipped.push(document.clone());
                }
            }
        }
        report.articles = articles.len();
        article::sort(&mut articles);

        let taxonomy = Taxonomy::collect(&articles);
        writer.write_index(&articles, &taxonomy)?;

        for (kind, name) in taxonomy.archives() {
            writer.write_archive(kind, name, &articles)?;
        }
        report.categories = taxonomy.categories.len();
        report.tags = taxonomy.tags.len();

        if articles.is_empty() {
            warn!("No articles found, skipping sitemap generation");
            warn!("No articles found, skipping RSS feed generation");
        } else {
            report.sitemap = Some(sitemap::write_sitemap(config, &articles, &taxonomy)?);
            report.feed = Some(feed::write_feed(config, &articles)?);
        }

        info!(
            articles = report.articles,
            skipped = report.skipped.len(),
            output = %config.output_directory.display(),
            "Site build finished"
        );
        Ok(report)
    }

    /// The output file for a source document:
    /// `{output}/{relative directory}/{slug of base name}.html`.
    fn output_path(&self, document: &Path) -> std::result::Result<PathBuf, DocumentError> {
        let relative = document
            .strip_prefix(&self.config.source_directory)
            .map_err(|_| DocumentError::OutsideSource(document.to_owned()))?;
        let relative_dir = relative.parent().unwrap_or_else(|| Path::new(""));
        Ok(self
            .config
            .output_directory
            .join(relative_dir)
            .join(format!("{}.html", slugify(&base_name(relative)))))
    }

    /// Reads, parses and renders one document, writes its page to
    /// `file_path`, and returns the resulting [`Article`].
    fn process_document(
        &self,
        writer: &Writer,
        document: &Path,
        file_path: &Path,
    ) -> std::result::Result<Article, DocumentError> {
        debug!(path = %document.display(), output = %file_path.display(), "Processing document");

        let raw = fs::read_to_string(document).map_err(DocumentError::Read)?;
        let (front_matter, body) = frontmatter::split(&raw)?;
        let html = self.renderer.render(body)?;

        let article = Article {
            url: site_relative_url(&self.config.output_directory, file_path),
            title: front_matter
                .title()
                .unwrap_or_else(|| base_name(document)),
            date: front_matter.date()?,
            description: front_matter.description().unwrap_or_default(),
            category: front_matter.category(),
            tags: front_matter.tags(),
            html,
        };
        writer.write_post(&article, file_path)?;
        Ok(article)
    }
}

/// Returns `file_path` relative to `output_directory` as a `./`-prefixed,
/// `/`-separated URL path regardless of the host's path separator.
fn site_relative_url(output_directory: &Path, file_path: &Path) -> String {
    let relative = file_path.strip_prefix(output_directory).unwrap_or(file_path);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("./{}", segments.join("/"))
}

/// The result of a build.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal build error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Creating output directory '{}': {}", .path.display(), .err)]
    OutputDirectory {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a template can't be loaded.
    #[error(transparent)]
    Template(#[from] template::Error),

    /// Returned when the source directory can't be enumerated.
    #[error(transparent)]
    Source(#[from] source::Error),

    /// Returned when the index or an archive page can't be written.
    #[error(transparent)]
    Write(#[from] write::Error),

    #[error(transparent)]
    Sitemap(#[from] sitemap::Error),

    #[error(transparent)]
    Feed(#[from] feed::Error),
}

/// A problem with a single document. These are logged and the document is
/// skipped; they never abort the build.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Reading document: {0}")]
    Read(#[source] std::io::Error),

    #[error(transparent)]
    FrontMatter(#[from] frontmatter::Error),

    #[error(transparent)]
    Render(#[from] markdown::Error),

    #[error(transparent)]
    Write(#[from] write::Error),

    #[error("Document '{}' is not under the source directory", .0.display())]
    OutsideSource(PathBuf),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_site_relative_url() {
        assert_eq!(
            site_relative_url(Path::new("/out"), Path::new("/out/hello.html")),
            "./hello.html"
        );
        assert_eq!(
            site_relative_url(Path::new("/out"), Path::new("/out/notes/deep/x.html")),
            "./notes/deep/x.html"
        );
    }

    #[test]
    fn test_output_path() {
        let config = Config {
            site_name: String::new(),
            site_description: String::new(),
            base_url: "https://example.org".to_owned(),
            language: "en".to_owned(),
            source_directory: PathBuf::from("/src"),
            output_directory: PathBuf::from("/out"),
            post_template: PathBuf::new(),
            index_template: PathBuf::new(),
            archive_template: PathBuf::new(),
            highlight_theme: String::new(),
            feed_ttl: 60,
        };
        let builder = Builder::new(&config);
        assert_eq!(
            builder.output_path(Path::new("/src/Hello World.md")).unwrap(),
            PathBuf::from("/out/hello-world.html")
        );
        assert_eq!(
            builder.output_path(Path::new("/src/notes/My Post!.md")).unwrap(),
            PathBuf::from("/out/notes/my-post.html")
        );
        assert!(matches!(
            builder.output_path(Path::new("/elsewhere/x.md")),
            Err(DocumentError::OutsideSource(_))
        ));
    }
}

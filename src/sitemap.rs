//! Writes `sitemap.xml`: the site root, every article, and every category and
//! tag archive, streamed entry by entry.

use crate::article::{Article, Taxonomy};
use crate::config::Config;
use chrono::SecondsFormat;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// The sitemap's file name under the output directory.
pub const FILE_NAME: &str = "sitemap.xml";

/// One `<url>` element.
struct Entry<'a> {
    path: &'a str,
    lastmod: Option<String>,
    changefreq: &'static str,
    priority: &'static str,
}

/// Writes the sitemap to `{output}/sitemap.xml` and returns its path. The
/// file is fully flushed before this returns.
pub fn write_sitemap(config: &Config, articles: &[Article], taxonomy: &Taxonomy) -> Result<PathBuf> {
    info!("Generating sitemap");
    let path = config.output_directory.join(FILE_NAME);
    let file = File::create(&path).map_err(|err| io_error(&path, err))?;
    let mut w = BufWriter::new(file);
    stream_sitemap(&mut w, config, articles, taxonomy).map_err(|err| io_error(&path, err))?;
    w.into_inner()
        .map_err(|err| io_error(&path, err.into_error()))?
        .sync_all()
        .map_err(|err| io_error(&path, err))?;
    info!(path = %path.display(), "Sitemap generated");
    Ok(path)
}

/// Streams the sitemap XML into `w`.
pub fn stream_sitemap<W: Write>(
    w: &mut W,
    config: &Config,
    articles: &[Article],
    taxonomy: &Taxonomy,
) -> std::io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(w, r#"<urlset xmlns="{}">"#, SITEMAP_NS)?;

    write_entry(
        w,
        config,
        &Entry {
            path: "/",
            lastmod: None,
            changefreq: "daily",
            priority: "1.0",
        },
    )?;

    for article in articles {
        let path = article.path();
        write_entry(
            w,
            config,
            &Entry {
                path: &path,
                lastmod: article
                    .date
                    .map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true)),
                changefreq: "weekly",
                priority: "0.8",
            },
        )?;
    }

    // Names differing only in case share an archive path.
    let mut seen = BTreeSet::new();
    for (kind, name) in taxonomy.archives() {
        let path = kind.path(name);
        if !seen.insert(path.clone()) {
            continue;
        }
        write_entry(
            w,
            config,
            &Entry {
                path: &path,
                lastmod: None,
                changefreq: "weekly",
                priority: "0.6",
            },
        )?;
    }

    writeln!(w, "</urlset>")?;
    w.flush()
}

fn write_entry<W: Write>(w: &mut W, config: &Config, entry: &Entry) -> std::io::Result<()> {
    writeln!(w, "  <url>")?;
    writeln!(w, "    <loc>{}</loc>", escape_xml(&config.absolute_url(entry.path)))?;
    if let Some(lastmod) = &entry.lastmod {
        writeln!(w, "    <lastmod>{}</lastmod>", lastmod)?;
    }
    writeln!(w, "    <changefreq>{}</changefreq>", entry.changefreq)?;
    writeln!(w, "    <priority>{}</priority>", entry.priority)?;
    writeln!(w, "  </url>")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn io_error(path: &Path, err: std::io::Error) -> Error {
    Error {
        path: path.to_owned(),
        err,
    }
}

/// The result of writing the sitemap.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when the sitemap can't be written.
#[derive(Debug, thiserror::Error)]
#[error("Writing sitemap '{}': {}", .path.display(), .err)]
pub struct Error {
    pub path: PathBuf,
    #[source]
    pub err: std::io::Error,
}

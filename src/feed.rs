//! Support for creating the RSS feed from the finished article collection.

use crate::article::Article;
use crate::config::Config;
use chrono::{DateTime, Utc};
use rss::extension::atom::{AtomExtensionBuilder, Link};
use rss::validation::Validate;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The feed's file name under the output directory.
pub const FILE_NAME: &str = "rss.xml";

const GENERATOR: &str = concat!("folio ", env!("CARGO_PKG_VERSION"));

/// Builds the feed channel for `articles`, stamped with `now` as its
/// publication and build date.
pub fn channel(config: &Config, articles: &[Article], now: DateTime<Utc>) -> Channel {
    let mut self_link = Link::default();
    self_link.set_href(config.absolute_url(&format!("/{}", FILE_NAME)));
    self_link.set_rel("self");
    self_link.set_mime_type(Some("application/rss+xml".to_owned()));

    let stamp = now.to_rfc2822();
    ChannelBuilder::default()
        .title(config.site_name.clone())
        .link(config.base_url.clone())
        .description(config.site_description.clone())
        .language(Some(config.language.clone()))
        .ttl(Some(config.feed_ttl.to_string()))
        .pub_date(Some(stamp.clone()))
        .last_build_date(Some(stamp))
        .generator(Some(GENERATOR.to_owned()))
        .atom_ext(Some(AtomExtensionBuilder::default().links(vec![self_link]).build()))
        .items(articles.iter().map(|article| item(config, article)).collect::<Vec<Item>>())
        .build()
}

fn item(config: &Config, article: &Article) -> Item {
    let link = config.absolute_url(&article.path());
    ItemBuilder::default()
        .title(Some(article.title.clone()))
        .description(Some(article.html.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .pub_date(article.date.map(|date| date.to_rfc2822()))
        .build()
}

/// Validates and writes the feed to `{output}/rss.xml`, returning its path.
/// The document is written to a temporary sibling first and renamed into
/// place so readers never see a partial feed.
pub fn write_feed(config: &Config, articles: &[Article]) -> Result<PathBuf> {
    info!("Generating RSS feed");
    let channel = channel(config, articles, Utc::now());
    channel
        .validate()
        .map_err(|err| Error::Validation(err.to_string()))?;
    let xml = channel.pretty_write_to(Vec::new(), b' ', 2)?;

    let path = config.output_directory.join(FILE_NAME);
    let tmp = config.output_directory.join(format!(".{}.tmp", FILE_NAME));
    fs::write(&tmp, xml).map_err(|err| io_error(&tmp, err))?;
    fs::rename(&tmp, &path).map_err(|err| io_error(&path, err))?;
    info!(path = %path.display(), "RSS feed generated");
    Ok(path)
}

fn io_error(path: &Path, err: std::io::Error) -> Error {
    Error::Io {
        path: path.to_owned(),
        err,
    }
}

/// The result of a fallible feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating the feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when serializing the channel fails.
    #[error("Serializing feed: {0}")]
    Rss(#[from] rss::Error),

    /// Returned when the channel isn't valid RSS 2.0 (e.g., a malformed link).
    #[error("Invalid feed: {0}")]
    Validation(String),

    /// Returned when the feed file can't be written.
    #[error("Writing feed '{}': {}", .path.display(), .err)]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
}

//! Loads the `folio.yaml` project file into a [`Config`]. All relative paths
//! in the project file resolve against the directory that contains it.

use crate::markdown::DEFAULT_THEME;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "folio.yaml";

#[derive(Deserialize)]
struct Project {
    site_name: String,

    #[serde(default)]
    site_description: String,

    base_url: String,

    #[serde(default = "default_language")]
    language: String,

    #[serde(default = "default_source_directory")]
    source_directory: PathBuf,

    #[serde(default = "default_output_directory")]
    output_directory: PathBuf,

    #[serde(default)]
    templates: Templates,

    #[serde(default = "default_highlight_theme")]
    highlight_theme: String,

    #[serde(default = "default_feed_ttl")]
    feed_ttl: u32,
}

#[derive(Deserialize)]
#[serde(default)]
struct Templates {
    post: PathBuf,
    index: PathBuf,
    archive: PathBuf,
}

impl Default for Templates {
    fn default() -> Self {
        Templates {
            post: PathBuf::from("templates/post.html"),
            index: PathBuf::from("templates/index.html"),
            archive: PathBuf::from("templates/archive.html"),
        }
    }
}

fn default_language() -> String {
    "en".to_owned()
}

fn default_source_directory() -> PathBuf {
    PathBuf::from("posts")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("public")
}

fn default_highlight_theme() -> String {
    DEFAULT_THEME.to_owned()
}

fn default_feed_ttl() -> u32 {
    60
}

/// The resolved configuration for one build. Constructed once at start-up
/// and passed by reference to everything that needs it.
#[derive(Clone, Debug)]
pub struct Config {
    pub site_name: String,
    pub site_description: String,

    /// The site's absolute URL without a trailing slash, e.g.
    /// `https://example.org/blog`.
    pub base_url: String,

    /// The feed's language code.
    pub language: String,

    pub source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub post_template: PathBuf,
    pub index_template: PathBuf,
    pub archive_template: PathBuf,

    /// The syntect theme for code blocks.
    pub highlight_theme: String,

    /// How long, in minutes, feed readers may cache the feed.
    pub feed_ttl: u32,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a [`PROJECT_FILE`]
    /// and loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.exists() {
                return Config::from_project_file(&path);
            }
            current = dir.parent();
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    /// Loads a project file. Relative paths are resolved against the file's
    /// parent directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::NoParent(path.to_owned()))?;

        Url::parse(&project.base_url).map_err(|err| Error::BaseUrl {
            url: project.base_url.clone(),
            err,
        })?;

        debug!(path = %path.display(), "loaded project file");
        Ok(Config {
            site_name: project.site_name,
            site_description: project.site_description,
            base_url: project.base_url.trim_end_matches('/').to_owned(),
            language: project.language,
            source_directory: project_root.join(project.source_directory),
            output_directory: project_root.join(project.output_directory),
            post_template: project_root.join(project.templates.post),
            index_template: project_root.join(project.templates.index),
            archive_template: project_root.join(project.templates.archive),
            highlight_theme: project.highlight_theme,
            feed_ttl: project.feed_ttl,
        })
    }

    /// Returns the absolute URL for a site-root-absolute `path` such as
    /// `/notes/hello.html`.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// The result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project file. All of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no project file exists in the directory or its ancestors.
    #[error("Could not find `{}` in '{}' or any parent directory", PROJECT_FILE, .0.display())]
    NotFound(PathBuf),

    #[error("Opening project file '{}': {}", .path.display(), .err)]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("Parsing project file '{}': {}", .path.display(), .err)]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when `base_url` isn't an absolute URL.
    #[error("Invalid base_url `{url}`: {err}")]
    BaseUrl {
        url: String,
        #[source]
        err: url::ParseError,
    },

    #[error("Can't get parent directory for project file '{}'", .0.display())]
    NoParent(PathBuf),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_project_file_defaults() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "site_name: My Site\nbase_url: https://example.org/blog/\n")?;

        let config = Config::from_project_file(&path)?;
        assert_eq!(config.site_name, "My Site");
        assert_eq!(config.site_description, "");
        assert_eq!(config.base_url, "https://example.org/blog");
        assert_eq!(config.language, "en");
        assert_eq!(config.source_directory, dir.path().join("posts"));
        assert_eq!(config.output_directory, dir.path().join("public"));
        assert_eq!(config.post_template, dir.path().join("templates/post.html"));
        assert_eq!(config.index_template, dir.path().join("templates/index.html"));
        assert_eq!(config.archive_template, dir.path().join("templates/archive.html"));
        assert_eq!(config.highlight_theme, DEFAULT_THEME);
        assert_eq!(config.feed_ttl, 60);
        assert_eq!(
            config.absolute_url("/a/b.html"),
            "https://example.org/blog/a/b.html"
        );
        Ok(())
    }

    #[test]
    fn test_from_project_file_overrides() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(
            &path,
            "site_name: S\nsite_description: D\nbase_url: https://example.org\nlanguage: zh-CN\nsource_directory: content\noutput_directory: dist\ntemplates:\n  post: theme/p.html\nfeed_ttl: 15\n",
        )?;

        let config = Config::from_project_file(&path)?;
        assert_eq!(config.site_description, "D");
        assert_eq!(config.language, "zh-CN");
        assert_eq!(config.source_directory, dir.path().join("content"));
        assert_eq!(config.output_directory, dir.path().join("dist"));
        assert_eq!(config.post_template, dir.path().join("theme/p.html"));
        assert_eq!(config.index_template, dir.path().join("templates/index.html"));
        assert_eq!(config.feed_ttl, 15);
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            "site_name: S\nbase_url: https://example.org\n",
        )?;
        let nested = dir.path().join("posts/deep");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(config.source_directory, dir.path().join("posts"));
        Ok(())
    }

    #[test]
    fn test_missing_required_key() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "base_url: https://example.org\n")?;
        assert!(matches!(
            Config::from_project_file(&path),
            Err(Error::Parse { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_base_url() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "site_name: S\nbase_url: not a url\n")?;
        assert!(matches!(
            Config::from_project_file(&path),
            Err(Error::BaseUrl { .. })
        ));
        Ok(())
    }
}

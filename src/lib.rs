//! The library code for the `folio` static site generator. A build is a
//! single sequential pass:
//!
//! 1. Enumerate source documents ([`crate::source`])
//! 2. Split each into front matter and body ([`crate::frontmatter`]), render
//!    the body ([`crate::markdown`]), write its post page ([`crate::write`])
//!    and keep an [`article::Article`] for it
//! 3. Write the index page and one archive page per category and per tag
//!    ([`crate::write`])
//! 4. Write the sitemap ([`crate::sitemap`]) and the RSS feed
//!    ([`crate::feed`])
//!
//! [`crate::build`] sequences these steps. Pages are composed by flat
//! `{{ key }}` substitution into three HTML templates ([`crate::template`]);
//! all URLs are derived with [`slug::slugify`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod build;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod markdown;
pub mod sitemap;
pub mod slug;
pub mod source;
pub mod template;
pub mod write;

//! URL helper functions

use crate::config::SiteConfig;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a path segment. Derived from the URL
/// fragment set; keeps unreserved characters like `-` and `_` readable.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'/');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    let path = url_for(config, path);

    format!("{}{}", base, path)
}

/// Percent-encode one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Site-relative URL for an article page
pub fn article_url(config: &SiteConfig, slug: &str) -> String {
    url_for(
        config,
        &format!("{}/{}/", config.articles_dir, encode_segment(slug)),
    )
}

/// Site-relative URL for an author page
pub fn author_url(config: &SiteConfig, author_slug: &str) -> String {
    url_for(
        config,
        &format!("{}/{}/", config.authors_dir, encode_segment(author_slug)),
    )
}

/// Absolute URL for an article page
pub fn full_article_url(config: &SiteConfig, slug: &str) -> String {
    full_url_for(
        config,
        &format!("{}/{}/", config.articles_dir, encode_segment(slug)),
    )
}

/// Absolute URL for an author page
pub fn full_author_url(config: &SiteConfig, author_slug: &str) -> String {
    full_url_for(
        config,
        &format!("{}/{}/", config.authors_dir, encode_segment(author_slug)),
    )
}

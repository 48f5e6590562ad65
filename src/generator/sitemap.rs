//! Sitemap generation
//!
//! The sitemap lists one URL per article and one per distinct author page,
//! in the same order the listing shows them. The homepage is deliberately
//! not listed; crawlers find it from the domain itself.

use crate::config::SiteConfig;
use crate::content::ArticleSummary;
use crate::helpers::{escape_xml, full_article_url, full_author_url};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// A single sitemap URL entry
#[derive(Debug, Clone, PartialEq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: Option<String>,
}

/// An in-memory sitemap, ready to serialize
#[derive(Debug, Default)]
pub struct Sitemap {
    entries: Vec<UrlEntry>,
}

impl Sitemap {
    /// Build the sitemap from article summaries, newest first
    pub fn from_summaries(config: &SiteConfig, summaries: &[ArticleSummary]) -> Self {
        let mut entries = Vec::with_capacity(summaries.len());

        for summary in summaries {
            entries.push(UrlEntry {
                loc: full_article_url(config, &summary.slug),
                lastmod: Some(summary.date.format("%Y-%m-%d").to_string()),
            });
        }

        // One entry per distinct author, first-seen order; the page was
        // last touched when the author's newest article was published.
        let mut authors: IndexMap<String, DateTime<Utc>> = IndexMap::new();
        for summary in summaries {
            let latest = authors
                .entry(summary.author_slug())
                .or_insert(summary.date);
            if summary.date > *latest {
                *latest = summary.date;
            }
        }

        for (slug, latest) in &authors {
            entries.push(UrlEntry {
                loc: full_author_url(config, slug),
                lastmod: Some(latest.format("%Y-%m-%d").to_string()),
            });
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[UrlEntry] {
        &self.entries
    }

    /// Serialize to sitemap protocol XML
    pub fn into_xml(self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        for entry in self.entries {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            if let Some(lastmod) = entry.lastmod {
                xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

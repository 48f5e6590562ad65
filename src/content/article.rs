//! Article data structures

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Everything a listing needs to know about an article, without the body.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    /// File stem, used in URLs
    pub slug: String,
    pub title: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    /// Cover image path, used for link previews
    pub image: Option<String>,

    /// Additional custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl ArticleSummary {
    /// URL-safe identifier for the author, shared by all their articles
    pub fn author_slug(&self) -> String {
        slug::slugify(&self.author)
    }
}

/// A fully rendered article
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    /// Rendered HTML body
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summary(author: &str) -> ArticleSummary {
        ArticleSummary {
            slug: "a".to_string(),
            title: "A".to_string(),
            author: author.to_string(),
            date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            description: String::new(),
            tags: Vec::new(),
            category: None,
            image: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn test_author_slug() {
        assert_eq!(summary("Ada Lovelace").author_slug(), "ada-lovelace");
        assert_eq!(summary("Jean-Luc Picard").author_slug(), "jean-luc-picard");
        assert_eq!(summary("  Grace   Hopper ").author_slug(), "grace-hopper");
    }
}

//! Article filtering
//!
//! The same query semantics back the `list` command and the client-side
//! search script, so keep them in sync when changing anything here.

use crate::content::article::ArticleSummary;

/// A search/filter query over article summaries.
///
/// All parts are combined with AND. `None` selectors match everything.
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    /// Case-insensitive substring matched against title, description and tags
    pub text: String,
    /// Exact tag to require
    pub tag: Option<String>,
    /// Exact category to require
    pub category: Option<String>,
}

impl ArticleQuery {
    /// Build a query from raw UI values, where "All" means no selection
    pub fn from_parts(text: &str, tag: &str, category: &str) -> Self {
        Self {
            text: text.to_string(),
            tag: selector(tag),
            category: selector(category),
        }
    }

    fn matches(&self, summary: &ArticleSummary) -> bool {
        if let Some(tag) = &self.tag {
            if !summary.tags.iter().any(|t| t == tag) {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if summary.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }

        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        summary.title.to_lowercase().contains(&needle)
            || summary.description.to_lowercase().contains(&needle)
            || summary
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(&needle))
    }
}

/// "All" and blank both mean no selection
fn selector(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "All" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Filter summaries by a query, preserving input order
pub fn filter_summaries<'a>(
    summaries: &'a [ArticleSummary],
    query: &ArticleQuery,
) -> Vec<&'a ArticleSummary> {
    summaries.iter().filter(|s| query.matches(s)).collect()
}

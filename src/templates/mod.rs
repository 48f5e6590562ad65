//! Built-in theme templates using the Tera template engine
//!
//! The default theme is embedded directly in the binary, so a freshly
//! initialized site renders without any theme files on disk.

use crate::helpers;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Stylesheet for the embedded theme, written to `assets/style.css`
pub const STYLE_CSS: &str = include_str!("default/assets/style.css");
/// Client-side search over `search.json`, written to `assets/search.js`
pub const SEARCH_JS: &str = include_str!("default/assets/search.js");
/// Theme toggle handler, written to `assets/theme.js`
pub const THEME_JS: &str = include_str!("default/assets/theme.js");

/// Template renderer with the embedded default theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // We generate HTML and pre-rendered fragments; escaping happens
        // where the values are produced, not in the templates.
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("default/layout.html")),
            ("index.html", include_str!("default/index.html")),
            ("article.html", include_str!("default/article.html")),
            ("authors.html", include_str!("default/authors.html")),
            ("author.html", include_str!("default/author.html")),
            (
                "partials/head.html",
                include_str!("default/partials/head.html"),
            ),
            (
                "partials/header.html",
                include_str!("default/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("default/partials/footer.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(helpers::truncate(
        &s,
        length,
        Some(&omission),
    )))
}

/// Tera filter: reformat a `YYYY-MM-DD` date string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    // "LL" is the long form, like "May 30, 2023"
    if format == "LL" {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            return Ok(tera::Value::String(date.format("%B %d, %Y").to_string()));
        }
    }

    Ok(tera::Value::String(s))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub root: String,
}

/// One article as templates see it; dates are pre-formatted strings
#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub author_slug: String,
    pub url: String,
    pub author_url: String,
    pub date: String,
    pub date_xml: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    /// Rendered HTML body; empty in listings
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorData {
    pub name: String,
    pub slug: String,
    pub url: String,
    pub articles: Vec<ArticleData>,
}

//! Site configuration (vellum.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    /// Default author used by `vellum new` when none is given
    pub author: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory layout (relative to the site base directory)
    pub content_dir: String,
    pub public_dir: String,
    pub static_dir: String,
    /// URL section under which article pages live
    pub articles_dir: String,
    /// URL section under which author index pages live
    pub authors_dir: String,

    // Rendering
    /// Moment.js-style date format used by templates
    pub date_format: String,
    /// Initial color scheme for emitted pages
    pub default_theme: ThemeMode,
    /// Syntect theme used for fenced code blocks (one theme for the whole site)
    pub highlight_theme: String,

    // Feed
    pub feed_limit: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Vellum".to_string(),
            description: String::new(),
            author: "Anonymous".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            articles_dir: "articles".to_string(),
            authors_dir: "authors".to_string(),

            date_format: "YYYY-MM-DD".to_string(),
            default_theme: ThemeMode::Light,
            highlight_theme: "base16-ocean.dark".to_string(),

            feed_limit: 20,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Color scheme for emitted pages.
///
/// Kept as an explicit value threaded from the config into the template
/// context; the only mutable theme state is the visitor's toggle, persisted
/// client-side in localStorage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    /// Value emitted into the page's `data-theme` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::Light
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(anyhow::anyhow!("unknown theme mode: {}", other)),
        }
    }
}

//! vellum: a lightweight static blog generator
//!
//! Articles are flat markdown files with YAML front matter. The generator
//! renders them with math and syntax highlighting, builds author pages, a
//! client-side search index, a sitemap and an Atom feed, all through an
//! embedded Tera theme.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// Conventional name of the site configuration file
pub const CONFIG_FILE: &str = "vellum.yml";

/// The main Vellum application
#[derive(Clone)]
pub struct Vellum {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Directory holding the markdown articles
    pub content_dir: std::path::PathBuf,
    /// Directory of files copied through unchanged
    pub static_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Vellum {
    /// Create a new Vellum instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            static_dir,
            public_dir,
        })
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Build the static site
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new article
    pub fn new_article(&self, title: &str, author: Option<&str>) -> Result<()> {
        commands::new::run(self, title, author)
    }
}

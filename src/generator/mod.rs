//! Generator module - builds the static site from articles

mod sitemap;

pub use sitemap::{Sitemap, UrlEntry};

use anyhow::Result;
use chrono::{Datelike, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tera::Context;
use walkdir::WalkDir;

use crate::content::{Article, ArticleStore, ArticleSummary, MarkdownRenderer};
use crate::helpers::{
    article_url, author_url, date_xml, escape_xml, format_date, full_article_url, full_author_url,
    full_url_for, meta_generator, open_graph,
};
use crate::templates::{
    ArticleData, AuthorData, SiteData, TemplateRenderer, SEARCH_JS, STYLE_CSS, THEME_JS,
};
use crate::Vellum;

/// One line of the client-side search index
#[derive(Debug, Serialize)]
struct SearchDocument {
    slug: String,
    url: String,
    title: String,
    description: String,
    tags: Vec<String>,
    category: Option<String>,
    author: String,
    author_slug: String,
    date: String,
}

/// Static site generator
pub struct Generator {
    vellum: Vellum,
    store: ArticleStore,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(vellum: &Vellum) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let store = ArticleStore::new(
            &vellum.content_dir,
            MarkdownRenderer::new(&vellum.config.highlight_theme),
        );

        Ok(Self {
            vellum: vellum.clone(),
            store,
            renderer,
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<()> {
        fs::create_dir_all(&self.vellum.public_dir)?;

        self.write_theme_assets()?;
        self.copy_static_assets()?;

        let summaries = self.store.summaries()?;
        let articles = self.render_articles(&summaries);

        self.generate_index(&summaries)?;
        self.generate_article_pages(&articles)?;
        self.generate_author_pages(&summaries)?;
        self.generate_search_index(&summaries)?;
        self.generate_sitemap(&summaries)?;
        self.generate_atom_feed(&articles)?;

        tracing::info!(
            "Generated {} article pages from {} articles",
            articles.len(),
            summaries.len()
        );
        Ok(())
    }

    /// Render every article body, skipping the ones that fail.
    ///
    /// A broken body keeps its listing entry (the summary parsed) but gets
    /// no page, mirroring how the loader treats broken front-matter.
    fn render_articles(&self, summaries: &[ArticleSummary]) -> Vec<Article> {
        let mut articles = Vec::with_capacity(summaries.len());
        for summary in summaries {
            match self.store.article(&summary.slug) {
                Ok(article) => articles.push(article),
                Err(e) => {
                    tracing::warn!("Failed to render article {}: {}", summary.slug, e);
                }
            }
        }
        articles
    }

    /// Build the template view of one article
    fn article_data(&self, summary: &ArticleSummary, content: String) -> ArticleData {
        let config = &self.vellum.config;
        let author_slug = summary.author_slug();

        ArticleData {
            slug: summary.slug.clone(),
            title: summary.title.clone(),
            author: summary.author.clone(),
            author_slug: author_slug.clone(),
            url: article_url(config, &summary.slug),
            author_url: author_url(config, &author_slug),
            date: format_date(&summary.date, &config.date_format),
            date_xml: date_xml(&summary.date),
            description: summary.description.clone(),
            tags: summary.tags.clone(),
            category: summary.category.clone(),
            image: summary.image.clone(),
            content,
        }
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let config = &self.vellum.config;

        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: config.title.clone(),
                description: config.description.clone(),
                author: config.author.clone(),
                url: config.url.clone(),
                root: config.root.clone(),
            },
        );
        context.insert("root", &config.root);
        context.insert("theme", config.default_theme.as_str());
        context.insert("authors_dir", &config.authors_dir);
        context.insert("current_year", &Utc::now().year());
        context.insert("generator_tag", &meta_generator());
        context
    }

    /// Generate the article listing at the site root
    fn generate_index(&self, summaries: &[ArticleSummary]) -> Result<()> {
        let config = &self.vellum.config;

        let articles: Vec<ArticleData> = summaries
            .iter()
            .map(|s| self.article_data(s, String::new()))
            .collect();

        let mut tags: BTreeSet<String> = BTreeSet::new();
        let mut categories: BTreeSet<String> = BTreeSet::new();
        for summary in summaries {
            tags.extend(summary.tags.iter().cloned());
            if let Some(category) = &summary.category {
                categories.insert(category.clone());
            }
        }

        let mut context = self.create_base_context();
        context.insert("articles", &articles);
        context.insert("tags", &tags);
        context.insert("categories", &categories);
        context.insert("page_title", "");
        context.insert("page_description", &config.description);
        context.insert(
            "og_tags",
            &open_graph(
                "website",
                &config.title,
                &config.description,
                &full_url_for(config, ""),
                None,
                &config.title,
            ),
        );

        let html = self.renderer.render("index.html", &context)?;
        self.write_page(&self.vellum.public_dir.join("index.html"), &html)
    }

    /// Generate individual article pages
    fn generate_article_pages(&self, articles: &[Article]) -> Result<()> {
        let config = &self.vellum.config;

        for article in articles {
            let summary = &article.summary;
            let data = self.article_data(summary, article.content.clone());

            let page_url = full_article_url(config, &summary.slug);
            let image = summary
                .image
                .as_deref()
                .map(|img| self.absolute_asset_url(img));

            let mut context = self.create_base_context();
            context.insert("article", &data);
            context.insert("page_title", &summary.title);
            context.insert("page_description", &summary.description);
            context.insert(
                "og_tags",
                &open_graph(
                    "article",
                    &summary.title,
                    &summary.description,
                    &page_url,
                    image.as_deref(),
                    &config.title,
                ),
            );

            let html = self.renderer.render("article.html", &context)?;
            let output_path = self
                .vellum
                .public_dir
                .join(&config.articles_dir)
                .join(&summary.slug)
                .join("index.html");
            self.write_page(&output_path, &html)?;
        }

        Ok(())
    }

    /// Generate the author index and one page per author
    fn generate_author_pages(&self, summaries: &[ArticleSummary]) -> Result<()> {
        let config = &self.vellum.config;

        // First-seen order over the date-sorted list, so the author index
        // leads with whoever published most recently.
        let mut authors: IndexMap<String, AuthorData> = IndexMap::new();
        for summary in summaries {
            let slug = summary.author_slug();
            let entry = authors.entry(slug.clone()).or_insert_with(|| AuthorData {
                name: summary.author.clone(),
                slug: slug.clone(),
                url: author_url(config, &slug),
                articles: Vec::new(),
            });
            entry.articles.push(self.article_data(summary, String::new()));
        }

        let authors: Vec<AuthorData> = authors.into_values().collect();

        let mut context = self.create_base_context();
        context.insert("authors", &authors);
        context.insert("page_title", "Authors");
        context.insert("page_description", &config.description);
        context.insert(
            "og_tags",
            &open_graph(
                "website",
                "Authors",
                &config.description,
                &full_url_for(config, &format!("{}/", config.authors_dir)),
                None,
                &config.title,
            ),
        );
        let html = self.renderer.render("authors.html", &context)?;
        self.write_page(
            &self
                .vellum
                .public_dir
                .join(&config.authors_dir)
                .join("index.html"),
            &html,
        )?;

        for author in &authors {
            let page_url = full_author_url(config, &author.slug);
            let description = format!("Articles by {}", author.name);

            let mut context = self.create_base_context();
            context.insert("author", author);
            context.insert("page_title", &author.name);
            context.insert("page_description", &description);
            context.insert(
                "og_tags",
                &open_graph(
                    "website",
                    &author.name,
                    &description,
                    &page_url,
                    None,
                    &config.title,
                ),
            );

            let html = self.renderer.render("author.html", &context)?;
            let output_path = self
                .vellum
                .public_dir
                .join(&config.authors_dir)
                .join(&author.slug)
                .join("index.html");
            self.write_page(&output_path, &html)?;
        }

        tracing::info!("Generated {} author pages", authors.len());
        Ok(())
    }

    /// Generate the search index (JSON)
    fn generate_search_index(&self, summaries: &[ArticleSummary]) -> Result<()> {
        let config = &self.vellum.config;

        let docs: Vec<SearchDocument> = summaries
            .iter()
            .map(|s| SearchDocument {
                slug: s.slug.clone(),
                url: article_url(config, &s.slug),
                title: s.title.clone(),
                description: s.description.clone(),
                tags: s.tags.clone(),
                category: s.category.clone(),
                author: s.author.clone(),
                author_slug: s.author_slug(),
                date: s.date.format("%Y-%m-%d").to_string(),
            })
            .collect();

        let json = serde_json::to_string_pretty(&docs)?;
        fs::write(self.vellum.public_dir.join("search.json"), json)?;
        tracing::info!("Generated search.json");
        Ok(())
    }

    /// Generate sitemap.xml
    fn generate_sitemap(&self, summaries: &[ArticleSummary]) -> Result<()> {
        let sitemap = Sitemap::from_summaries(&self.vellum.config, summaries);
        fs::write(self.vellum.public_dir.join("sitemap.xml"), sitemap.into_xml())?;
        tracing::info!("Generated sitemap.xml");
        Ok(())
    }

    /// Generate the Atom feed
    fn generate_atom_feed(&self, articles: &[Article]) -> Result<()> {
        let config = &self.vellum.config;

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(config, "atom.xml")
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", full_url_for(config, "")));

        // Feed freshness follows the newest article, not the build time
        let updated = articles
            .first()
            .map(|a| a.summary.date)
            .unwrap_or_else(Utc::now);
        feed.push_str(&format!("  <updated>{}</updated>\n", updated.to_rfc3339()));
        feed.push_str(&format!("  <id>{}</id>\n", full_url_for(config, "")));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for article in articles.iter().take(config.feed_limit) {
            let summary = &article.summary;
            let link = full_article_url(config, &summary.slug);

            feed.push_str("  <entry>\n");
            feed.push_str(&format!(
                "    <title>{}</title>\n",
                escape_xml(&summary.title)
            ));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", link));
            feed.push_str(&format!("    <id>{}</id>\n", link));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                summary.date.to_rfc3339()
            ));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                summary.date.to_rfc3339()
            ));
            feed.push_str(&format!(
                "    <author><name>{}</name></author>\n",
                escape_xml(&summary.author)
            ));
            feed.push_str(&format!(
                "    <summary>{}</summary>\n",
                escape_xml(&summary.description)
            ));

            let content = convert_relative_urls_to_absolute(
                &article.content,
                config.url.trim_end_matches('/'),
            );
            let content = strip_invalid_xml_chars(&content);
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                content
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        fs::write(self.vellum.public_dir.join("atom.xml"), feed)?;
        tracing::info!("Generated atom.xml");
        Ok(())
    }

    /// Write the embedded theme assets into the output directory
    fn write_theme_assets(&self) -> Result<()> {
        let assets_dir = self.vellum.public_dir.join("assets");
        fs::create_dir_all(&assets_dir)?;
        fs::write(assets_dir.join("style.css"), STYLE_CSS)?;
        fs::write(assets_dir.join("search.js"), SEARCH_JS)?;
        fs::write(assets_dir.join("theme.js"), THEME_JS)?;
        tracing::debug!("Wrote theme assets");
        Ok(())
    }

    /// Copy static files (images, fonts, ...) into the output directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.vellum.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let relative = path.strip_prefix(static_dir)?;
                let dest = self.vellum.public_dir.join(relative);

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &dest)?;
            }
        }

        Ok(())
    }

    /// Make an image or asset path absolute for link previews
    fn absolute_asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
            path.to_string()
        } else {
            full_url_for(&self.vellum.config, path)
        }
    }

    fn write_page(&self, path: &Path, html: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;
        tracing::debug!("Generated: {:?}", path);
        Ok(())
    }
}

/// Convert relative URLs in HTML content to absolute URLs
/// Handles href="/...", src="/...", and similar patterns
fn convert_relative_urls_to_absolute(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip invalid XML control characters (except tab, newline, carriage return)
/// XML 1.0 only allows: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_article(dir: &Path, slug: &str, title: &str, author: &str, date: &str, body: &str) {
        let content = format!(
            "---\ntitle: {}\nauthor: {}\ndate: {}\ndescription: About {}.\ntags:\n  - Notes\n---\n\n{}\n",
            title, author, date, title, body
        );
        fs::write(dir.join(format!("{}.md", slug)), content).unwrap();
    }

    fn site(tmp: &TempDir) -> Vellum {
        let content_dir = tmp.path().join("content");
        fs::create_dir_all(&content_dir).unwrap();
        Vellum::new(tmp.path()).unwrap()
    }

    #[test]
    fn test_generate_full_site() {
        let tmp = TempDir::new().unwrap();
        let vellum = site(&tmp);
        write_article(
            &vellum.content_dir,
            "second",
            "Second Post",
            "Ada Lovelace",
            "2025-02-01",
            "Body of second.",
        );
        write_article(
            &vellum.content_dir,
            "first",
            "First Post",
            "Ada Lovelace",
            "2025-01-01",
            "Body of first.",
        );
        write_article(
            &vellum.content_dir,
            "guest",
            "Guest Post",
            "Grace Hopper",
            "2024-12-01",
            "Body of guest.",
        );

        Generator::new(&vellum).unwrap().generate().unwrap();

        let public = &vellum.public_dir;
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("Second Post"));
        assert!(index.contains("First Post"));
        // Newest first in the rendered listing
        assert!(index.find("Second Post").unwrap() < index.find("First Post").unwrap());

        let page = fs::read_to_string(public.join("articles/second/index.html")).unwrap();
        assert!(page.contains("Body of second."));
        assert!(page.contains(r#"property="og:type" content="article""#));

        let authors = fs::read_to_string(public.join("authors/index.html")).unwrap();
        assert!(authors.contains("Ada Lovelace"));
        assert!(authors.contains("Grace Hopper"));
        assert!(public.join("authors/ada-lovelace/index.html").is_file());

        let search: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(public.join("search.json")).unwrap()).unwrap();
        assert_eq!(search.len(), 3);
        assert_eq!(search[0]["slug"], "second");

        let sitemap = fs::read_to_string(public.join("sitemap.xml")).unwrap();
        assert_eq!(sitemap.matches("<url>").count(), 5);

        let feed = fs::read_to_string(public.join("atom.xml")).unwrap();
        assert!(feed.contains("<title>Second Post</title>"));

        assert!(public.join("assets/style.css").is_file());
        assert!(public.join("assets/search.js").is_file());
        assert!(public.join("assets/theme.js").is_file());
    }

    #[test]
    fn test_render_failure_keeps_listing_but_skips_page() {
        let tmp = TempDir::new().unwrap();
        let vellum = site(&tmp);
        write_article(
            &vellum.content_dir,
            "good",
            "Good Post",
            "Ada Lovelace",
            "2025-01-02",
            "Fine body.",
        );
        // Valid front-matter, body that fails the math stage
        write_article(
            &vellum.content_dir,
            "broken",
            "Broken Post",
            "Ada Lovelace",
            "2025-01-01",
            "Unbalanced: $\\frac{a}$",
        );

        Generator::new(&vellum).unwrap().generate().unwrap();

        let public = &vellum.public_dir;
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("Broken Post"));
        assert!(public.join("articles/good/index.html").is_file());
        assert!(!public.join("articles/broken/index.html").exists());
    }

    #[test]
    fn test_generate_empty_site() {
        let tmp = TempDir::new().unwrap();
        let vellum = site(&tmp);

        Generator::new(&vellum).unwrap().generate().unwrap();

        let public = &vellum.public_dir;
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("No articles yet"));
        assert_eq!(
            fs::read_to_string(public.join("search.json")).unwrap().trim(),
            "[]"
        );
    }

    #[test]
    fn test_static_files_are_copied() {
        let tmp = TempDir::new().unwrap();
        let vellum = site(&tmp);
        let images = vellum.static_dir.join("images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("logo.png"), b"png bytes").unwrap();

        Generator::new(&vellum).unwrap().generate().unwrap();

        assert!(vellum.public_dir.join("images/logo.png").is_file());
    }

    #[test]
    fn test_convert_relative_urls() {
        let html = r#"<a href="/articles/x/">x</a> <img src="/images/y.png">"#;
        let out = convert_relative_urls_to_absolute(html, "https://example.com");
        assert!(out.contains(r#"href="https://example.com/articles/x/""#));
        assert!(out.contains(r#"src="https://example.com/images/y.png""#));
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("ok\u{0008}text\n"), "oktext\n");
    }
}

//! Article loading and lookup

use crate::content::article::{Article, ArticleSummary};
use crate::content::frontmatter::FrontMatter;
use crate::content::markdown::MarkdownRenderer;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Errors from looking up a single article
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("article not found: {0}")]
    NotFound(String),
    #[error("failed to render article {slug}: {source}")]
    Render {
        slug: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Loads articles from a flat directory of markdown files
pub struct ArticleStore {
    content_dir: PathBuf,
    renderer: MarkdownRenderer,
}

impl ArticleStore {
    pub fn new<P: AsRef<Path>>(content_dir: P, renderer: MarkdownRenderer) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            renderer,
        }
    }

    /// All article summaries, newest first.
    ///
    /// Files that fail to parse are skipped with a warning so one bad
    /// article never takes down the listing. Articles sharing a date keep
    /// their file-name order. A missing directory is an empty site, not an
    /// error.
    pub fn summaries(&self) -> Result<Vec<ArticleSummary>> {
        if !self.content_dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.content_dir)
            .with_context(|| format!("failed to read {:?}", self.content_dir))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().map(|ext| ext == "md").unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut summaries = Vec::with_capacity(paths.len());
        for path in paths {
            match load_summary(&path) {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    warn!("Failed to load article {:?}: {}", path, e);
                }
            }
        }

        // Stable sort: equal dates keep their load order
        summaries.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(summaries)
    }

    /// Load and render a single article by slug
    pub fn article(&self, slug: &str) -> Result<Article, ContentError> {
        let path = self.article_path(slug)?;

        let raw = fs::read_to_string(&path).map_err(|e| ContentError::Render {
            slug: slug.to_string(),
            source: anyhow::Error::from(e).context(format!("failed to read {:?}", path)),
        })?;

        let render = |raw: &str| -> Result<Article> {
            let (fm, body) = FrontMatter::parse(raw)?;
            let date = fm.parse_date()?;
            let content = self.renderer.render(body)?;
            Ok(Article {
                summary: ArticleSummary {
                    slug: slug.to_string(),
                    title: fm.title,
                    author: fm.author,
                    date,
                    description: fm.description,
                    tags: fm.tags,
                    category: fm.category,
                    image: fm.image,
                    extra: fm.extra,
                },
                content,
            })
        };

        render(&raw).map_err(|e| ContentError::Render {
            slug: slug.to_string(),
            source: e,
        })
    }

    /// Resolve a slug to a file path, refusing anything that could escape
    /// the content directory.
    fn article_path(&self, slug: &str) -> Result<PathBuf, ContentError> {
        if slug.is_empty()
            || slug.contains('/')
            || slug.contains('\\')
            || slug.contains("..")
        {
            return Err(ContentError::NotFound(slug.to_string()));
        }

        let path = self.content_dir.join(format!("{}.md", slug));
        if !path.is_file() {
            return Err(ContentError::NotFound(slug.to_string()));
        }

        Ok(path)
    }
}

/// Parse one file's front-matter into a summary
fn load_summary(path: &Path) -> Result<ArticleSummary> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
    let (fm, _body) = FrontMatter::parse(&raw)?;
    let date = fm.parse_date()?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .with_context(|| format!("non-utf8 file name {:?}", path))?;

    Ok(ArticleSummary {
        slug,
        title: fm.title,
        author: fm.author,
        date,
        description: fm.description,
        tags: fm.tags,
        category: fm.category,
        image: fm.image,
        extra: fm.extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_article(dir: &Path, slug: &str, title: &str, date: &str) {
        let content = format!(
            "---\ntitle: {}\nauthor: Test Author\ndate: {}\ndescription: About {}.\n---\n\nBody of {}.\n",
            title, date, title, title
        );
        fs::write(dir.join(format!("{}.md", slug)), content).unwrap();
    }

    fn store(dir: &Path) -> ArticleStore {
        ArticleStore::new(dir, MarkdownRenderer::default())
    }

    #[test]
    fn test_summaries_sorted_newest_first() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "old", "Old", "2024-01-01");
        write_article(tmp.path(), "new", "New", "2025-06-01");
        write_article(tmp.path(), "mid", "Mid", "2024-12-31");

        let summaries = store(tmp.path()).summaries().unwrap();
        let titles: Vec<_> = summaries.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Mid", "Old"]);
    }

    #[test]
    fn test_equal_dates_keep_file_order() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "b-second", "Second", "2025-01-01");
        write_article(tmp.path(), "a-first", "First", "2025-01-01");
        write_article(tmp.path(), "c-third", "Third", "2025-01-01");

        let summaries = store(tmp.path()).summaries().unwrap();
        let slugs: Vec<_> = summaries.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a-first", "b-second", "c-third"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp.path().join("does-not-exist"));
        assert!(store.summaries().unwrap().is_empty());
    }

    #[test]
    fn test_bad_article_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "good", "Good", "2025-01-01");
        fs::write(tmp.path().join("broken.md"), "no front matter here").unwrap();

        let summaries = store(tmp.path()).summaries().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].slug, "good");
    }

    #[test]
    fn test_non_markdown_files_ignored() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "post", "Post", "2025-01-01");
        fs::write(tmp.path().join("notes.txt"), "scratch").unwrap();
        fs::create_dir(tmp.path().join("drafts")).unwrap();

        let summaries = store(tmp.path()).summaries().unwrap();
        assert_eq!(summaries.len(), 1);
    }

    #[test]
    fn test_article_renders_body() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "hello", "Hello", "2025-01-01");

        let article = store(tmp.path()).article("hello").unwrap();
        assert_eq!(article.summary.title, "Hello");
        assert!(article.content.contains("<p>Body of Hello.</p>"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("pipeline.md"),
            "---\ntitle: Pipeline\nauthor: A\ndate: 2025-01-01\ndescription: d\n---\n\nSome $x^2$ math and code:\n\n```rust\nlet x = 1;\n```\n",
        )
        .unwrap();

        let store = store(tmp.path());
        let first = store.article("pipeline").unwrap();
        let second = store.article("pipeline").unwrap();
        assert_eq!(first.content, second.content);
    }

    #[test]
    fn test_unknown_slug_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = store(tmp.path()).article("nope").unwrap_err();
        assert!(matches!(err, ContentError::NotFound(_)));
    }

    #[test]
    fn test_traversal_slug_is_not_found() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "real", "Real", "2025-01-01");

        let store = store(tmp.path());
        assert!(matches!(
            store.article("../real").unwrap_err(),
            ContentError::NotFound(_)
        ));
        assert!(matches!(
            store.article("a/b").unwrap_err(),
            ContentError::NotFound(_)
        ));
        assert!(matches!(
            store.article("").unwrap_err(),
            ContentError::NotFound(_)
        ));
    }

    #[test]
    fn test_broken_article_is_render_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("broken.md"),
            "---\ntitle: Broken\nauthor: A\ndate: not-a-date\ndescription: d\n---\nBody.\n",
        )
        .unwrap();

        let err = store(tmp.path()).article("broken").unwrap_err();
        assert!(matches!(err, ContentError::Render { .. }));
    }
}

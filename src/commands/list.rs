//! List site content

use anyhow::Result;
use indexmap::IndexMap;
use std::collections::HashMap;

use crate::content::{filter_summaries, ArticleQuery, ArticleStore, MarkdownRenderer};
use crate::Vellum;

/// List site content by type. The query narrows the articles listing with
/// the same semantics the search overlay uses; other types ignore it.
pub fn run(vellum: &Vellum, content_type: &str, query: &ArticleQuery) -> Result<()> {
    let store = ArticleStore::new(
        &vellum.content_dir,
        MarkdownRenderer::new(&vellum.config.highlight_theme),
    );
    let summaries = store.summaries()?;

    match content_type {
        "article" | "articles" => {
            let matched = filter_summaries(&summaries, query);
            println!("Articles ({}):", matched.len());
            for summary in matched {
                println!(
                    "  {} - {} [{}]",
                    summary.date.format("%Y-%m-%d"),
                    summary.title,
                    summary.author
                );
            }
        }
        "author" | "authors" => {
            let mut authors: IndexMap<String, usize> = IndexMap::new();
            for summary in &summaries {
                *authors.entry(summary.author.clone()).or_insert(0) += 1;
            }
            println!("Authors ({}):", authors.len());
            for (author, count) in authors {
                println!("  {} ({})", author, count);
            }
        }
        "tag" | "tags" => {
            let mut tags: HashMap<String, usize> = HashMap::new();
            for summary in &summaries {
                for tag in &summary.tags {
                    *tags.entry(tag.clone()).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "category" | "categories" => {
            let mut categories: HashMap<String, usize> = HashMap::new();
            for summary in &summaries {
                if let Some(category) = &summary.category {
                    *categories.entry(category.clone()).or_insert(0) += 1;
                }
            }
            println!("Categories ({}):", categories.len());
            let mut categories: Vec<_> = categories.into_iter().collect();
            categories.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            for (category, count) in categories {
                println!("  {} ({})", category, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: article, author, tag, category",
                content_type
            );
        }
    }

    Ok(())
}

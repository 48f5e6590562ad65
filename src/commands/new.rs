//! Create a new article

use anyhow::Result;
use std::fs;

use crate::Vellum;

/// Create a new article file under the content directory
pub fn run(vellum: &Vellum, title: &str, author: Option<&str>) -> Result<()> {
    let now = chrono::Utc::now();

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} produces an empty file name", title);
    }

    fs::create_dir_all(&vellum.content_dir)?;

    let file_path = vellum.content_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let author = author.unwrap_or(&vellum.config.author);
    let content = format!(
        r#"---
title: "{}"
author: "{}"
date: {}
description: ""
tags: []
---

"#,
        title.replace('"', "\\\""),
        author.replace('"', "\\\""),
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(&file_path, content)?;
    println!("Created: {:?}", file_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use tempfile::TempDir;

    #[test]
    fn test_new_article_has_valid_front_matter() {
        let tmp = TempDir::new().unwrap();
        let vellum = Vellum::new(tmp.path()).unwrap();

        run(&vellum, "Settlement: a Primer", Some("Ada Lovelace")).unwrap();

        let path = vellum.content_dir.join("settlement-a-primer.md");
        let raw = fs::read_to_string(&path).unwrap();
        let (fm, body) = FrontMatter::parse(&raw).unwrap();
        assert_eq!(fm.title, "Settlement: a Primer");
        assert_eq!(fm.author, "Ada Lovelace");
        assert!(fm.parse_date().is_ok());
        assert!(body.is_empty());
    }

    #[test]
    fn test_new_article_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let vellum = Vellum::new(tmp.path()).unwrap();

        run(&vellum, "Twice", None).unwrap();
        assert!(run(&vellum, "Twice", None).is_err());
    }

    #[test]
    fn test_empty_slug_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let vellum = Vellum::new(tmp.path()).unwrap();
        assert!(run(&vellum, "!!!", None).is_err());
    }
}

//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::{Vellum, CONFIG_FILE};

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("content"))?;
    fs::create_dir_all(target_dir.join("static/images"))?;

    let config_content = r#"# Vellum configuration

# Site
title: My Blog
description: Notes from the team
author: Jane Doe

# URL
url: https://example.com
root: /

# Directory
content_dir: content
public_dir: public
static_dir: static
articles_dir: articles
authors_dir: authors

# Appearance
date_format: YYYY-MM-DD
default_theme: light
highlight_theme: base16-ocean.dark

# Feed
feed_limit: 20
"#;

    fs::write(target_dir.join(CONFIG_FILE), config_content)?;

    let now = chrono::Utc::now();
    let sample_article = format!(
        r#"---
title: Hello World
author: Jane Doe
date: {}
description: Your first article, showing front matter, math and code blocks.
tags:
  - getting-started
---

Welcome to your new site. Edit or delete this file under `content/`, then run
`vellum build` to regenerate everything or `vellum serve` to preview it.

Inline math like $e^{{i\pi}} = -1$ renders as MathML, and code blocks are
highlighted:

```rust
fn main() {{
    println!("hello");
}}
```

Files under `static/` are copied through as-is and can be referenced with
site-relative paths like `/images/logo.png`.
"#,
        now.format("%Y-%m-%d")
    );

    fs::write(target_dir.join("content/hello-world.md"), sample_article)?;

    tracing::info!("Initialized site at {:?}", target_dir);
    Ok(())
}

/// Run the init command with an existing Vellum instance
pub fn run(vellum: &Vellum) -> Result<()> {
    init_site(&vellum.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_buildable_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        assert!(tmp.path().join(CONFIG_FILE).is_file());
        assert!(tmp.path().join("content/hello-world.md").is_file());

        let vellum = Vellum::new(tmp.path()).unwrap();
        assert_eq!(vellum.config.title, "My Blog");

        vellum.build().unwrap();

        let page = fs::read_to_string(
            vellum.public_dir.join("articles/hello-world/index.html"),
        )
        .unwrap();
        // The sample exercises the math and highlighting stages
        assert!(page.contains("<math"));
        assert!(page.contains("highlight"));
    }
}

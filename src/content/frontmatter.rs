//! Front-matter parsing
//!
//! Every article starts with a YAML block delimited by `---` lines. The
//! block must carry `title`, `author`, `date` and `description`; `tags`,
//! `category` and `image` are optional. Parsing is strict: a file without a
//! well-formed block is an error, and the caller decides whether that means
//! skip-with-warning (listing) or render-failed (detail page).

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from an article file
#[derive(Debug, Clone, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub author: String,
    /// Raw date string; parse with [`FrontMatter::parse_date`]
    pub date: String,
    pub description: String,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

const FENCE: &str = "---";

impl FrontMatter {
    /// Parse front-matter from a file's content.
    /// Returns (front_matter, remaining_body).
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start_matches('\u{feff}');

        let rest = content
            .strip_prefix(FENCE)
            .ok_or_else(|| anyhow!("missing front-matter: file does not start with `---`"))?;
        let rest = rest.trim_start_matches(['\n', '\r']);

        let end_pos = rest
            .find("\n---")
            .ok_or_else(|| anyhow!("missing front-matter: no closing `---`"))?;

        let yaml_content = &rest[..end_pos];
        let remaining = &rest[end_pos + 1 + FENCE.len()..];
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        let fm: FrontMatter =
            serde_yaml::from_str(yaml_content).context("invalid front-matter")?;

        Ok((fm, remaining))
    }

    /// Parse the date string into a UTC datetime.
    ///
    /// Naive inputs are read as UTC so that builds do not depend on the
    /// machine's timezone.
    pub fn parse_date(&self) -> Result<DateTime<Utc>> {
        parse_date_string(&self.date)
            .ok_or_else(|| anyhow!("unrecognized date format: {:?}", self.date))
    }
}

/// Parse a date string in the accepted formats
fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    // RFC 3339 / ISO 8601 with an explicit offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%d",
        "%Y/%m/%d",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
author: Ada Lovelace
date: 2025-01-15
description: First article.
tags:
  - rust
  - blogging
category: Engineering
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Hello World");
        assert_eq!(fm.author, "Ada Lovelace");
        assert_eq!(fm.description, "First article.");
        assert_eq!(fm.tags, vec!["rust", "blogging"]);
        assert_eq!(fm.category.as_deref(), Some("Engineering"));
        assert_eq!(fm.image, None);
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_parse_inline_tag_list() {
        let content = r#"---
title: Payments Roundup
author: Ada
date: 2025-03-02
description: Weekly notes.
tags: ["DeFi", "Solana"]
---
Body.
"#;
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["DeFi", "Solana"]);
    }

    #[test]
    fn test_parse_single_string_tag() {
        let content = r#"---
title: Single Tag
author: Ada
date: 2025-01-15
description: d
tags: Notes
---
Content here.
"#;

        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
    }

    #[test]
    fn test_missing_required_field_is_error() {
        let content = r#"---
title: No Author
date: 2025-01-15
description: d
---
Body.
"#;
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(err.to_string().contains("front-matter"));
    }

    #[test]
    fn test_missing_opening_fence_is_error() {
        assert!(FrontMatter::parse("just markdown, no metadata").is_err());
    }

    #[test]
    fn test_missing_closing_fence_is_error() {
        let content = "---\ntitle: Unclosed\nauthor: A\ndate: 2025-01-01\ndescription: d\n";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_crlf_content() {
        let content = "---\r\ntitle: Windows\r\nauthor: A\r\ndate: 2025-01-01\r\ndescription: d\r\n---\r\nBody line.\r\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Windows");
        assert!(remaining.starts_with("Body line."));
    }

    #[test]
    fn test_parse_date_formats() {
        for (input, expected) in [
            ("2025-01-15", "2025-01-15 00:00:00"),
            ("2025/01/15", "2025-01-15 00:00:00"),
            ("2025-01-15 10:30:00", "2025-01-15 10:30:00"),
            ("2025-01-15T10:30:00", "2025-01-15 10:30:00"),
            ("2025-01-15T10:30:00+02:00", "2025-01-15 08:30:00"),
        ] {
            let fm = FrontMatter {
                title: String::new(),
                author: String::new(),
                date: input.to_string(),
                description: String::new(),
                tags: Vec::new(),
                category: None,
                image: None,
                extra: HashMap::new(),
            };
            let dt = fm.parse_date().unwrap();
            assert_eq!(
                dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                expected,
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_unparseable_date_is_error() {
        let fm = FrontMatter {
            title: String::new(),
            author: String::new(),
            date: "next tuesday".to_string(),
            description: String::new(),
            tags: Vec::new(),
            category: None,
            image: None,
            extra: HashMap::new(),
        };
        assert!(fm.parse_date().is_err());
    }
}

//! HTML and XML helper functions

/// Open Graph and Twitter card meta tags for link previews.
///
/// `url` and `image` must already be absolute; crawlers do not resolve
/// relative URLs against the page.
pub fn open_graph(
    og_type: &str,
    title: &str,
    description: &str,
    url: &str,
    image: Option<&str>,
    site_name: &str,
) -> String {
    let mut tags = vec![
        format!(r#"<meta property="og:type" content="{}">"#, og_type),
        format!(
            r#"<meta property="og:title" content="{}">"#,
            html_escape(title)
        ),
        format!(r#"<meta property="og:url" content="{}">"#, html_escape(url)),
        format!(
            r#"<meta property="og:site_name" content="{}">"#,
            html_escape(site_name)
        ),
    ];

    if !description.is_empty() {
        tags.push(format!(
            r#"<meta property="og:description" content="{}">"#,
            html_escape(description)
        ));
        tags.push(format!(
            r#"<meta name="twitter:description" content="{}">"#,
            html_escape(description)
        ));
    }

    tags.push(format!(
        r#"<meta name="twitter:title" content="{}">"#,
        html_escape(title)
    ));

    if let Some(img) = image {
        tags.push(format!(
            r#"<meta property="og:image" content="{}">"#,
            html_escape(img)
        ));
        tags.push(format!(
            r#"<meta name="twitter:image" content="{}">"#,
            html_escape(img)
        ));
        tags.push(r#"<meta name="twitter:card" content="summary_large_image">"#.to_string());
    } else {
        tags.push(r#"<meta name="twitter:card" content="summary">"#.to_string());
    }

    tags.join("\n")
}

/// Generate meta generator tag
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="vellum {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape the five XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.len()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_graph_article_with_image() {
        let tags = open_graph(
            "article",
            "Hello & Welcome",
            "A description",
            "https://example.com/articles/hello/",
            Some("https://example.com/images/cover.png"),
            "Example Blog",
        );
        assert!(tags.contains(r#"<meta property="og:type" content="article">"#));
        assert!(tags.contains("Hello &amp; Welcome"));
        assert!(tags.contains(r#"og:image" content="https://example.com/images/cover.png""#));
        assert!(tags.contains(r#"twitter:card" content="summary_large_image""#));
    }

    #[test]
    fn test_open_graph_without_image() {
        let tags = open_graph(
            "website",
            "Home",
            "",
            "https://example.com/",
            None,
            "Example Blog",
        );
        assert!(tags.contains(r#"twitter:card" content="summary""#));
        assert!(!tags.contains("og:image"));
        assert!(!tags.contains("og:description"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&apos;"
        );
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hi", 10, None), "Hi");
    }
}

//! Markdown rendering pipeline
//!
//! Rendering happens in a fixed order over the parsed event stream:
//! math conversion, then image rewriting, then syntax highlighting, then
//! HTML serialization. Each stage is a pure transform over the events it
//! receives, so stages can be tested in isolation.

use anyhow::{anyhow, Result};
use latex2mathml::{latex_to_mathml, DisplayStyle};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Markdown renderer with math and syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl MarkdownRenderer {
    /// Create a renderer using the given syntect theme
    pub fn new(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is stripped before we get here, so YAML metadata
        // blocks stay disabled.
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
            | Options::ENABLE_GFM
            | Options::ENABLE_MATH;

        let events: Vec<Event> = Parser::new_ext(markdown, options).collect();
        let events = rewrite_math(events)?;
        let events = rewrite_images(events);
        let events = self.highlight_code_blocks(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Replace code block events with pre-highlighted HTML
    fn highlight_code_blocks<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out: Vec<Event> = Vec::with_capacity(events.len());
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            let lang = lang.to_string();
                            if lang.is_empty() {
                                None
                            } else {
                                Some(lang)
                            }
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, content)) = code_block.take() {
                        let highlighted = self.highlight_code(&content, lang.as_deref());
                        out.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) => {
                    if let Some((_, content)) = code_block.as_mut() {
                        content.push_str(&text);
                    } else {
                        out.push(Event::Text(text));
                    }
                }
                other => {
                    if code_block.is_none() {
                        out.push(other);
                    }
                }
            }
        }

        out
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = match self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        {
            Some(theme) => theme,
            None => return plain_code_block(code, lang),
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                format!(r#"<figure class="highlight {}">{}</figure>"#, lang, highlighted)
            }
            Err(_) => plain_code_block(code, lang),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

/// Convert math events to MathML.
///
/// Invalid LaTeX fails the whole render rather than emitting broken markup.
fn rewrite_math(events: Vec<Event>) -> Result<Vec<Event>> {
    let mut out = Vec::with_capacity(events.len());

    for event in events {
        match event {
            Event::InlineMath(src) => {
                let mathml = latex_to_mathml(&src, DisplayStyle::Inline)
                    .map_err(|e| anyhow!("invalid inline math {:?}: {}", src.as_ref(), e))?;
                out.push(Event::InlineHtml(CowStr::from(mathml)));
            }
            Event::DisplayMath(src) => {
                let mathml = latex_to_mathml(&src, DisplayStyle::Block)
                    .map_err(|e| anyhow!("invalid display math {:?}: {}", src.as_ref(), e))?;
                out.push(Event::Html(CowStr::from(mathml)));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Rewrite site-relative images into responsive figures.
///
/// External and protocol-relative URLs pass through untouched.
fn rewrite_images(events: Vec<Event>) -> Vec<Event> {
    let mut out: Vec<Event> = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let mut inner = Vec::new();
                for ev in iter.by_ref() {
                    if matches!(ev, Event::End(TagEnd::Image)) {
                        break;
                    }
                    inner.push(ev);
                }

                if is_site_relative(&dest_url) {
                    let alt = plain_text(&inner);
                    out.push(Event::Html(CowStr::from(responsive_figure(
                        &dest_url, &alt, &title,
                    ))));
                } else {
                    out.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url,
                        title,
                        id,
                    }));
                    out.extend(inner);
                    out.push(Event::End(TagEnd::Image));
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// A path the site serves itself: absolute, but not protocol-relative
fn is_site_relative(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//")
}

/// Flatten the events between an image's start and end tags into alt text
fn plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

fn responsive_figure(src: &str, alt: &str, title: &str) -> String {
    let mut html = format!(
        r#"<figure class="post-image"><img src="{}" alt="{}" loading="lazy" decoding="async">"#,
        html_escape(src),
        html_escape(alt)
    );
    if !title.is_empty() {
        html.push_str(&format!("<figcaption>{}</figcaption>", html_escape(title)));
    }
    html.push_str("</figure>");
    html
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        lang,
        html_escape(code)
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

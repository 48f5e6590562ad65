//! Content module - loading, rendering and filtering articles

mod article;
mod filter;
mod frontmatter;
mod markdown;
mod store;

pub use article::{Article, ArticleSummary};
pub use filter::{filter_summaries, ArticleQuery};
pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use store::{ArticleStore, ContentError};

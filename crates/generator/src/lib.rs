//! Content pipeline and static site generation.
//!
//! Markdown files are loaded by [`ContentLoader`], pre-cleaned, rendered with
//! pulldown-cmark and sanitized on a parsed DOM before any template sees
//! them. The [`seo`] module derives page metadata, JSON-LD and the sitemap,
//! and [`site`] assembles everything into [`GeneratedSite`].

pub mod loader;
pub mod markdown;
pub mod sanitizer;
pub mod seo;
pub mod site;
pub mod template;

pub use loader::{ContentLoader, select_related, sort_newest_first};
pub use markdown::{
    MarkdownRenderer, RenderOptions, render_markdown, sanitize_markdown,
    validate_markdown_content,
};
pub use sanitizer::{HtmlSanitizer, sanitize_html};
pub use site::{GeneratedSite, generate_site, generate_site_with_mode, write_site};
pub use template::RenderMode;

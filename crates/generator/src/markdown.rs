//! Markdown to HTML rendering.
//!
//! Rendering is two-layered: [`sanitize_markdown`] pre-cleans the raw source,
//! then the HTML produced by pulldown-cmark goes through the
//! [`HtmlSanitizer`] before it is handed to templates.

use crate::sanitizer::HtmlSanitizer;
use pulldown_cmark::{Event, Options, Parser, html::push_html};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));
static LITERAL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z][^<>]*>").expect("valid regex"));
static INLINE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+(?:style|on[a-z]+)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#)
        .expect("valid regex")
});
static JAVASCRIPT_PROTOCOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("valid regex"));

static WARN_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script").expect("valid regex"));
static WARN_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)style\s*=").expect("valid regex"));
static WARN_JAVASCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("valid regex"));
static WARN_EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+\s*=").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pass raw HTML embedded in the Markdown through to the sanitizer
    /// instead of escaping it as text
    pub allow_html: bool,
    pub strict_sanitization: bool,
    /// Tables, task lists and strikethrough
    pub gfm: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            allow_html: false,
            strict_sanitization: true,
            gfm: true,
        }
    }
}

/// Markdown renderer bound to one set of options
pub struct MarkdownRenderer {
    options: RenderOptions,
    sanitizer: HtmlSanitizer,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            sanitizer: HtmlSanitizer::new(),
        }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render Markdown to HTML that is safe to inject into a page
    pub fn render(&self, markdown: &str) -> String {
        let mut parser_options = Options::empty();
        if self.options.gfm {
            parser_options.insert(Options::ENABLE_TABLES);
            parser_options.insert(Options::ENABLE_TASKLISTS);
            parser_options.insert(Options::ENABLE_STRIKETHROUGH);
        }

        let allow_html = self.options.allow_html;
        let events = Parser::new_ext(markdown, parser_options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) if !allow_html => Event::Text(raw),
            other => other,
        });

        let mut html = String::with_capacity(markdown.len() * 2);
        push_html(&mut html, events);

        self.sanitizer
            .sanitize(&html, self.options.strict_sanitization)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

pub fn render_markdown(markdown: &str, options: RenderOptions) -> String {
    MarkdownRenderer::new(options).render(markdown)
}

/// Remove dangerous literal HTML from raw Markdown before it is rendered.
///
/// Drops `<script>`/`<style>` blocks with their content, `style` and `on*`
/// attributes inside literal tags, and every `javascript:` protocol.
pub fn sanitize_markdown(markdown: &str) -> String {
    let cleaned = SCRIPT_BLOCK.replace_all(markdown, "");
    let cleaned = STYLE_BLOCK.replace_all(&cleaned, "");
    let cleaned = LITERAL_TAG.replace_all(&cleaned, |caps: &Captures| {
        INLINE_ATTRIBUTE.replace_all(&caps[0], "").into_owned()
    });

    // Repeat so that `javajavascript:script:` cannot reassemble
    let mut cleaned = cleaned.into_owned();
    while JAVASCRIPT_PROTOCOL.is_match(&cleaned) {
        cleaned = JAVASCRIPT_PROTOCOL.replace_all(&cleaned, "").into_owned();
    }
    cleaned
}

/// Report suspicious constructs in raw Markdown. Informational only;
/// rendering never depends on the result.
pub fn validate_markdown_content(markdown: &str) -> Vec<String> {
    [
        (&*WARN_SCRIPT, "Markdown contains script tags"),
        (&*WARN_STYLE, "Markdown contains inline styles"),
        (&*WARN_JAVASCRIPT, "Markdown contains javascript: protocol"),
        (&*WARN_EVENT_HANDLER, "Markdown contains event handlers"),
    ]
    .into_iter()
    .filter(|(pattern, _)| pattern.is_match(markdown))
    .map(|(_, message)| message.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        render_markdown(markdown, RenderOptions::default())
    }

    #[test]
    fn test_render_drops_embedded_script() {
        let html = render("# Hi\n\n<script>alert(1)</script>\n\nText");
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<p>Text</p>"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_render_gfm_extensions() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n- [ ] todo\n\n~~old~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains(r#"type="checkbox""#));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_render_without_gfm() {
        let options = RenderOptions {
            gfm: false,
            ..RenderOptions::default()
        };
        let html = render_markdown("~~old~~", options);
        assert!(!html.contains("<del>"));
        assert!(html.contains("~~old~~"));
    }

    #[test]
    fn test_raw_html_escaped_unless_allowed() {
        let escaped = render("Press <kbd>Ctrl</kbd> now");
        assert!(!escaped.contains("<kbd>"));
        assert!(escaped.contains("&lt;kbd&gt;"));

        let options = RenderOptions {
            allow_html: true,
            ..RenderOptions::default()
        };
        let allowed = render_markdown("Press <kbd>Ctrl</kbd> now", options);
        assert!(allowed.contains("<kbd>Ctrl</kbd>"));
    }

    #[test]
    fn test_allowed_html_still_sanitized() {
        let options = RenderOptions {
            allow_html: true,
            ..RenderOptions::default()
        };
        let html = render_markdown(
            "<p onclick=\"x()\" style=\"color:red\">Hi</p>\n\n<iframe src=\"https://evil.example\"></iframe>\n",
            options,
        );
        assert!(!html.contains("onclick"));
        assert!(!html.contains("style="));
        assert!(!html.contains("<iframe"));
        assert!(html.contains("Hi"));
    }

    #[test]
    fn test_javascript_link_neutralized() {
        let html = render("[click](javascript:alert(1))");
        assert!(html.contains(r##"href="#""##));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_code_block_language_class_kept() {
        let html = render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<code class="language-rust">"#));
    }

    #[test]
    fn test_sanitize_markdown_strips_blocks() {
        let md = "Intro\n<script type=\"text/javascript\">\nalert(1)\n</script>\n<STYLE>p{}</STYLE>\nOutro";
        let cleaned = sanitize_markdown(md);
        assert!(!cleaned.to_lowercase().contains("<script"));
        assert!(!cleaned.contains("alert"));
        assert!(!cleaned.to_lowercase().contains("<style"));
        assert!(cleaned.contains("Intro"));
        assert!(cleaned.contains("Outro"));
    }

    #[test]
    fn test_sanitize_markdown_strips_tag_attributes() {
        let cleaned = sanitize_markdown(r#"<div style="color:red" onclick='x()' onload=y class="note">Hi</div>"#);
        assert_eq!(cleaned, r#"<div class="note">Hi</div>"#);
    }

    #[test]
    fn test_sanitize_markdown_keeps_prose() {
        let md = "Set the style = compact option when online = true.";
        assert_eq!(sanitize_markdown(md), md);
    }

    #[test]
    fn test_sanitize_markdown_removes_javascript_protocol() {
        assert_eq!(sanitize_markdown("[x](JavaScript:alert(1))"), "[x](alert(1))");
        assert_eq!(sanitize_markdown("javajavascript:script:x"), "x");
    }

    #[test]
    fn test_validate_markdown_content() {
        assert!(validate_markdown_content("# Plain\n\nNothing here.").is_empty());

        let warnings = validate_markdown_content(
            "<SCRIPT>x</SCRIPT> <p style = \"a\"> [a](javascript:b) <img onerror=c>",
        );
        assert_eq!(warnings.len(), 4);
        assert!(warnings.iter().any(|w| w.contains("script tags")));
        assert!(warnings.iter().any(|w| w.contains("event handlers")));
    }
}

//! HTML sanitization on a parsed DOM tree.
//!
//! Input is parsed with html5ever (through `ammonia`) and rebuilt from an
//! allow-list of tags, attributes and URL schemes, so malformed or nested
//! payloads such as `<scr<script>ipt>` cannot survive as markup.
//!
//! Guarantees for every output:
//! - no `<script>`/`<style>` elements, and none of their content
//! - no `on*` event handler attributes and no `style` attributes
//! - every `href` starts with `http://`, `https://`, `mailto:`, `#` or `/`;
//!   anything else is rewritten to `#`
//! - no `data:` or scripted `src` values
//! - no empty paired tags (table cells and code blocks excepted)
//! - in strict mode only [`ALLOWED_TAGS`] remain; the text of dropped tags is kept

use ammonia::{Builder, UrlRelative};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Tags kept in strict mode
pub const ALLOWED_TAGS: &[&str] = &[
    // text
    "p", "br", "strong", "em", "u", "s", "del", "mark", "small", "sub", "sup",
    // headings
    "h1", "h2", "h3", "h4", "h5", "h6",
    // lists (input carries GFM task list checkboxes)
    "ul", "ol", "li", "dl", "dt", "dd", "input",
    // links and images
    "a", "img",
    // code
    "code", "pre", "kbd", "samp",
    // quotes
    "blockquote", "cite",
    // tables
    "table", "thead", "tbody", "tfoot", "tr", "th", "td",
    // layout
    "hr", "div", "span",
];

const ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("code", &["class"]),
    ("pre", &["class"]),
    ("th", &["scope", "colspan", "rowspan"]),
    ("td", &["colspan", "rowspan"]),
    ("input", &["type", "checked", "disabled"]),
];

const SAFE_HREF_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "#", "/"];

/// Schemes admitted by the tree walker. Everything except http(s) and mailto
/// is only admitted so that the attribute filter can rewrite the link to `#`
/// instead of silently dropping the attribute.
const URL_SCHEMES: &[&str] = &[
    "http", "https", "mailto", "javascript", "vbscript", "data", "file", "ftp", "tel", "blob",
];

/// Elements kept even when empty or whitespace-only: table cells hold
/// columns in place and code blocks keep their whitespace
const KEEP_WHEN_EMPTY: &[&str] = &["td", "th", "pre", "code"];

const LINK_REL: &str = "noopener noreferrer";

static EMPTY_PAIRED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([a-zA-Z][a-zA-Z0-9]*)(?:\s[^>]*)?>\s*</([a-zA-Z][a-zA-Z0-9]*)\s*>")
        .expect("valid regex")
});

/// Reusable sanitizer holding a strict and a relaxed policy
pub struct HtmlSanitizer {
    strict: Builder<'static>,
    relaxed: Builder<'static>,
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        let mut strict = Builder::default();
        strict
            .tags(ALLOWED_TAGS.iter().copied().collect())
            .tag_attributes(allowed_attributes())
            .generic_attributes(HashSet::new());
        apply_common_policy(&mut strict);

        let mut relaxed = Builder::default();
        apply_common_policy(&mut relaxed);

        Self { strict, relaxed }
    }

    /// Clean `html`. Never fails: unsafe constructs are removed or
    /// neutralized, never rejected.
    pub fn sanitize(&self, html: &str, strict: bool) -> String {
        let policy = if strict { &self.strict } else { &self.relaxed };

        let cleaned = policy.clean(html).to_string();
        let collapsed = collapse_empty_tags(&cleaned);
        if collapsed == cleaned {
            return cleaned.trim().to_string();
        }

        // Reparse after collapsing so the output is always the tree walker's
        policy.clean(&collapsed).to_string().trim().to_string()
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-off convenience wrapper around [`HtmlSanitizer::sanitize`]
pub fn sanitize_html(html: &str, strict: bool) -> String {
    HtmlSanitizer::new().sanitize(html, strict)
}

fn allowed_attributes() -> HashMap<&'static str, HashSet<&'static str>> {
    ALLOWED_ATTRIBUTES
        .iter()
        .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
        .collect()
}

fn apply_common_policy(builder: &mut Builder<'static>) {
    builder
        .url_schemes(URL_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .link_rel(Some(LINK_REL))
        .strip_comments(true)
        .attribute_filter(filter_attribute);
}

fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    match attribute {
        "href" if is_safe_href(value) => Some(Cow::Borrowed(value)),
        "href" => Some(Cow::Borrowed("#")),
        "src" => is_safe_src(value).then_some(Cow::Borrowed(value)),
        "type" if element == "input" => value
            .trim()
            .eq_ignore_ascii_case("checkbox")
            .then_some(Cow::Borrowed(value)),
        _ => Some(Cow::Borrowed(value)),
    }
}

fn is_safe_href(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    SAFE_HREF_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// http(s) URLs and scheme-less relative paths are safe image sources
fn is_safe_src(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return true;
    }
    let before_path = lower.split(['/', '?', '#']).next().unwrap_or_default();
    !before_path.contains(':')
}

/// Drop `<tag></tag>` pairs with only whitespace inside, repeating until
/// nothing changes so that nested empties disappear too.
fn collapse_empty_tags(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let next = EMPTY_PAIRED_TAG
            .replace_all(&current, |caps: &Captures| {
                let open = caps[1].to_ascii_lowercase();
                let close = caps[2].to_ascii_lowercase();
                if open == close && !KEEP_WHEN_EMPTY.contains(&open.as_str()) {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

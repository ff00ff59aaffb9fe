use crate::slug::{normalize_url_path, slugify};
use crate::types::SiteConfig;
use regex::Regex;
use std::sync::LazyLock;

static DATE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d{4}/\d{2}/\d{2}/").expect("valid regex"));
static DISALLOWED_PATH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9/-]").expect("valid regex"));
static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/+").expect("valid regex"));
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

/// Qualify a site-relative path with the site origin
pub fn full_url(site: &SiteConfig, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", site.url, path)
    } else {
        format!("{}/{}", site.url, path)
    }
}

pub fn article_url(site: &SiteConfig, category: &str, slug: &str) -> String {
    format!("{}{}", site.url, normalize_url_path(category, slug))
}

pub fn category_url(site: &SiteConfig, category: &str) -> String {
    format!("{}/{}/", site.url, slugify(category))
}

/// Check a site path against the URL policy.
///
/// Returns one message per violated rule; an empty list means the path is
/// acceptable.
pub fn validate_seo_url(path: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if path.contains('?') {
        errors.push("URL must not contain query parameters".to_string());
    }
    if DATE_SEGMENT.is_match(path) {
        errors.push("URL must not contain a /YYYY/MM/DD/ date".to_string());
    }
    if DISALLOWED_PATH_CHARS.is_match(&path.to_lowercase()) {
        errors.push("URL contains characters other than a-z, 0-9, '-' and '/'".to_string());
    }
    if path != path.to_lowercase() {
        errors.push("URL must be lowercase".to_string());
    }
    if !path.ends_with('/') && !path.ends_with(".html") {
        errors.push("URL must end with a trailing slash".to_string());
    }

    errors
}

/// Lowercase a path, collapse repeated slashes and add a trailing slash
pub fn clean_url(path: &str) -> String {
    let lower = path.trim().to_lowercase();
    let mut cleaned = REPEATED_SLASHES.replace_all(&lower, "/").into_owned();
    if !cleaned.starts_with('/') {
        cleaned.insert(0, '/');
    }
    let is_file = [".html", ".xml", ".txt"]
        .iter()
        .any(|ext| cleaned.ends_with(ext));
    if !cleaned.ends_with('/') && !is_file {
        cleaned.push('/');
    }
    cleaned
}

/// Collect link targets from Markdown `[text](target)` links that do not
/// point at an absolute http(s) URL
pub fn extract_internal_links(markdown: &str) -> Vec<String> {
    MARKDOWN_LINK
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
        .filter(|href| !href.starts_with("http://") && !href.starts_with("https://"))
        .collect()
}

pub fn is_valid_internal_link(link: &str) -> bool {
    link.starts_with('/') || !link.contains("://")
}

//! URL slug helpers.
//!
//! Slugs are lowercase ASCII words joined by single hyphens. Article routes
//! always take the form `/{category}/{slug}/`.

use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("valid regex"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("valid regex"));
static VALID_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

/// Convert arbitrary text into a URL-friendly slug
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(lower.trim(), "");
    let joined = SEPARATOR_RUNS.replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}

/// Slugify a title and cap it at `max_length` characters.
///
/// When the cut lands inside a word, the slug is shortened to the previous
/// hyphen as long as that keeps at least 70% of the allowed length.
pub fn create_slug(title: &str, max_length: usize) -> String {
    let slug = slugify(title);
    if slug.len() <= max_length {
        return slug;
    }

    // slugify only emits ASCII, so byte slicing is safe
    let truncated = &slug[..max_length];
    match truncated.rfind('-') {
        Some(last_hyphen) if last_hyphen * 10 > max_length * 7 => {
            truncated[..last_hyphen].to_string()
        }
        _ => truncated.trim_end_matches('-').to_string(),
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    VALID_SLUG.is_match(slug)
}

/// Check that `path` looks like `/category/slug/` with two valid slugs
pub fn is_valid_url_path(path: &str) -> bool {
    parse_url_path(path).is_some()
}

pub fn normalize_url_path(category: &str, slug: &str) -> String {
    format!("/{}/{}/", slugify(category), slugify(slug))
}

/// Split an article route into `(category, slug)`
pub fn parse_url_path(path: &str) -> Option<(&str, &str)> {
    let inner = path.strip_prefix('/')?.strip_suffix('/')?;
    let (category, slug) = inner.split_once('/')?;
    if is_valid_slug(category) && is_valid_slug(slug) {
        Some((category, slug))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(
            slugify("ChatGPT Plus vs. Team: Which Plan?"),
            "chatgpt-plus-vs-team-which-plan"
        );
        assert_eq!(
            slugify("  Hello, World! It's  a_test -- ok  "),
            "hello-world-its-a-test-ok"
        );
    }

    #[test]
    fn test_slugify_edge_cases() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("-leading and trailing-"), "leading-and-trailing");
    }

    #[test]
    fn test_create_slug_cuts_at_hyphen() {
        let title = "How to Fix the Error Code 0x80070005 in Windows Update Service Quickly";
        assert_eq!(
            create_slug(title, 50),
            "how-to-fix-the-error-code-0x80070005-in-windows"
        );
        assert_eq!(create_slug("ChatGPT Plus vs. Team: Which Plan?", 20), "chatgpt-plus-vs");
    }

    #[test]
    fn test_create_slug_short_title_unchanged() {
        assert_eq!(create_slug("Short title", 50), "short-title");
    }

    #[test]
    fn test_create_slug_long_word_hard_cut() {
        let slug = create_slug("Supercalifragilisticexpialidocious and more words", 20);
        assert_eq!(slug, "supercalifragilistic");
        assert!(slug.len() <= 20);
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("ai-tools-platforms"));
        assert!(is_valid_slug("gpt4"));
        assert!(!is_valid_slug("Upper-Case"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("under_score"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_url_path_roundtrip_shape() {
        assert_eq!(
            normalize_url_path("How Things Work", "What Is DNS?"),
            "/how-things-work/what-is-dns/"
        );
        assert_eq!(
            parse_url_path("/how-things-work/what-is-dns/"),
            Some(("how-things-work", "what-is-dns"))
        );
    }

    #[test]
    fn test_is_valid_url_path() {
        assert!(is_valid_url_path("/tools/token-cost/"));
        assert!(!is_valid_url_path("/tools/token-cost"));
        assert!(!is_valid_url_path("tools/token-cost/"));
        assert!(!is_valid_url_path("/tools/"));
        assert!(!is_valid_url_path("/a/b/c/"));
        assert!(!is_valid_url_path("/Tools/token-cost/"));
    }
}

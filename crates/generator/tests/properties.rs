use chrono::{Duration, TimeZone, Utc};
use guidehub_core::config::parse_site_toml_str;
use guidehub_core::{Article, SiteConfig};
use guidehub_generator::sanitizer::ALLOWED_TAGS;
use guidehub_generator::seo::sanitize_description;
use guidehub_generator::{sanitize_html, sort_newest_first};
use proptest::prelude::*;
use proptest::test_runner::Config;
use regex::Regex;

const SITE_TOML: &str = r#"
[site]
name = "Tools Guide Hub"
url = "https://toolsguidehub.com"
description = "Comprehensive guides and tools for developers and professionals"
author = "Tools Guide Hub"

[[category]]
slug = "guides"
name = "Guides"
description = "Step-by-step walkthroughs"
"#;

/// Markup fragments mixing safe content with the usual injection vectors
const FRAGMENTS: &[&str] = &[
    "<p>Paragraph text</p>",
    "<p>   </p>",
    "<div><span>nested</span></div>",
    "<script>alert(1)</script>",
    "<style>body { display: none }</style>",
    r#"<a href="javascript:alert(1)">bad link</a>"#,
    r#"<a href="JaVaScRiPt:alert(1)">mixed case</a>"#,
    r#"<a href="https://example.com/docs">good link</a>"#,
    r#"<img src="data:image/png;base64,AAAA" alt="inline">"#,
    r#"<img src="/images/diagram.png" onerror="alert(1)">"#,
    r#"<span style="color: red" onclick="steal()">styled</span>"#,
    r#"<iframe src="https://evil.example"></iframe>"#,
    "<scr<script>ipt>alert(1)</script>",
    "<table><tr><td>cell</td><td></td></tr></table>",
    "<pre><code>   </code></pre>",
    r#"<pre><code class="language-rust">fn main() {}</code></pre>"#,
    r#"<input type="text" value="x">"#,
    r#"<input type="checkbox" checked disabled>"#,
    "<!-- hidden comment -->",
    r#"<svg onload="alert(1)"><circle r="1"></circle></svg>"#,
    "<b>bold</b>",
    "<ul><li>item</li><li> </li></ul>",
];

static TAG: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static TAG_NAME: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^</?([a-zA-Z][a-zA-Z0-9]*)").unwrap());
static EVENT_HANDLER: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?i)\son[a-z]+\s*=").unwrap());
static STYLE_ATTR: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?i)\sstyle\s*=").unwrap());

fn site() -> SiteConfig {
    parse_site_toml_str(SITE_TOML).unwrap()
}

fn html_input() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        prop::sample::select(FRAGMENTS).prop_map(str::to_string),
        "[a-zA-Z0-9 .,!?]{0,12}",
    ];
    prop::collection::vec(piece, 0..12).prop_map(|pieces| pieces.concat())
}

fn whitespace() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![" ", "\n", "\t", "  ", " \n "])
}

fn description_input() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z]{1,12}", whitespace()), 1..40).prop_map(|words| {
        words
            .into_iter()
            .map(|(word, sep)| format!("{}{}", word, sep))
            .collect()
    })
}

fn assert_no_unsafe_markup(output: &str) -> Result<(), TestCaseError> {
    prop_assert!(!output.to_ascii_lowercase().contains("<script"), "{}", output);
    for tag in TAG.find_iter(output) {
        let tag = tag.as_str();
        let lower = tag.to_ascii_lowercase();
        prop_assert!(!EVENT_HANDLER.is_match(tag), "event handler in {}", tag);
        prop_assert!(!STYLE_ATTR.is_match(tag), "style attribute in {}", tag);
        prop_assert!(!lower.contains("javascript:"), "script URL in {}", tag);
        prop_assert!(!lower.contains("src=\"data:"), "data source in {}", tag);
    }
    Ok(())
}

fn article(slug: String, category: String, days: i64) -> Article {
    let date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(days);
    Article {
        title: slug.clone(),
        description: String::new(),
        slug,
        category,
        date,
        updated: date,
        content: String::new(),
        content_html: String::new(),
        image: None,
        og_image: None,
        featured: false,
        related: Vec::new(),
        author: None,
    }
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn strict_sanitizing_is_a_fixed_point(html in html_input()) {
        let once = sanitize_html(&html, true);
        let twice = sanitize_html(&once, true);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn relaxed_sanitizing_is_a_fixed_point(html in html_input()) {
        let once = sanitize_html(&html, false);
        let twice = sanitize_html(&once, false);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sanitized_output_has_no_unsafe_markup(html in html_input(), strict in any::<bool>()) {
        let output = sanitize_html(&html, strict);
        assert_no_unsafe_markup(&output)?;
    }

    #[test]
    fn strict_output_only_uses_allowed_tags(html in html_input()) {
        let output = sanitize_html(&html, true);
        for tag in TAG.find_iter(&output) {
            if let Some(name) = TAG_NAME.captures(tag.as_str()) {
                let name = name[1].to_ascii_lowercase();
                prop_assert!(ALLOWED_TAGS.contains(&name.as_str()), "unexpected tag {}", name);
            }
        }
    }

    #[test]
    fn description_fits_search_result_bounds(description in description_input()) {
        let site = site();
        let normalized = description.split_whitespace().collect::<Vec<_>>().join(" ");
        let result = sanitize_description(&site, &description);

        prop_assert!(result.chars().count() <= 160, "too long: {}", result);
        prop_assert!(!result.contains(['\n', '\t']));

        let length = normalized.chars().count();
        if length < 50 {
            prop_assert_eq!(&result, &site.description);
        } else if length > 160 {
            let kept = result.strip_suffix("...");
            prop_assert!(kept.is_some(), "missing ellipsis: {}", result);
            let kept = kept.unwrap_or_default();
            prop_assert!(normalized.starts_with(kept));
            // Cut only at a word boundary
            prop_assert!(normalized[kept.len()..].starts_with(' '), "mid-word cut: {}", result);
        } else {
            prop_assert_eq!(&result, &normalized);
        }
    }

    #[test]
    fn newest_first_orders_by_date_then_category_then_slug(
        entries in prop::collection::vec(
            ("[a-z]{1,4}", prop::sample::select(vec!["guides", "how-things-work", "reviews"]), 0_i64..5),
            0..24,
        )
    ) {
        let mut articles: Vec<Article> = entries
            .into_iter()
            .map(|(slug, category, days)| article(slug, category.to_string(), days))
            .collect();
        let count = articles.len();

        sort_newest_first(&mut articles);

        prop_assert_eq!(articles.len(), count);
        for pair in articles.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.date > b.date
                    || (a.date == b.date && (&a.category, &a.slug) <= (&b.category, &b.slug)),
                "{}/{} before {}/{}",
                a.category,
                a.slug,
                b.category,
                b.slug
            );
        }
    }
}

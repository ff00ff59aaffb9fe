use super::{absolute_url, html_escape};
use chrono::{DateTime, SecondsFormat, Utc};
use guidehub_core::url::{clean_url, full_url};
use guidehub_core::{Article, Category, SiteConfig};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const DESCRIPTION_MAX_CHARS: usize = 160;
pub const DESCRIPTION_MIN_CHARS: usize = 50;
const ELLIPSIS: &str = "...";
const OG_IMAGE_WIDTH: u32 = 1200;
const OG_IMAGE_HEIGHT: u32 = 630;
const ROBOTS: &str = "index, follow, max-image-preview:large, max-snippet:-1, max-video-preview:-1";

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    #[default]
    Website,
    Article,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Website => "website",
            PageType::Article => "article",
        }
    }
}

/// Input record for metadata generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub path: String,
    pub image: Option<String>,
    pub page_type: PageType,
    pub published_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub author: Option<String>,
    /// Section name for article pages
    pub category: Option<String>,
}

/// Everything that goes into a page's `<head>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub robots: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenGraph {
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub locale: String,
    pub url: String,
    pub site_name: String,
    /// Page title without the site name suffix
    pub title: String,
    pub description: String,
    pub image: OgImage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<OgArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OgImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OgArticle {
    pub published_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub authors: Vec<String>,
    pub section: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

/// `"{page} | {site}"`, or the bare site name on the home page
pub fn generate_title(site: &SiteConfig, page_title: &str, is_home: bool) -> String {
    if is_home {
        site.name.clone()
    } else {
        format!("{} | {}", page_title, site.name)
    }
}

/// Strip markup and fit the description into search-result bounds.
///
/// Runs of whitespace collapse to one space. Longer than 160 characters:
/// cut to 157 at the last space and append `...`. Shorter than 50: replaced
/// by the site description.
pub fn sanitize_description(site: &SiteConfig, description: &str) -> String {
    let stripped = HTML_TAG.replace_all(description, "");
    let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let length = cleaned.chars().count();

    if length > DESCRIPTION_MAX_CHARS {
        let keep = DESCRIPTION_MAX_CHARS - ELLIPSIS.len();
        let truncated: String = cleaned.chars().take(keep).collect();
        let cut = match truncated.rfind(' ') {
            Some(last_space) if last_space > 0 => &truncated[..last_space],
            _ => truncated.as_str(),
        };
        return format!("{}{}", cut.trim_end(), ELLIPSIS);
    }

    if length < DESCRIPTION_MIN_CHARS {
        return site.description.clone();
    }

    cleaned
}

pub fn canonical_url(site: &SiteConfig, path: &str) -> String {
    full_url(site, &clean_url(path))
}

/// Social image URL; falls back to the site default image
pub fn og_image_url(site: &SiteConfig, image: Option<&str>) -> String {
    let image = image
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(&site.default_image);
    absolute_url(site, image)
}

pub fn generate_metadata(site: &SiteConfig, page: &PageMetadata, is_home: bool) -> Metadata {
    let page_title = if page.title.trim().is_empty() {
        site.name.as_str()
    } else {
        page.title.as_str()
    };
    let title = generate_title(site, page_title, is_home);
    let description = sanitize_description(site, &page.description);
    let canonical = canonical_url(site, &page.path);
    let image = og_image_url(site, page.image.as_deref());

    let article = (page.page_type == PageType::Article).then(|| OgArticle {
        published_time: page.published_time,
        modified_time: page.modified_time.or(page.published_time),
        authors: vec![page.author.clone().unwrap_or_else(|| site.author.clone())],
        section: page.category.clone(),
        tags: page.category.iter().cloned().collect(),
    });

    Metadata {
        title,
        description: description.clone(),
        canonical: canonical.clone(),
        robots: ROBOTS.to_string(),
        open_graph: OpenGraph {
            page_type: page.page_type,
            locale: site.locale.clone(),
            url: canonical,
            site_name: site.name.clone(),
            title: page_title.to_string(),
            description: description.clone(),
            image: OgImage {
                url: image.clone(),
                width: OG_IMAGE_WIDTH,
                height: OG_IMAGE_HEIGHT,
                alt: page_title.to_string(),
            },
            article,
        },
        twitter: TwitterCard {
            card: "summary_large_image".to_string(),
            title: page_title.to_string(),
            description,
            image,
            creator: site.twitter_handle.clone(),
        },
    }
}

pub fn home_metadata(site: &SiteConfig) -> Metadata {
    let page = PageMetadata {
        title: site.name.clone(),
        description: site.description.clone(),
        path: "/".to_string(),
        ..PageMetadata::default()
    };
    generate_metadata(site, &page, true)
}

pub fn article_metadata(site: &SiteConfig, article: &Article) -> Metadata {
    let section = site
        .category(&article.category)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| article.category.clone());

    let page = PageMetadata {
        title: article.title.clone(),
        description: article.description.clone(),
        path: article.path(),
        image: article.social_image().map(str::to_string),
        page_type: PageType::Article,
        published_time: Some(article.date),
        modified_time: Some(article.updated),
        author: article.author.clone(),
        category: Some(section),
    };
    generate_metadata(site, &page, false)
}

pub fn category_metadata(site: &SiteConfig, category: &Category) -> Metadata {
    let page = PageMetadata {
        title: category.name.clone(),
        description: category.description.clone(),
        path: category.path(),
        ..PageMetadata::default()
    };
    generate_metadata(site, &page, false)
}

impl Metadata {
    /// Render the `<head>` tags, every value escaped
    pub fn to_html(&self) -> String {
        let og = &self.open_graph;
        let mut meta = format!(
            r#"<title>{}</title>
<meta name="description" content="{}">
<link rel="canonical" href="{}">
<meta name="robots" content="{}">
<meta property="og:type" content="{}">
<meta property="og:locale" content="{}">
<meta property="og:url" content="{}">
<meta property="og:site_name" content="{}">
<meta property="og:title" content="{}">
<meta property="og:description" content="{}">
<meta property="og:image" content="{}">
<meta property="og:image:width" content="{}">
<meta property="og:image:height" content="{}">
<meta property="og:image:alt" content="{}">"#,
            html_escape(&self.title),
            html_escape(&self.description),
            html_escape(&self.canonical),
            html_escape(&self.robots),
            og.page_type.as_str(),
            html_escape(&og.locale),
            html_escape(&og.url),
            html_escape(&og.site_name),
            html_escape(&og.title),
            html_escape(&og.description),
            html_escape(&og.image.url),
            og.image.width,
            og.image.height,
            html_escape(&og.image.alt),
        );

        if let Some(article) = &og.article {
            if let Some(published) = article.published_time {
                meta.push_str(&property("article:published_time", &rfc3339(published)));
            }
            if let Some(modified) = article.modified_time {
                meta.push_str(&property("article:modified_time", &rfc3339(modified)));
            }
            for author in &article.authors {
                meta.push_str(&property("article:author", author));
            }
            if let Some(section) = &article.section {
                meta.push_str(&property("article:section", section));
            }
            for tag in &article.tags {
                meta.push_str(&property("article:tag", tag));
            }
        }

        let twitter = &self.twitter;
        meta.push_str(&format!(
            r#"
<meta name="twitter:card" content="{}">
<meta name="twitter:title" content="{}">
<meta name="twitter:description" content="{}">
<meta name="twitter:image" content="{}">"#,
            html_escape(&twitter.card),
            html_escape(&twitter.title),
            html_escape(&twitter.description),
            html_escape(&twitter.image),
        ));
        if let Some(creator) = &twitter.creator {
            meta.push_str(&format!(
                "\n<meta name=\"twitter:creator\" content=\"{}\">",
                html_escape(creator)
            ));
        }

        meta
    }
}

fn property(name: &str, content: &str) -> String {
    format!(
        "\n<meta property=\"{}\" content=\"{}\">",
        name,
        html_escape(content)
    )
}

pub(crate) fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seo::test_support::site;
    use chrono::TimeZone;

    fn article() -> Article {
        let date = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        Article {
            slug: "what-is-dns".to_string(),
            category: "how-things-work".to_string(),
            title: "What Is DNS?".to_string(),
            description: "A plain-language explanation of how the Domain Name System turns names into addresses.".to_string(),
            date,
            updated: date,
            content: String::new(),
            content_html: String::new(),
            image: Some("/images/dns.png".to_string()),
            og_image: None,
            featured: false,
            related: vec![],
            author: None,
        }
    }

    #[test]
    fn test_generate_title() {
        let site = site();
        assert_eq!(generate_title(&site, "What Is DNS?", false), "What Is DNS? | Tools Guide Hub");
        assert_eq!(generate_title(&site, "Anything", true), "Tools Guide Hub");
    }

    #[test]
    fn test_description_truncates_at_word_boundary() {
        let site = site();
        let description = format!("{}{}", "abcd ".repeat(31), "abcdefghijklmno");
        assert_eq!(description.chars().count(), 170);

        let result = sanitize_description(&site, &description);
        assert!(result.chars().count() <= DESCRIPTION_MAX_CHARS);
        assert!(result.ends_with("abcd..."));
        assert!(!result.contains("abcdefg"));
    }

    #[test]
    fn test_description_newline_separated_words_not_cut() {
        let site = site();
        let description = format!("{}{}", "abcd\n".repeat(31), "abcdefghijklmno");
        assert_eq!(description.chars().count(), 170);

        let result = sanitize_description(&site, &description);
        assert!(result.chars().count() <= DESCRIPTION_MAX_CHARS);
        assert!(result.ends_with(" abcd..."), "got {:?}", result);
        assert!(!result.contains('\n'));

        let multiline = "Explains how DNS\nresolvers cache answers\tand why\n\nTTLs matter.";
        assert_eq!(
            sanitize_description(&site, multiline),
            "Explains how DNS resolvers cache answers and why TTLs matter."
        );
    }

    #[test]
    fn test_description_counts_characters_not_bytes() {
        let site = site();
        let description = "é".repeat(40) + " " + &"ü".repeat(130);
        let result = sanitize_description(&site, &description);
        assert!(result.chars().count() <= DESCRIPTION_MAX_CHARS);
        assert_eq!(result, format!("{}...", "é".repeat(40)));
    }

    #[test]
    fn test_description_too_short_uses_default() {
        let site = site();
        assert_eq!(sanitize_description(&site, "Too short."), site.description);
        assert_eq!(sanitize_description(&site, "   "), site.description);
    }

    #[test]
    fn test_description_strips_tags() {
        let site = site();
        let input = "<p>A <strong>plain-language</strong> explanation of DNS resolution for everyone.</p>";
        assert_eq!(
            sanitize_description(&site, input),
            "A plain-language explanation of DNS resolution for everyone."
        );
    }

    #[test]
    fn test_og_image_precedence() {
        let site = site();
        assert_eq!(
            og_image_url(&site, Some("/images/og/dns.png")),
            "https://toolsguidehub.com/images/og/dns.png"
        );
        assert_eq!(
            og_image_url(&site, Some("https://cdn.example.com/x.png")),
            "https://cdn.example.com/x.png"
        );
        assert_eq!(
            og_image_url(&site, None),
            "https://toolsguidehub.com/images/og/default.jpg"
        );

        let mut article = article();
        article.og_image = Some("/images/og/dns-card.png".to_string());
        let meta = article_metadata(&site, &article);
        assert_eq!(
            meta.open_graph.image.url,
            "https://toolsguidehub.com/images/og/dns-card.png"
        );
    }

    #[test]
    fn test_article_metadata() {
        let site = site();
        let meta = article_metadata(&site, &article());

        assert_eq!(meta.title, "What Is DNS? | Tools Guide Hub");
        assert_eq!(meta.canonical, "https://toolsguidehub.com/how-things-work/what-is-dns/");
        assert_eq!(meta.open_graph.page_type, PageType::Article);
        assert_eq!(meta.open_graph.title, "What Is DNS?");

        let og_article = meta.open_graph.article.unwrap();
        assert_eq!(og_article.modified_time, og_article.published_time);
        assert_eq!(og_article.authors, vec!["Tools Guide Hub"]);
        assert_eq!(og_article.section.as_deref(), Some("How Things Work"));
        assert_eq!(og_article.tags, vec!["How Things Work"]);
        assert_eq!(meta.twitter.creator.as_deref(), Some("@toolsguidehub"));
    }

    #[test]
    fn test_home_and_category_metadata() {
        let site = site();
        let home = home_metadata(&site);
        assert_eq!(home.title, "Tools Guide Hub");
        assert_eq!(home.canonical, "https://toolsguidehub.com/");
        assert!(home.open_graph.article.is_none());

        let category = site.category("how-things-work").unwrap();
        let meta = category_metadata(&site, category);
        assert_eq!(meta.title, "How Things Work | Tools Guide Hub");
        assert_eq!(meta.canonical, "https://toolsguidehub.com/how-things-work/");
        assert_eq!(meta.open_graph.page_type, PageType::Website);
    }

    #[test]
    fn test_metadata_is_deterministic() {
        let site = site();
        let a = article_metadata(&site, &article()).to_html();
        let b = article_metadata(&site, &article()).to_html();
        assert_eq!(a, b);
    }

    #[test]
    fn test_to_html_escapes_values() {
        let site = site();
        let mut article = article();
        article.title = r#"Quotes "and" <tags>"#.to_string();
        let html = article_metadata(&site, &article).to_html();

        assert!(html.contains("<title>Quotes &quot;and&quot; &lt;tags&gt; | Tools Guide Hub</title>"));
        assert!(!html.contains("<tags>"));
        assert!(html.contains(r#"<meta property="article:published_time" content="2025-01-15T00:00:00Z">"#));
        assert!(html.contains(r#"<meta name="twitter:creator" content="@toolsguidehub">"#));
    }
}

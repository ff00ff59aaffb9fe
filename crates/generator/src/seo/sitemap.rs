use super::meta::rfc3339;
use super::xml_escape;
use chrono::{DateTime, Utc};
use guidehub_core::url::{article_url, category_url, full_url};
use guidehub_core::{Article, SiteConfig};
use serde::Serialize;

const HOME_PRIORITY: f32 = 1.0;
const TOOL_PRIORITY: f32 = 0.9;
const CATEGORY_PRIORITY: f32 = 0.8;
const FEATURED_ARTICLE_PRIORITY: f32 = 0.9;
const ARTICLE_PRIORITY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// One entry per article; featured articles rank higher
pub fn article_sitemap_entries(site: &SiteConfig, articles: &[Article]) -> Vec<SitemapEntry> {
    articles
        .iter()
        .map(|article| SitemapEntry {
            url: article_url(site, &article.category, &article.slug),
            last_modified: article.updated,
            change_frequency: ChangeFrequency::Weekly,
            priority: if article.featured {
                FEATURED_ARTICLE_PRIORITY
            } else {
                ARTICLE_PRIORITY
            },
        })
        .collect()
}

/// Full sitemap: home, static pages, tool pages, configured categories, then
/// the given articles. Non-article pages use `generated_at` as their
/// modification time.
pub fn generate_sitemap(
    site: &SiteConfig,
    articles: &[Article],
    generated_at: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let mut entries = vec![SitemapEntry {
        url: full_url(site, "/"),
        last_modified: generated_at,
        change_frequency: ChangeFrequency::Daily,
        priority: HOME_PRIORITY,
    }];

    entries.extend(site.pages.iter().map(|page| SitemapEntry {
        url: full_url(site, &page.path),
        last_modified: generated_at,
        change_frequency: ChangeFrequency::Monthly,
        priority: page.priority,
    }));

    entries.extend(site.tools.iter().map(|path| SitemapEntry {
        url: full_url(site, path),
        last_modified: generated_at,
        change_frequency: ChangeFrequency::Weekly,
        priority: TOOL_PRIORITY,
    }));

    entries.extend(site.sorted_categories().into_iter().map(|category| SitemapEntry {
        url: category_url(site, &category.slug),
        last_modified: generated_at,
        change_frequency: ChangeFrequency::Weekly,
        priority: CATEGORY_PRIORITY,
    }));

    entries.extend(article_sitemap_entries(site, articles));
    entries
}

/// Generate sitemap.xml content
pub fn render_sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );

    for entry in entries {
        xml.push_str(&format!(
            "  <url><loc>{}</loc><lastmod>{}</lastmod><changefreq>{}</changefreq><priority>{:.1}</priority></url>\n",
            xml_escape(&entry.url),
            rfc3339(entry.last_modified),
            entry.change_frequency.as_str(),
            entry.priority,
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Generate robots.txt content pointing at the sitemap
pub fn generate_robots(site: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        full_url(site, "/sitemap.xml")
    )
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fully loaded article: front matter plus sanitized content.
///
/// Built fresh by the content loader on every call and never mutated
/// afterwards. `content_html` has already been through the sanitizer and is
/// the only field templates may emit without escaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub slug: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Equal to `date` when the front matter has no `updated` field
    pub updated: DateTime<Utc>,
    /// Pre-cleaned Markdown source
    pub content: String,
    pub content_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    pub featured: bool,
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Article {
    /// Route path of the article page, e.g. `/how-things-work/dns/`
    pub fn path(&self) -> String {
        crate::slug::normalize_url_path(&self.category, &self.slug)
    }

    /// Image used for social cards: `og_image` wins over `image`
    pub fn social_image(&self) -> Option<&str> {
        self.og_image.as_deref().or(self.image.as_deref())
    }
}

/// Category taxonomy entry from `site.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub featured: bool,
}

impl Category {
    pub fn path(&self) -> String {
        format!("/{}/", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub article_count: usize,
}

/// Static marketing/legal page listed in the sitemap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPage {
    pub path: String,
    pub priority: f32,
}

/// Complete site configuration.
///
/// Built once from `site.toml` and handed by reference to everything that
/// needs site-wide values.
#[derive(Debug, Clone, Serialize)]
pub struct SiteConfig {
    pub name: String,
    /// Origin without trailing slash, e.g. `https://toolsguidehub.com`
    pub url: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub locale: String,
    pub default_image: String,
    pub logo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_handle: Option<String>,
    /// Content root, relative to the site directory
    pub content_dir: PathBuf,
    pub categories: Vec<Category>,
    pub pages: Vec<StaticPage>,
    pub tools: Vec<String>,
}

impl SiteConfig {
    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Categories sorted by their configured `order`
    pub fn sorted_categories(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.iter().collect();
        categories.sort_by_key(|c| c.order);
        categories
    }

    pub fn featured_categories(&self) -> Vec<&Category> {
        self.sorted_categories()
            .into_iter()
            .filter(|c| c.featured)
            .collect()
    }
}

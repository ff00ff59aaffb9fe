//! Content loading from the `<content_dir>/<category>/<slug>.md` tree.
//!
//! Every call reads and renders from disk; nothing is cached between calls.

use crate::markdown::{MarkdownRenderer, RenderOptions, sanitize_markdown};
use guidehub_core::{Article, CategoryWithCount, Result, SiteConfig, parse_document};
use std::fs;
use std::path::{Component, Path, PathBuf};

const CONTENT_EXTENSION: &str = "md";

pub struct ContentLoader<'a> {
    site: &'a SiteConfig,
    content_dir: PathBuf,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// `root` is the site directory; the content tree lives at
    /// `root/<site.content_dir>`.
    pub fn new(site: &'a SiteConfig, root: impl AsRef<Path>) -> Self {
        Self {
            site,
            content_dir: root.as_ref().join(&site.content_dir),
            renderer: MarkdownRenderer::new(RenderOptions::default()),
        }
    }

    pub fn site(&self) -> &'a SiteConfig {
        self.site
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Category directory names present on disk, sorted. These are not
    /// checked against the configured categories.
    pub fn categories(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.content_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(
                    dir = %self.content_dir.display(),
                    error = %e,
                    "content directory not readable"
                );
                return Vec::new();
            }
        };

        let mut categories: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect();
        categories.sort();
        categories
    }

    /// Slugs of the content files in one category directory, sorted
    pub fn slugs_in_category(&self, category: &str) -> Vec<String> {
        if !is_single_component(category) {
            return Vec::new();
        }

        let dir = self.content_dir.join(category);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut slugs: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == CONTENT_EXTENSION)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        slugs.sort();
        slugs
    }

    /// Every article that parses, newest first. Files that fail to load are
    /// logged and skipped.
    pub fn all_articles(&self) -> Vec<Article> {
        let mut articles = Vec::new();

        for category in self.categories() {
            for slug in self.slugs_in_category(&category) {
                match self.article_by_slug(&category, &slug) {
                    Ok(Some(article)) => articles.push(article),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(category = %category, slug = %slug, error = %e, "skipping article");
                    }
                }
            }
        }

        sort_newest_first(&mut articles);
        tracing::debug!(count = articles.len(), "loaded articles");
        articles
    }

    /// Load one article.
    ///
    /// Returns `Ok(None)` when the file does not exist or when `category` or
    /// `slug` is not a plain file name, and `Err` when the file exists but
    /// cannot be read or parsed.
    pub fn article_by_slug(&self, category: &str, slug: &str) -> Result<Option<Article>> {
        if !is_single_component(category) || !is_single_component(slug) {
            return Ok(None);
        }

        let path = self
            .content_dir
            .join(category)
            .join(format!("{}.{}", slug, CONTENT_EXTENSION));
        if !path.is_file() {
            return Ok(None);
        }

        self.load_file(&path, category, slug).map(Some)
    }

    /// Parse and render a content file, taking category and slug from its
    /// location rather than from the front matter
    pub fn load_file(&self, path: &Path, category: &str, slug: &str) -> Result<Article> {
        let raw = fs::read_to_string(path)?;
        let (front_matter, body) = parse_document(&raw, path)?;

        let content = sanitize_markdown(body);
        let content_html = self.renderer.render(&content);

        tracing::debug!(path = %path.display(), "loaded article");

        Ok(Article {
            slug: slug.to_string(),
            category: category.to_string(),
            title: front_matter.title,
            description: front_matter.description,
            updated: front_matter.updated.unwrap_or(front_matter.date),
            date: front_matter.date,
            content,
            content_html,
            image: front_matter.image,
            og_image: front_matter.og_image,
            featured: front_matter.featured,
            related: front_matter.related,
            author: front_matter.author,
        })
    }

    /// Unknown categories yield an empty list
    pub fn articles_by_category(&self, category: &str) -> Vec<Article> {
        self.all_articles()
            .into_iter()
            .filter(|article| article.category == category)
            .collect()
    }

    /// Related reading for an article, see [`select_related`]. When the
    /// article itself cannot be loaded its newest same-category siblings are
    /// used.
    pub fn related_articles(&self, category: &str, slug: &str, limit: usize) -> Vec<Article> {
        let articles = self.all_articles();
        match articles
            .iter()
            .find(|a| a.category == category && a.slug == slug)
        {
            Some(article) => select_related(article, &articles, limit),
            None => siblings(category, slug, &articles, limit),
        }
    }

    pub fn featured_articles(&self, limit: usize) -> Vec<Article> {
        self.all_articles()
            .into_iter()
            .filter(|article| article.featured)
            .take(limit)
            .collect()
    }

    /// Configured categories in display order with their article counts
    pub fn categories_with_counts(&self) -> Vec<CategoryWithCount> {
        count_by_category(self.site, &self.all_articles())
    }

    /// Articles whose category is not configured in `site.toml`
    pub fn orphaned_articles(&self) -> Vec<Article> {
        self.all_articles()
            .into_iter()
            .filter(|article| self.site.category(&article.category).is_none())
            .collect()
    }
}

/// Related articles drawn from `pool`.
///
/// Explicit `related` slugs are resolved in the article's own category, in
/// order and truncated to `limit`; self references and slugs missing from the
/// pool are skipped and the result is not padded back up to `limit`. Without
/// explicit slugs the first `limit` same-category siblings in pool order are
/// used.
pub fn select_related(article: &Article, pool: &[Article], limit: usize) -> Vec<Article> {
    if article.related.is_empty() {
        return siblings(&article.category, &article.slug, pool, limit);
    }

    article
        .related
        .iter()
        .take(limit)
        .filter(|related_slug| **related_slug != article.slug)
        .filter_map(|related_slug| {
            pool.iter()
                .find(|a| a.category == article.category && a.slug == *related_slug)
        })
        .cloned()
        .collect()
}

fn siblings(category: &str, slug: &str, pool: &[Article], limit: usize) -> Vec<Article> {
    pool.iter()
        .filter(|a| a.category == category && a.slug != slug)
        .take(limit)
        .cloned()
        .collect()
}

/// Configured categories in display order, counted against `articles`
pub fn count_by_category(site: &SiteConfig, articles: &[Article]) -> Vec<CategoryWithCount> {
    site.sorted_categories()
        .into_iter()
        .map(|category| CategoryWithCount {
            article_count: articles
                .iter()
                .filter(|a| a.category == category.slug)
                .count(),
            category: category.clone(),
        })
        .collect()
}

/// Date descending, ties broken by category then slug
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

/// True for a plain name such as `dns-basics`; rejects empty names,
/// separators, `.` and `..`
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

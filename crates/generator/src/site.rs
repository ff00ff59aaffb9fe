use crate::loader::{ContentLoader, count_by_category, select_related};
use crate::seo::{generate_robots, generate_sitemap, render_sitemap_xml};
use crate::template::{RenderMode, render_article, render_category, render_home, render_not_found};
use chrono::{DateTime, Utc};
use guidehub_core::{Article, Result, SiteConfig};
use std::fs;
use std::path::Path;

pub const RELATED_LIMIT: usize = 3;
pub const FEATURED_LIMIT: usize = 6;
pub const LATEST_LIMIT: usize = 10;
pub const NOT_FOUND_PAGE: &str = "404.html";

/// Rendered site, ready to be written out or served
#[derive(Debug, Clone, Default)]
pub struct GeneratedSite {
    /// (relative output path, content), e.g. `how-things-work/dns/index.html`
    pub pages: Vec<(String, String)>,
}

impl GeneratedSite {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, body)| body.as_str())
    }

    /// Look up the page served at a URL path such as `/tools/` or `/sitemap.xml`
    pub fn page_for_url(&self, url_path: &str) -> Option<&str> {
        self.get(&output_path_for_url(url_path))
    }

    pub fn not_found_page(&self) -> Option<&str> {
        self.get(NOT_FOUND_PAGE)
    }
}

/// Map a cleaned URL path to the file that serves it
pub fn output_path_for_url(url_path: &str) -> String {
    let trimmed = url_path.trim_start_matches('/');
    if trimmed.is_empty() {
        "index.html".to_string()
    } else if trimmed.ends_with('/') {
        format!("{}index.html", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Render the whole site for publishing
pub fn generate_site(
    site: &SiteConfig,
    loader: &ContentLoader<'_>,
    generated_at: DateTime<Utc>,
) -> Result<GeneratedSite> {
    generate_site_with_mode(site, loader, generated_at, RenderMode::Static)
}

/// Render the whole site.
///
/// Articles whose category is not configured are left out of every page and
/// of the sitemap, with a warning per article.
pub fn generate_site_with_mode(
    site: &SiteConfig,
    loader: &ContentLoader<'_>,
    generated_at: DateTime<Utc>,
    mode: RenderMode,
) -> Result<GeneratedSite> {
    let (articles, orphans): (Vec<Article>, Vec<Article>) = loader
        .all_articles()
        .into_iter()
        .partition(|article| site.category(&article.category).is_some());

    for orphan in &orphans {
        tracing::warn!(
            category = %orphan.category,
            slug = %orphan.slug,
            "article category is not configured in site.toml, excluding it"
        );
    }

    let mut pages = Vec::with_capacity(articles.len() + site.categories.len() + 4);

    let featured: Vec<Article> = articles
        .iter()
        .filter(|a| a.featured)
        .take(FEATURED_LIMIT)
        .cloned()
        .collect();
    let latest: Vec<Article> = articles.iter().take(LATEST_LIMIT).cloned().collect();
    pages.push((
        "index.html".to_string(),
        render_home(
            site,
            &count_by_category(site, &articles),
            &featured,
            &latest,
            mode,
        )?,
    ));

    for category in site.sorted_categories() {
        let listing: Vec<Article> = articles
            .iter()
            .filter(|a| a.category == category.slug)
            .cloned()
            .collect();
        pages.push((
            format!("{}/index.html", category.slug),
            render_category(site, category, &listing, mode),
        ));
    }

    for article in &articles {
        let related = select_related(article, &articles, RELATED_LIMIT);
        pages.push((
            output_path_for_url(&article.path()),
            render_article(site, article, &related, mode)?,
        ));
    }

    pages.push((NOT_FOUND_PAGE.to_string(), render_not_found(site, mode)));
    pages.push((
        "sitemap.xml".to_string(),
        render_sitemap_xml(&generate_sitemap(site, &articles, generated_at)),
    ));
    pages.push(("robots.txt".to_string(), generate_robots(site)));

    tracing::info!(
        pages = pages.len(),
        articles = articles.len(),
        orphans = orphans.len(),
        "generated site"
    );

    Ok(GeneratedSite { pages })
}

/// Write every page under `output`, creating directories as needed
pub fn write_site(generated: &GeneratedSite, output: &Path) -> Result<usize> {
    for (path, body) in &generated.pages {
        let target = output.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, body)?;
    }
    Ok(generated.pages.len())
}

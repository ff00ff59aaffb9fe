use crate::seo::{
    article_metadata, article_structured_data, category_metadata, home_metadata, to_script_tag,
    website_structured_data,
};
use chrono::{DateTime, Utc};
use guidehub_core::{Article, Category, CategoryWithCount, Result, SiteConfig};

/// Whether pages are rendered for `build` or for the live preview server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Static,
    /// Adds the preview badge and the SSE reload script
    Preview,
}

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Format a publication date for display, e.g. `January 15, 2025`
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Wrap page content in the shared document shell.
///
/// This layout is shared between preview and build so that what you see in
/// preview is exactly what gets published. `head` must already be escaped;
/// `main` is trusted HTML.
pub fn layout(site: &SiteConfig, head: &str, main: &str, mode: RenderMode) -> String {
    let nav: String = site
        .sorted_categories()
        .iter()
        .map(|c| {
            format!(
                r#"<a href="{}">{}</a>"#,
                html_escape(&c.path()),
                html_escape(&c.name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ");

    // Preview badge only shown in preview mode
    let preview_badge = match mode {
        RenderMode::Preview => r#"<div class="preview-badge">PREVIEW MODE - Live Reload Active</div>"#,
        RenderMode::Static => "",
    };

    // Hot reload script only in preview mode
    let reload_script = match mode {
        RenderMode::Preview => {
            r#"<script>
        // Hot reload via Server-Sent Events
        const eventSource = new EventSource('/_reload');
        eventSource.onmessage = () => location.reload();
        eventSource.onerror = () => eventSource.close();
    </script>"#
        }
        RenderMode::Static => "",
    };

    let footer_text = match mode {
        RenderMode::Preview => "Generated by guidehub • Press Ctrl+C to stop preview",
        RenderMode::Static => "Generated by guidehub",
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
{head}
    <style>
        body {{ max-width: 48rem; margin: 0 auto; padding: 1rem; font-family: system-ui, sans-serif; line-height: 1.6; }}
        nav a {{ margin-right: 1rem; }}
        .article-card {{ margin-bottom: 1.5rem; }}
        .meta {{ color: #666; font-size: 0.9rem; }}
        .preview-badge {{ background: #00cc66; color: #000; padding: 0.25rem 0.5rem; font-weight: bold; }}
    </style>
</head>
<body>
    {badge}
    <header>
        <a href="/" class="site-name">{name}</a>
        <nav>
            {nav}
        </nav>
    </header>
    <main>
{main}
    </main>
    <footer>
        <p>&copy; {name} • {footer}</p>
    </footer>
    {reload}
</body>
</html>
"#,
        lang = html_escape(&site.language),
        head = head,
        badge = preview_badge,
        name = html_escape(&site.name),
        nav = nav,
        main = main,
        footer = footer_text,
        reload = reload_script,
    )
}

/// Listing entry for an article
pub fn article_card(article: &Article) -> String {
    format!(
        r#"<article class="article-card">
    <h3><a href="{}">{}</a></h3>
    <p class="meta"><time datetime="{}">{}</time></p>
    <p>{}</p>
</article>"#,
        html_escape(&article.path()),
        html_escape(&article.title),
        article.date.format("%Y-%m-%d"),
        format_date(article.date),
        html_escape(&article.description),
    )
}

fn article_list(articles: &[Article]) -> String {
    articles.iter().map(article_card).collect::<Vec<_>>().join("\n")
}

pub fn render_home(
    site: &SiteConfig,
    categories: &[CategoryWithCount],
    featured: &[Article],
    latest: &[Article],
    mode: RenderMode,
) -> Result<String> {
    let head = format!(
        "{}\n{}",
        home_metadata(site).to_html(),
        to_script_tag(&website_structured_data(site))?
    );

    let category_items: String = categories
        .iter()
        .map(|c| {
            format!(
                r#"<li><a href="{}">{}</a> ({} articles): {}</li>"#,
                html_escape(&c.category.path()),
                html_escape(&c.category.name),
                c.article_count,
                html_escape(&c.category.description),
            )
        })
        .collect();

    let featured_section = if featured.is_empty() {
        String::new()
    } else {
        format!(
            "<section class=\"featured\">\n<h2>Featured</h2>\n{}\n</section>",
            article_list(featured)
        )
    };

    let main = format!(
        r#"<h1>{}</h1>
<p>{}</p>
{}
<section class="categories">
<h2>Categories</h2>
<ul>{}</ul>
</section>
<section class="latest">
<h2>Latest</h2>
{}
</section>"#,
        html_escape(&site.name),
        html_escape(&site.description),
        featured_section,
        category_items,
        article_list(latest),
    );

    Ok(layout(site, &head, &main, mode))
}

pub fn render_category(
    site: &SiteConfig,
    category: &Category,
    articles: &[Article],
    mode: RenderMode,
) -> String {
    let head = category_metadata(site, category).to_html();
    let listing = if articles.is_empty() {
        "<p>No articles yet.</p>".to_string()
    } else {
        article_list(articles)
    };

    let main = format!(
        "<h1>{}</h1>\n<p>{}</p>\n{}",
        html_escape(&category.name),
        html_escape(&category.description),
        listing
    );
    layout(site, &head, &main, mode)
}

pub fn render_article(
    site: &SiteConfig,
    article: &Article,
    related: &[Article],
    mode: RenderMode,
) -> Result<String> {
    let head = format!(
        "{}\n{}",
        article_metadata(site, article).to_html(),
        to_script_tag(&article_structured_data(site, article))?
    );

    let breadcrumb = match site.category(&article.category) {
        Some(category) => format!(
            r#"<p class="breadcrumb"><a href="/">Home</a> › <a href="{}">{}</a></p>"#,
            html_escape(&category.path()),
            html_escape(&category.name)
        ),
        None => r#"<p class="breadcrumb"><a href="/">Home</a></p>"#.to_string(),
    };

    let updated = if article.updated != article.date {
        format!(
            r#" • Updated <time datetime="{}">{}</time>"#,
            article.updated.format("%Y-%m-%d"),
            format_date(article.updated)
        )
    } else {
        String::new()
    };

    let author = article.author.as_deref().unwrap_or(&site.author);

    let related_section = if related.is_empty() {
        String::new()
    } else {
        format!(
            "<aside class=\"related\">\n<h2>Related articles</h2>\n{}\n</aside>",
            article_list(related)
        )
    };

    // content_html is the sanitizer's output and is the only unescaped value
    let main = format!(
        r#"{}
<article>
<h1>{}</h1>
<p class="meta">By {} • <time datetime="{}">{}</time>{}</p>
{}
</article>
{}"#,
        breadcrumb,
        html_escape(&article.title),
        html_escape(author),
        article.date.format("%Y-%m-%d"),
        format_date(article.date),
        updated,
        article.content_html,
        related_section,
    );

    Ok(layout(site, &head, &main, mode))
}

pub fn render_not_found(site: &SiteConfig, mode: RenderMode) -> String {
    let head = format!(
        "<title>Page not found | {}</title>\n<meta name=\"robots\" content=\"noindex\">",
        html_escape(&site.name)
    );

    let links: String = site
        .sorted_categories()
        .iter()
        .map(|c| {
            format!(
                r#"<li><a href="{}">{}</a></li>"#,
                html_escape(&c.path()),
                html_escape(&c.name)
            )
        })
        .collect();

    let main = format!(
        r#"<h1>Page not found</h1>
<p>The page you are looking for does not exist. Try one of these instead:</p>
<ul><li><a href="/">Home</a></li>{}</ul>"#,
        links
    );
    layout(site, &head, &main, mode)
}

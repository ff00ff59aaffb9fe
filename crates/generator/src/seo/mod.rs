//! Search-engine metadata: `<head>` tags, JSON-LD and sitemaps.
//!
//! Everything here is a pure function of the site configuration and the
//! record passed in. Timestamps are always explicit arguments, so the same
//! input renders byte-identical output.

pub mod jsonld;
pub mod meta;
pub mod sitemap;

pub use jsonld::{ArticleSchema, WebSiteSchema, article_structured_data, to_script_tag, website_structured_data};
pub use meta::{
    Metadata, PageMetadata, PageType, article_metadata, canonical_url, category_metadata,
    generate_metadata, generate_title, home_metadata, og_image_url, sanitize_description,
};
pub use sitemap::{
    ChangeFrequency, SitemapEntry, article_sitemap_entries, generate_robots, generate_sitemap,
    render_sitemap_xml,
};

pub(crate) use crate::template::html_escape;

use guidehub_core::SiteConfig;
use guidehub_core::url::full_url;

/// Absolute URLs pass through; site paths are qualified with the origin
pub(crate) fn absolute_url(site: &SiteConfig, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        full_url(site, url)
    }
}

pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
pub(crate) mod test_support {
    use guidehub_core::SiteConfig;
    use guidehub_core::config::parse_site_toml_str;

    pub fn site() -> SiteConfig {
        parse_site_toml_str(
            r#"
[site]
name = "Tools Guide Hub"
url = "https://toolsguidehub.com"
description = "Comprehensive guides and tools for developers and professionals"
author = "Tools Guide Hub"
twitter_handle = "@toolsguidehub"

[[category]]
slug = "how-things-work"
name = "How Things Work"
description = "Plain-language explanations of the technology behind everyday tools"
order = 1

[[category]]
slug = "ai-tools-platforms"
name = "AI Tools & Platforms"
description = "Comparisons and walkthroughs of AI products and their pricing"
order = 2
featured = true

[[page]]
path = "/about"
priority = 0.7

[[page]]
path = "/privacy"
priority = 0.3

[[tool]]
path = "/tools"

[[tool]]
path = "/tools/saas-roi-calculator"
"#,
        )
        .expect("test site config parses")
    }
}

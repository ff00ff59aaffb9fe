use super::absolute_url;
use super::meta::rfc3339;
use guidehub_core::url::article_url;
use guidehub_core::{Article, Error, Result, SiteConfig};
use serde::Serialize;

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// schema.org `Article`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSchema {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub headline: String,
    pub description: String,
    pub image: String,
    pub date_published: String,
    pub date_modified: String,
    pub author: Person,
    pub publisher: Organization,
    pub main_entity_of_page: WebPageRef,
}

/// schema.org `WebSite`, emitted on the home page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebSiteSchema {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub url: String,
    pub description: String,
    #[serde(rename = "inLanguage")]
    pub in_language: String,
    pub publisher: Organization,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<ImageObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageObject {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebPageRef {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
}

pub fn article_structured_data(site: &SiteConfig, article: &Article) -> ArticleSchema {
    let image = article.social_image().unwrap_or(&site.default_image);

    ArticleSchema {
        context: SCHEMA_CONTEXT,
        kind: "Article",
        headline: article.title.clone(),
        description: article.description.clone(),
        image: absolute_url(site, image),
        date_published: rfc3339(article.date),
        date_modified: rfc3339(article.updated),
        author: Person {
            kind: "Person",
            name: article
                .author
                .clone()
                .unwrap_or_else(|| site.author.clone()),
        },
        publisher: Organization {
            kind: "Organization",
            name: site.name.clone(),
            logo: Some(ImageObject {
                kind: "ImageObject",
                url: absolute_url(site, &site.logo),
            }),
        },
        main_entity_of_page: WebPageRef {
            kind: "WebPage",
            id: article_url(site, &article.category, &article.slug),
        },
    }
}

pub fn website_structured_data(site: &SiteConfig) -> WebSiteSchema {
    WebSiteSchema {
        context: SCHEMA_CONTEXT,
        kind: "WebSite",
        name: site.name.clone(),
        url: format!("{}/", site.url),
        description: site.description.clone(),
        in_language: site.language.clone(),
        publisher: Organization {
            kind: "Organization",
            name: site.name.clone(),
            logo: None,
        },
    }
}

/// Serialize into an inline `<script type="application/ld+json">` block.
///
/// `<`, `>` and `&` only occur inside JSON strings and are written as
/// unicode escapes, so no value can close the script element.
pub fn to_script_tag<T: Serialize>(data: &T) -> Result<String> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::InvalidData(format!("JSON-LD serialization failed: {}", e)))?;
    let json = json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026");
    Ok(format!(
        "<script type=\"application/ld+json\">\n{}\n</script>",
        json
    ))
}

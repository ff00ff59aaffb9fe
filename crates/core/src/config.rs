use crate::error::{Error, Result};
use crate::slug::is_valid_slug;
use crate::types::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const SITE_TOML: &str = "site.toml";
pub const DEFAULT_CONTENT_DIR: &str = "content/articles";
const DEFAULT_IMAGE: &str = "/images/og/default.jpg";
const DEFAULT_LOGO: &str = "/images/logo.png";

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSite,
    #[serde(default)]
    content: RawContent,
    #[serde(default)]
    category: Vec<Category>,
    #[serde(default)]
    page: Vec<StaticPage>,
    #[serde(default)]
    tool: Vec<RawTool>,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    name: String,
    url: String,
    description: String,
    author: String,
    language: Option<String>,
    locale: Option<String>,
    default_image: Option<String>,
    logo: Option<String>,
    twitter_handle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTool {
    path: String,
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let url = validate_site_url(&raw.site.url)?;

    let content_dir = match raw.content.dir {
        Some(dir) => validate_path(&dir, "content.dir")?,
        None => PathBuf::from(DEFAULT_CONTENT_DIR),
    };

    let mut seen = HashSet::new();
    for category in &raw.category {
        if !is_valid_slug(&category.slug) {
            return Err(Error::ConfigParse(format!(
                "Invalid category slug '{}': use lowercase letters, digits and single hyphens",
                category.slug
            )));
        }
        if !seen.insert(category.slug.as_str()) {
            return Err(Error::ConfigParse(format!(
                "Duplicate category slug '{}'",
                category.slug
            )));
        }
    }

    for page in &raw.page {
        if !page.path.starts_with('/') {
            return Err(Error::ConfigParse(format!(
                "Page path '{}' must start with '/'",
                page.path
            )));
        }
        if !(0.0..=1.0).contains(&page.priority) {
            return Err(Error::ConfigParse(format!(
                "Priority for page '{}' must be between 0.0 and 1.0",
                page.path
            )));
        }
        if !has_one_decimal(page.priority) {
            return Err(Error::ConfigParse(format!(
                "Priority for page '{}' must have at most one decimal place (e.g. 0.7)",
                page.path
            )));
        }
    }

    let tools = raw
        .tool
        .into_iter()
        .map(|t| {
            if t.path.starts_with('/') {
                Ok(t.path)
            } else {
                Err(Error::ConfigParse(format!(
                    "Tool path '{}' must start with '/'",
                    t.path
                )))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SiteConfig {
        name: raw.site.name,
        url,
        description: raw.site.description,
        author: raw.site.author,
        language: raw.site.language.unwrap_or_else(|| "en".to_string()),
        locale: raw.site.locale.unwrap_or_else(|| "en-US".to_string()),
        default_image: raw
            .site
            .default_image
            .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        logo: raw.site.logo.unwrap_or_else(|| DEFAULT_LOGO.to_string()),
        twitter_handle: raw.site.twitter_handle,
        content_dir,
        categories: raw.category,
        pages: raw.page,
        tools,
    })
}

/// Sitemap priorities are written with one decimal place
fn has_one_decimal(priority: f32) -> bool {
    let scaled = priority * 10.0;
    (scaled - scaled.round()).abs() < 1e-4
}

/// The site origin must be absolute http(s) and is stored without a
/// trailing slash so paths can be appended directly.
fn validate_site_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let Some(host) = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
    else {
        return Err(Error::ConfigParse(format!(
            "site.url must start with http:// or https://: '{}'",
            url
        )));
    };

    if host.is_empty() {
        return Err(Error::ConfigParse(format!("site.url has no host: '{}'", url)));
    }

    Ok(trimmed.to_string())
}

/// Validate and convert a path string to PathBuf.
///
/// This function prevents path traversal vulnerabilities by rejecting:
/// - Absolute paths (starting with `/` or Windows drive letters)
/// - Paths containing parent directory references (`..`)
///
/// # Security
///
/// The content directory is joined onto the site root and then walked, so
/// it must never be able to point outside the project directory.
///
/// # Arguments
///
/// * `path_str` - The path string from user input (site.toml)
/// * `field_name` - Name of the field for error messages
///
/// # Returns
///
/// A validated relative PathBuf, or an error if the path is unsafe
///
/// # Examples
///
/// ```text
/// validate_path("content/articles", "content.dir")  → Ok(PathBuf)
/// validate_path("/etc", "content.dir")  → Err("Absolute paths not allowed...")
/// validate_path("../other-site", "content.dir")  → Err("Parent directory references...")
/// ```
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}

//! Content validation.
//!
//! Walks the content tree and checks every article against the front matter
//! schema, the URL policy and the configured category taxonomy. Problems are
//! collected into a [`ValidationReport`] instead of stopping at the first one.

use guidehub_core::slug::{is_valid_slug, normalize_url_path, parse_url_path};
use guidehub_core::url::{
    clean_url, extract_internal_links, is_valid_internal_link, validate_seo_url,
};
use guidehub_core::{FrontMatter, SiteConfig, parse_document};
use guidehub_generator::validate_markdown_content;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::{DirEntry, WalkDir};

pub const MAX_URL_LENGTH: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 160;

static DATE_IN_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}[-/]\d{2}[-/]\d{2}").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    /// No errors; warnings do not fail validation
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate every article under `root/<site.content_dir>`
pub fn validate_content(site: &SiteConfig, root: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();
    let content_dir = root.join(&site.content_dir);

    if !content_dir.is_dir() {
        report.errors.push(format!(
            "Content directory not found: {}",
            content_dir.display()
        ));
        return report;
    }

    let mut article_count = 0;
    let mut category_count = 0;

    let walker = WalkDir::new(&content_dir)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.errors.push(format!("Cannot read content tree: {}", e));
                continue;
            }
        };

        let display = display_path(root, entry.path());

        match (entry.depth(), entry.file_type().is_dir()) {
            (1, true) => {
                category_count += 1;
                let name = entry.file_name().to_string_lossy();
                if !is_valid_slug(&name) {
                    report
                        .errors
                        .push(format!("{}: invalid category directory name '{}'", display, name));
                }
            }
            (1, false) => {
                if is_markdown(entry.path()) {
                    report.warnings.push(format!(
                        "{}: article is not inside a category directory and will be ignored",
                        display
                    ));
                }
            }
            (_, false) if is_markdown(entry.path()) => {
                article_count += 1;
                validate_article(site, &content_dir, entry.path(), &display, &mut report);
            }
            _ => {}
        }
    }

    for category in site.sorted_categories() {
        if !content_dir.join(&category.slug).is_dir() {
            report.info.push(format!(
                "Category '{}' has no content directory yet",
                category.slug
            ));
        }
    }

    report.info.push(format!(
        "Checked {} articles in {} category directories",
        article_count, category_count
    ));

    report
}

fn validate_article(
    site: &SiteConfig,
    content_dir: &Path,
    path: &Path,
    display: &str,
    report: &mut ValidationReport,
) {
    tracing::debug!(path = %path.display(), "validating article");

    let category = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slug = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            report
                .errors
                .push(format!("{}: failed to read file: {}", display, e));
            return;
        }
    };

    let (front_matter, body) = match parse_document(&raw, path) {
        Ok(parsed) => parsed,
        Err(e) => {
            report.errors.push(format!("{}: {}", display, e));
            return;
        }
    };

    check_identity(site, &category, &slug, &front_matter, display, report);
    check_url(&category, &slug, display, report);
    check_description(&front_matter.description, display, report);

    for warning in validate_markdown_content(body) {
        report.warnings.push(format!("{}: {}", display, warning));
    }

    let category_dir = content_dir.join(&category);
    for related in &front_matter.related {
        if !category_dir.join(format!("{}.md", related)).is_file() {
            report.warnings.push(format!(
                "{}: related article '{}' not found in category '{}'",
                display, related, category
            ));
        }
    }

    check_internal_links(site, content_dir, body, display, report);
}

fn check_identity(
    site: &SiteConfig,
    category: &str,
    slug: &str,
    front_matter: &FrontMatter,
    display: &str,
    report: &mut ValidationReport,
) {
    if !is_valid_slug(category) {
        report
            .errors
            .push(format!("{}: invalid category format '{}'", display, category));
    }
    if !is_valid_slug(slug) {
        report
            .errors
            .push(format!("{}: invalid slug format '{}'", display, slug));
    }

    if let Some(declared) = &front_matter.category
        && declared != category
    {
        report.errors.push(format!(
            "{}: front matter category '{}' does not match directory '{}'",
            display, declared, category
        ));
    }
    if let Some(declared) = &front_matter.slug
        && declared != slug
    {
        report.errors.push(format!(
            "{}: front matter slug '{}' does not match file name '{}'",
            display, declared, slug
        ));
    }

    if site.category(category).is_none() {
        report.errors.push(format!(
            "{}: category '{}' is not configured in site.toml (orphaned article)",
            display, category
        ));
    }
}

fn check_url(category: &str, slug: &str, display: &str, report: &mut ValidationReport) {
    // Route built from the raw names so that bad characters are reported
    let url = format!("/{}/{}/", category, slug);
    for error in validate_seo_url(&url) {
        report.errors.push(format!("{}: {} ({})", display, error, url));
    }

    let normalized = normalize_url_path(category, slug);
    if normalized.len() > MAX_URL_LENGTH {
        report.warnings.push(format!(
            "{}: URL is {} characters long (over {})",
            display,
            normalized.len(),
            MAX_URL_LENGTH
        ));
    }

    if DATE_IN_SLUG.is_match(slug) {
        report
            .warnings
            .push(format!("{}: slug should not contain a date", display));
    }
}

fn check_description(description: &str, display: &str, report: &mut ValidationReport) {
    let length = description.chars().count();
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&length) {
        report.warnings.push(format!(
            "{}: description is {} characters (recommended {}-{})",
            display, length, DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS
        ));
    }
}

fn check_internal_links(
    site: &SiteConfig,
    content_dir: &Path,
    body: &str,
    display: &str,
    report: &mut ValidationReport,
) {
    for link in extract_internal_links(body) {
        if !is_valid_internal_link(&link) {
            report
                .warnings
                .push(format!("{}: unsupported link target '{}'", display, link));
            continue;
        }

        let target = link.split(['#', '?']).next().unwrap_or_default();
        if !target.starts_with('/') {
            continue;
        }
        let target = clean_url(target);
        if is_configured_route(site, &target) {
            continue;
        }
        if let Some((category, slug)) = parse_url_path(&target)
            && !content_dir
                .join(category)
                .join(format!("{}.md", slug))
                .is_file()
        {
            report
                .warnings
                .push(format!("{}: broken internal link '{}'", display, link));
        }
    }
}

/// Static pages and tools are served outside the content tree
fn is_configured_route(site: &SiteConfig, target: &str) -> bool {
    site.tools
        .iter()
        .chain(site.pages.iter().map(|page| &page.path))
        .any(|route| clean_url(route) == target)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

use anyhow::{Context, Result};
use chrono::Local;
use guidehub_core::slug::{create_slug, is_valid_slug, normalize_url_path};
use std::fs;
use std::path::{Path, PathBuf};

use super::load_site;

const MAX_SLUG_LENGTH: usize = 60;
const PLACEHOLDER_DESCRIPTION: &str =
    "Summarize what readers will learn from this article in 50 to 160 characters.";

/// Create a new article skeleton under `<content_dir>/<category>/<slug>.md`
pub async fn run(
    path: PathBuf,
    category: String,
    title: String,
    slug: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let site = load_site(&path)?;

    if site.category(&category).is_none() {
        let known: Vec<&str> = site
            .sorted_categories()
            .iter()
            .map(|c| c.slug.as_str())
            .collect();
        anyhow::bail!(
            "Unknown category '{}'\nConfigured categories: {}",
            category,
            known.join(", ")
        );
    }

    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("Title must not be empty");
    }

    let slug = match slug {
        Some(slug) => slug.trim().to_string(),
        None => create_slug(title, MAX_SLUG_LENGTH),
    };
    if !is_valid_slug(&slug) {
        anyhow::bail!(
            "Invalid slug '{}': use lowercase letters, digits and single hyphens",
            slug
        );
    }

    let dir = path.join(&site.content_dir).join(&category);
    let target = dir.join(format!("{}.md", slug));
    if target.exists() {
        anyhow::bail!(
            "Article already exists: {}\nHint: Pass --slug to pick a different slug",
            target.display()
        );
    }

    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let description = description.as_deref().unwrap_or(PLACEHOLDER_DESCRIPTION);
    write_article(&target, title, description)?;

    println!("✓ Created {}", target.display());
    println!("  URL: {}", normalize_url_path(&category, &slug));
    if description == PLACEHOLDER_DESCRIPTION {
        println!("  ⚠ Remember to replace the placeholder description");
    }

    Ok(())
}

/// Quote a value as a YAML double-quoted scalar
fn yaml_quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', " ");
    format!("\"{}\"", escaped)
}

fn write_article(target: &Path, title: &str, description: &str) -> Result<()> {
    let today = Local::now().format("%Y-%m-%d");
    let article = format!(
        r##"---
title: {title_yaml}
description: {description_yaml}
date: {today}
featured: false
related: []
---

# {title}

## Introduction

What problem does this article solve, and who is it for?

## Main Content

### Section 1

Content...

### Section 2

Content...

## Conclusion

Summarize the key takeaways.
"##,
        title_yaml = yaml_quote(title),
        description_yaml = yaml_quote(description),
    );

    fs::write(target, article).with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidehub_core::config::DEFAULT_CONTENT_DIR;
    use guidehub_core::parse_document;
    use tempfile::TempDir;

    const SITE_TOML: &str = r#"
[site]
name = "Tools Guide Hub"
url = "https://toolsguidehub.com"
description = "Comprehensive guides and tools for developers and professionals"
author = "Tools Guide Hub"

[[category]]
slug = "how-things-work"
name = "How Things Work"
description = "Plain-language explanations of the technology behind everyday tools"
order = 1
"#;

    fn site_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.toml"), SITE_TOML).unwrap();
        dir
    }

    #[test]
    fn test_yaml_quote() {
        assert_eq!(yaml_quote("plain"), "\"plain\"");
        assert_eq!(yaml_quote(r#"a "b": c"#), r#""a \"b\": c""#);
    }

    #[tokio::test]
    async fn test_new_article_from_title() {
        let dir = site_dir();
        run(
            dir.path().to_path_buf(),
            "how-things-work".to_string(),
            "What Is DNS? A \"Plain\" Guide".to_string(),
            None,
            Some("How the Domain Name System turns human-friendly names into addresses.".to_string()),
        )
        .await
        .unwrap();

        let path = dir
            .path()
            .join(DEFAULT_CONTENT_DIR)
            .join("how-things-work/what-is-dns-a-plain-guide.md");
        let raw = fs::read_to_string(&path).unwrap();
        let (front_matter, body) = parse_document(&raw, &path).unwrap();

        assert_eq!(front_matter.title, "What Is DNS? A \"Plain\" Guide");
        assert!(front_matter.description.starts_with("How the Domain Name System"));
        assert!(!front_matter.featured);
        assert!(body.contains("## Introduction"));
        assert!(body.contains("## Conclusion"));
    }

    #[tokio::test]
    async fn test_new_article_rejects_bad_input() {
        let dir = site_dir();

        let err = run(
            dir.path().to_path_buf(),
            "unknown".to_string(),
            "Title".to_string(),
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Unknown category"));

        let err = run(
            dir.path().to_path_buf(),
            "how-things-work".to_string(),
            "Title".to_string(),
            Some("Bad_Slug".to_string()),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Invalid slug"));
    }

    #[tokio::test]
    async fn test_new_article_refuses_overwrite() {
        let dir = site_dir();
        let args = || {
            (
                dir.path().to_path_buf(),
                "how-things-work".to_string(),
                "Same Title".to_string(),
            )
        };

        let (path, category, title) = args();
        run(path, category, title, None, None).await.unwrap();

        let (path, category, title) = args();
        let err = run(path, category, title, None, None).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}

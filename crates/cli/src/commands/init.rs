use anyhow::{Context, Result};
use chrono::Local;
use guidehub_core::config::{DEFAULT_CONTENT_DIR, SITE_TOML, parse_site_toml_str};
use std::fs;
use std::path::{Path, PathBuf};

/// Categories every new site starts with: (slug, name, description)
const STARTER_CATEGORIES: &[(&str, &str, &str)] = &[
    (
        "how-things-work",
        "How Things Work",
        "Plain-language explanations of the technology behind everyday tools",
    ),
    (
        "guides",
        "Guides",
        "Step-by-step walkthroughs for getting real work done with your tools",
    ),
];

const SAMPLE_SLUG: &str = "welcome";

/// Escape a string for a TOML basic string
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Initialize a new site directory.
///
/// Creates `site.toml`, one content directory per starter category and a
/// sample article. The directory is created when missing.
///
/// # Errors
///
/// Returns an error if `site.toml` already exists or a file operation fails.
pub async fn run(path: PathBuf) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    let config_path = path.join(SITE_TOML);
    if config_path.exists() {
        anyhow::bail!(
            "{} already exists at {}\nHint: Delete it first or use a different directory",
            SITE_TOML,
            config_path.display()
        );
    }

    fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let name = site_name_from_path(&path);
    generate_site_toml(&path, &name)?;
    println!("✓ Generated {}", SITE_TOML);

    create_content_structure(&path)?;
    println!("✓ Created {} category directories", STARTER_CATEGORIES.len());

    generate_sample_article(&path)?;
    println!("✓ Added sample article");

    fs::create_dir_all(path.join("public")).context("Failed to create public directory")?;

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── {}             ← Site name, URL and categories", SITE_TOML);
    println!("  ├── public/               ← Static assets copied as-is");
    println!("  └── {}/", DEFAULT_CONTENT_DIR);
    for (slug, _, _) in STARTER_CATEGORIES {
        println!("      └── {}/", slug);
    }

    println!("\nNext steps:");
    println!("  1. Edit {} (set site name, URL and categories)", SITE_TOML);
    println!(
        "  2. Add an article: guidehub new {} --category guides --title \"My First Guide\"",
        path.display()
    );
    println!("  3. Preview: guidehub preview {}", path.display());

    Ok(())
}

fn site_name_from_path(path: &Path) -> String {
    let base = path
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();

    let words: Vec<String> = base
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "My Guide Hub".to_string()
    } else {
        words.join(" ")
    }
}

fn generate_site_toml(base: &Path, name: &str) -> Result<()> {
    let name = toml_escape_string(name);

    let mut toml = format!(
        "# Generated by guidehub init\n\
# Edit this file to customize your site\n\
\n\
[site]\n\
name = \"{name}\"\n\
url = \"https://example.com\"  # TODO: Set production URL\n\
description = \"Practical guides, explainers and tools for developers and professionals\"\n\
author = \"{name}\"\n\
language = \"en\"\n\
locale = \"en-US\"\n\
# twitter_handle = \"@yourhandle\"\n\
\n\
[content]\n\
dir = \"{DEFAULT_CONTENT_DIR}\"\n\
\n"
    );

    for (order, (slug, category, description)) in STARTER_CATEGORIES.iter().enumerate() {
        toml.push_str("[[category]]\n");
        toml.push_str(&format!("slug = \"{}\"\n", slug));
        toml.push_str(&format!("name = \"{}\"\n", toml_escape_string(category)));
        toml.push_str(&format!(
            "description = \"{}\"\n",
            toml_escape_string(description)
        ));
        toml.push_str(&format!("order = {}\n", order + 1));
        if order == 0 {
            toml.push_str("featured = true\n");
        }
        toml.push('\n');
    }

    toml.push_str(
        r##"# Static pages served from public/, listed in the sitemap
# [[page]]
# path = "/about/"
# priority = 0.7

# Tool pages served by another app, listed in the sitemap
# [[tool]]
# path = "/tools/my-calculator"
"##,
    );

    parse_site_toml_str(&toml)
        .context("Generated site.toml is invalid - this is a bug in the template generator")?;

    fs::write(base.join(SITE_TOML), toml)?;

    Ok(())
}

fn create_content_structure(base: &Path) -> Result<()> {
    let content = base.join(DEFAULT_CONTENT_DIR);
    for (slug, _, _) in STARTER_CATEGORIES {
        fs::create_dir_all(content.join(slug))?;
    }
    Ok(())
}

fn generate_sample_article(base: &Path) -> Result<()> {
    let (category, _, _) = STARTER_CATEGORIES[0];
    let today = Local::now().format("%Y-%m-%d");

    let article = format!(
        r##"---
title: "Welcome to your guide hub"
description: "How this site is organized, where articles live and how to publish your first guide."
date: {today}
featured: true
---

# Welcome to your guide hub

Every article is a Markdown file under `{DEFAULT_CONTENT_DIR}/<category>/<slug>.md`.
The file name becomes the slug and the directory becomes the category, so
this page is served at `/{category}/{SAMPLE_SLUG}/`.

## Writing articles

- Front matter needs `title`, `description` and `date`
- Use `featured: true` to show an article on the home page
- List `related` slugs from the same category to pick related articles

Run `guidehub validate` before publishing to catch broken links and
metadata problems.
"##
    );

    fs::write(
        base.join(DEFAULT_CONTENT_DIR)
            .join(category)
            .join(format!("{}.md", SAMPLE_SLUG)),
        article,
    )?;

    Ok(())
}

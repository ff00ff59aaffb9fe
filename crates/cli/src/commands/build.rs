use anyhow::{Context, Result};
use chrono::Utc;
use guidehub_generator::{ContentLoader, generate_site, write_site};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::load_site;

/// Static assets copied verbatim into the output
const PUBLIC_DIR: &str = "public";

/// Build static site for deployment
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let site = load_site(&path)?;

    println!("✓ Loaded: {}", site.name);
    println!("  URL: {}", site.url);
    println!("  Categories: {}", site.categories.len());
    println!();

    let loader = ContentLoader::new(&site, &path);
    if !loader.content_dir().is_dir() {
        anyhow::bail!(
            "Content directory not found: {}",
            loader.content_dir().display()
        );
    }

    let orphans = loader.orphaned_articles();
    if !orphans.is_empty() {
        eprintln!(
            "   ⚠ Warning: {} article(s) in unconfigured categories will be skipped",
            orphans.len()
        );
    }

    println!("📄 Generating pages...");
    let generated = generate_site(&site, &loader, Utc::now()).context("Failed to generate site")?;

    fs::create_dir_all(&output).context("Failed to create output directory")?;
    let written = write_site(&generated, &output).context("Failed to write site")?;
    println!("   ✓ Wrote {} files", written);

    println!("📁 Copying static assets...");
    let copied = copy_public(&path.join(PUBLIC_DIR), &output)?;
    println!("   ✓ Copied {} asset files", copied);

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   cd {} && python3 -m http.server 8000", output.display());
    println!();

    Ok(())
}

/// Copy everything under `public/` into `output`, keeping relative paths
fn copy_public(public: &Path, output: &Path) -> Result<usize> {
    if !public.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(public).min_depth(1) {
        let entry = entry.context("Failed to read public directory")?;
        let relative = entry.path().strip_prefix(public)?;
        let target = output.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_public_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(copy_public(&dir.path().join("public"), dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_copy_public_nested() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let public = src.path().join("public");
        fs::create_dir_all(public.join("images/og")).unwrap();
        fs::write(public.join("favicon.ico"), "icon").unwrap();
        fs::write(public.join("images/og/default.jpg"), "jpg").unwrap();

        assert_eq!(copy_public(&public, out.path()).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(out.path().join("images/og/default.jpg")).unwrap(),
            "jpg"
        );
    }

    #[tokio::test]
    async fn test_build_initialized_site() {
        let dir = TempDir::new().unwrap();
        let site_dir = dir.path().join("hub");
        let out = dir.path().join("dist");
        super::super::init::run(site_dir.clone()).await.unwrap();
        fs::write(site_dir.join("public/robots-extra.txt"), "extra").unwrap();

        run(site_dir, out.clone()).await.unwrap();

        assert!(out.join("index.html").is_file());
        assert!(out.join("how-things-work/index.html").is_file());
        assert!(out.join("how-things-work/welcome/index.html").is_file());
        assert!(out.join("sitemap.xml").is_file());
        assert!(out.join("404.html").is_file());
        assert!(out.join("robots-extra.txt").is_file());
    }

    #[tokio::test]
    async fn test_build_missing_site_fails() {
        let dir = TempDir::new().unwrap();
        let err = run(dir.path().join("nope"), dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}

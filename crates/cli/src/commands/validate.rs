use anyhow::Result;
use guidehub_validator::{ValidationReport, validate_content};
use std::path::PathBuf;

use super::load_site;

/// Validate site.toml and every article; fails when any error is found
pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating site at: {}", path.display());

    let site = load_site(&path)?;
    println!("✓ site.toml valid");
    println!("  Site: {} ({})", site.name, site.url);
    println!("  Categories: {}", site.categories.len());
    println!();

    let report = validate_content(&site, &path);
    print_report(&report);

    if !report.is_ok() {
        anyhow::bail!(
            "Validation failed with {} error(s)",
            report.errors.len()
        );
    }

    println!("\n✅ Validation passed");
    Ok(())
}

fn print_report(report: &ValidationReport) {
    for message in &report.info {
        println!("  ℹ {}", message);
    }
    for message in &report.warnings {
        println!("  ⚠ {}", message);
    }
    for message in &report.errors {
        eprintln!("  ✗ {}", message);
    }

    println!(
        "\n{} error(s), {} warning(s)",
        report.errors.len(),
        report.warnings.len()
    );
}

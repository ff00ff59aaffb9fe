pub mod build;
pub mod init;
pub mod new;
pub mod preview;
pub mod validate;

use anyhow::{Context, Result};
use guidehub_core::SiteConfig;
use guidehub_core::config::{SITE_TOML, parse_site_toml};
use std::path::Path;

/// Load `site.toml` from a site directory with a friendly hint when missing
pub(crate) fn load_site(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        anyhow::bail!(
            "Site directory does not exist: {}\nRun 'guidehub init {}' first",
            path.display(),
            path.display()
        );
    }

    let config_path = path.join(SITE_TOML);
    if !config_path.exists() {
        anyhow::bail!(
            "{} not found in {}\nRun 'guidehub init {}' first",
            SITE_TOML,
            path.display(),
            path.display()
        );
    }

    parse_site_toml(&config_path).with_context(|| format!("Failed to parse {}", SITE_TOML))
}

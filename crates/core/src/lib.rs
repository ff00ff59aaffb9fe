pub mod config;
pub mod error;
pub mod frontmatter;
pub mod slug;
pub mod types;
pub mod url;

pub use config::parse_site_toml;
pub use error::{Error, Result};
pub use frontmatter::{FrontMatter, parse_document};
pub use types::*;

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::Path;

/// Front matter exactly as written in the file
#[derive(Debug, Default, Deserialize)]
struct RawFrontMatter {
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    slug: Option<String>,
    date: Option<String>,
    updated: Option<String>,
    author: Option<String>,
    image: Option<String>,
    #[serde(rename = "ogImage", alias = "og_image")]
    og_image: Option<String>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    related: Vec<String>,
}

/// Validated article front matter
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    /// Declared category; the directory name is authoritative
    pub category: Option<String>,
    /// Declared slug; the file stem is authoritative
    pub slug: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub og_image: Option<String>,
    pub featured: bool,
    pub related: Vec<String>,
}

/// Split a document into its YAML front matter and Markdown body.
///
/// The document must open with a `---` line and the block ends at the next
/// line consisting of `---`. Returns `None` when there is no such block.
pub fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = raw.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse a content file into validated front matter and its Markdown body.
///
/// `path` is only used for error messages.
///
/// # Errors
///
/// Fails when the front matter block is absent, is not valid YAML, lacks
/// `title`, `description` or `date`, or carries an unparseable date.
pub fn parse_document<'a>(raw: &'a str, path: &Path) -> Result<(FrontMatter, &'a str)> {
    let (yaml, body) = split_front_matter(raw)
        .ok_or_else(|| Error::front_matter(path, "missing '---' front matter block"))?;

    let parsed: RawFrontMatter = if yaml.trim().is_empty() {
        RawFrontMatter::default()
    } else {
        serde_yaml::from_str(yaml).map_err(|e| Error::front_matter(path, e.to_string()))?
    };

    let title = non_empty(parsed.title);
    let description = non_empty(parsed.description);
    let date_raw = non_empty(parsed.date);

    let missing: Vec<&str> = [
        ("title", title.is_none()),
        ("description", description.is_none()),
        ("date", date_raw.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    let (Some(title), Some(description), Some(date_raw)) = (title, description, date_raw) else {
        return Err(Error::front_matter(
            path,
            format!("missing required field(s): {}", missing.join(", ")),
        ));
    };

    let date = parse_date(&date_raw)
        .ok_or_else(|| Error::front_matter(path, format!("invalid date '{}'", date_raw)))?;

    let updated = match non_empty(parsed.updated) {
        Some(value) => Some(
            parse_date(&value)
                .ok_or_else(|| Error::front_matter(path, format!("invalid updated '{}'", value)))?,
        ),
        None => None,
    };

    let front_matter = FrontMatter {
        title,
        description,
        date,
        updated,
        category: non_empty(parsed.category),
        slug: non_empty(parsed.slug),
        author: non_empty(parsed.author),
        image: non_empty(parsed.image),
        og_image: non_empty(parsed.og_image),
        featured: parsed.featured,
        related: parsed
            .related
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    };

    Ok((front_matter, body))
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and
/// plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

//! TOML front matter for local project files.
//!
//! A project file starts with a `+++` line, TOML metadata, a closing `+++`
//! line, then the markdown body:
//!
//! ```text
//! +++
//! title = "Atlas"
//! year = 2024
//! tags = ["Rust", "WebGL"]
//! +++
//! Body text...
//! ```

use serde::Deserialize;

use crate::project::{ProjectDetail, ProjectLinks, ProjectRecord};

const DELIMITER: &str = "+++";

/// Metadata block at the top of a project file. Keys other than these are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub year: i32,
    pub period: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub links: Option<ProjectLinks>,
}

impl FrontMatter {
    /// Map the metadata onto a record for `slug`.
    #[must_use]
    pub fn to_project(&self, slug: &str) -> ProjectRecord {
        ProjectRecord {
            slug: slug.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            thumbnail: self.thumbnail.clone().filter(|t| !t.is_empty()),
            blur_data_url: None,
            tags: self.tags.clone(),
            year: self.year,
            period: self.period.clone().filter(|p| !p.is_empty()),
            featured: self.featured,
            images: self.images.clone(),
            links: self
                .links
                .clone()
                .and_then(|l| ProjectLinks::from_parts(l.repository, l.demo)),
        }
    }
}

/// Split a document into its raw front matter and body.
///
/// Returns `None` when the document does not open with a front matter block
/// or the block is never closed.
#[must_use]
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let meta = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((meta, body));
        }
        offset += line.len();
    }
    None
}

/// Parse a whole project file into a detail record.
///
/// # Errors
///
/// Returns a human-readable message when the front matter is missing or invalid.
pub fn parse_document(slug: &str, text: &str) -> Result<ProjectDetail, String> {
    let (meta, body) = split_front_matter(text).ok_or_else(|| {
        format!("expected a front matter block delimited by '{DELIMITER}' lines")
    })?;
    let front: FrontMatter = toml::from_str(meta).map_err(|e| e.message().to_string())?;

    Ok(ProjectDetail {
        project: front.to_project(slug),
        content: body.trim_start_matches(['\r', '\n']).to_string(),
    })
}

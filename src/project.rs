//! Project records shared by every content source.

use serde::{Deserialize, Serialize};

/// One portfolio project, as listed on index pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// URL path segment and lookup key. Empty when the remote row has none.
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Display image: absolute URL or site-rooted path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Tiny inline preview of the thumbnail, set by the thumbnail resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur_data_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub year: i32,
    /// Human readable period, e.g. "2023 – 2024".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default)]
    pub featured: bool,
    /// Gallery images.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ProjectLinks>,
}

/// External links attached to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
}

impl ProjectLinks {
    /// Build links, returning `None` when neither link is present.
    #[must_use]
    pub fn from_parts(repository: Option<String>, demo: Option<String>) -> Option<Self> {
        if repository.is_none() && demo.is_none() {
            None
        } else {
            Some(Self { repository, demo })
        }
    }
}

/// A project fetched for its detail page, with the markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_from_parts() {
        assert_eq!(ProjectLinks::from_parts(None, None), None);
        let links = ProjectLinks::from_parts(Some("https://github.com/x/y".to_string()), None)
            .expect("links");
        assert_eq!(links.repository.as_deref(), Some("https://github.com/x/y"));
        assert!(links.demo.is_none());
    }

    #[test]
    fn test_detail_serializes_flat() {
        let detail = ProjectDetail {
            project: ProjectRecord {
                slug: "atlas".to_string(),
                title: "Atlas".to_string(),
                year: 2023,
                ..ProjectRecord::default()
            },
            content: "Hello".to_string(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["slug"], "atlas");
        assert_eq!(json["content"], "Hello");
        assert!(json.get("blurDataUrl").is_none());
    }
}

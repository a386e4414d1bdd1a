//! Mapping from database rows to [`ProjectRecord`]s.

use serde_json::{json, Value};

use super::types::{plain_text, Page, PropertyValue};
use crate::config::StatusPropertyType;
use crate::constants::{STATUS_IN_PROGRESS, STATUS_ON_HOLD};
use crate::project::{ProjectLinks, ProjectRecord};

/// Property names in the projects database.
pub mod fields {
    pub const TITLE: &str = "Title";
    pub const SLUG: &str = "Slug";
    pub const DESCRIPTION: &str = "Description";
    pub const STATUS: &str = "Status";
    pub const YEAR: &str = "Year";
    pub const TAGS: &str = "Tags";
    pub const PERIOD: &str = "Period";
    pub const THUMBNAIL: &str = "Thumbnail";
    pub const GALLERY: &str = "Gallery";
    pub const REPOSITORY: &str = "Repository";
    pub const DEMO: &str = "Demo";
    pub const PUBLIC: &str = "Public";
}

/// Filter selecting every listable row: public and not on hold.
#[must_use]
pub fn base_filter(status_type: StatusPropertyType) -> Value {
    json!({
        "and": base_conditions(status_type)
    })
}

/// [`base_filter`] narrowed to a single slug.
#[must_use]
pub fn slug_filter(slug: &str, status_type: StatusPropertyType) -> Value {
    let mut conditions = base_conditions(status_type);
    conditions.push(json!({
        "property": fields::SLUG,
        "rich_text": { "equals": slug }
    }));
    json!({ "and": conditions })
}

fn base_conditions(status_type: StatusPropertyType) -> Vec<Value> {
    let mut status = serde_json::Map::new();
    status.insert("property".to_string(), json!(fields::STATUS));
    status.insert(
        status_type.filter_key().to_string(),
        json!({ "does_not_equal": STATUS_ON_HOLD }),
    );

    vec![
        json!({
            "property": fields::PUBLIC,
            "checkbox": { "equals": true }
        }),
        Value::Object(status),
    ]
}

/// Map a row onto a project. Missing properties become empty values; a row
/// without a slug keeps an empty slug.
#[must_use]
pub fn page_to_project(page: &Page) -> ProjectRecord {
    let status = text_property(page, fields::STATUS);

    ProjectRecord {
        slug: text_property(page, fields::SLUG).unwrap_or_default(),
        title: text_property(page, fields::TITLE).unwrap_or_default(),
        description: text_property(page, fields::DESCRIPTION).unwrap_or_default(),
        thumbnail: urls_property(page, fields::THUMBNAIL).into_iter().next(),
        blur_data_url: None,
        tags: tags_property(page, fields::TAGS),
        year: year_property(page, fields::YEAR),
        period: text_property(page, fields::PERIOD),
        featured: status.as_deref() == Some(STATUS_IN_PROGRESS),
        images: urls_property(page, fields::GALLERY),
        links: ProjectLinks::from_parts(
            urls_property(page, fields::REPOSITORY).into_iter().next(),
            urls_property(page, fields::DEMO).into_iter().next(),
        ),
    }
}

/// Slug of a row, `None` when absent or blank.
#[must_use]
pub fn page_slug(page: &Page) -> Option<String> {
    text_property(page, fields::SLUG)
}

/// Text-like property as a trimmed string; `None` when missing or empty.
fn text_property(page: &Page, name: &str) -> Option<String> {
    let text = match page.properties.get(name)? {
        PropertyValue::Title { title } => plain_text(title),
        PropertyValue::RichText { rich_text } => plain_text(rich_text),
        PropertyValue::Select { select } | PropertyValue::Status { status: select } => {
            select.as_ref()?.name.clone()
        }
        PropertyValue::Url { url } => url.clone()?,
        PropertyValue::Number { number } => number.map(|n| n.to_string())?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn year_property(page: &Page, name: &str) -> i32 {
    match page.properties.get(name) {
        Some(PropertyValue::Number { number: Some(n) }) => n.round() as i32,
        Some(_) => text_property(page, name)
            .and_then(|t| t.parse().ok())
            .unwrap_or_default(),
        None => 0,
    }
}

fn tags_property(page: &Page, name: &str) -> Vec<String> {
    match page.properties.get(name) {
        Some(PropertyValue::MultiSelect { multi_select }) => {
            multi_select.iter().map(|o| o.name.clone()).collect()
        }
        Some(PropertyValue::Select { select: Some(o) }) => vec![o.name.clone()],
        _ => Vec::new(),
    }
}

/// URL-like property: a `url` property yields one entry, `files` one per file.
fn urls_property(page: &Page, name: &str) -> Vec<String> {
    match page.properties.get(name) {
        Some(PropertyValue::Url { url: Some(url) }) if !url.is_empty() => vec![url.clone()],
        Some(PropertyValue::Files { files }) => files
            .iter()
            .filter_map(|f| f.url().map(str::to_string))
            .collect(),
        Some(PropertyValue::RichText { rich_text }) => {
            let text = plain_text(rich_text);
            let text = text.trim();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            }
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> Page {
        serde_json::from_value(json!({
            "id": "page-1",
            "properties": {
                "Title": {"type": "title", "title": [{"plain_text": "Atlas"}]},
                "Slug": {"type": "rich_text", "rich_text": [{"plain_text": "atlas"}]},
                "Description": {"type": "rich_text", "rich_text": [{"plain_text": "Maps "}, {"plain_text": "in 3D"}]},
                "Status": {"type": "status", "status": {"name": "In Progress"}},
                "Year": {"type": "number", "number": 2024},
                "Tags": {"type": "multi_select", "multi_select": [{"name": "Rust"}, {"name": "WebGL"}]},
                "Period": {"type": "rich_text", "rich_text": []},
                "Thumbnail": {"type": "files", "files": [
                    {"name": "cover.png", "type": "file", "file": {"url": "https://files.example.com/cover.png"}}
                ]},
                "Gallery": {"type": "files", "files": [
                    {"name": "a", "type": "external", "external": {"url": "https://img.example.com/a.png"}},
                    {"name": "b", "type": "external", "external": {"url": "https://img.example.com/b.png"}}
                ]},
                "Repository": {"type": "url", "url": "https://github.com/example/atlas"},
                "Demo": {"type": "url", "url": null},
                "Public": {"type": "checkbox", "checkbox": true}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_page_to_project() {
        let project = page_to_project(&sample_page());
        assert_eq!(project.slug, "atlas");
        assert_eq!(project.title, "Atlas");
        assert_eq!(project.description, "Maps in 3D");
        assert!(project.featured);
        assert_eq!(project.year, 2024);
        assert_eq!(project.tags, vec!["Rust", "WebGL"]);
        assert_eq!(project.period, None);
        assert_eq!(
            project.thumbnail.as_deref(),
            Some("https://files.example.com/cover.png")
        );
        assert_eq!(project.images.len(), 2);
        let links = project.links.expect("links");
        assert_eq!(links.repository.as_deref(), Some("https://github.com/example/atlas"));
        assert_eq!(links.demo, None);
    }

    #[test]
    fn test_missing_slug_is_kept_empty() {
        let page: Page = serde_json::from_value(json!({
            "id": "page-2",
            "properties": {
                "Title": {"type": "title", "title": [{"plain_text": "Untitled draft"}]},
                "Status": {"type": "select", "select": {"name": "Done"}}
            }
        }))
        .unwrap();
        let project = page_to_project(&page);
        assert_eq!(project.slug, "");
        assert_eq!(project.title, "Untitled draft");
        assert!(!project.featured);
        assert_eq!(project.year, 0);
        assert!(project.links.is_none());
    }

    #[test]
    fn test_slug_filter_includes_base_conditions() {
        let filter = slug_filter("atlas", StatusPropertyType::Status);
        let conditions = filter["and"].as_array().unwrap();
        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0]["checkbox"]["equals"], true);
        assert_eq!(conditions[1]["status"]["does_not_equal"], "On Hold");
        assert_eq!(conditions[2]["rich_text"]["equals"], "atlas");
    }

    #[test]
    fn test_select_typed_status_filter() {
        let filter = base_filter(StatusPropertyType::Select);
        let status = &filter["and"][1];
        assert_eq!(status["property"], "Status");
        assert_eq!(status["select"]["does_not_equal"], "On Hold");
        assert!(status.get("status").is_none());
    }
}

//! Integration tests for the filesystem project store.

use std::path::Path;

use portfolio_content::local::LocalContentStore;
use portfolio_content::{ContentError, ProjectSource};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("Failed to write fixture");
}

fn project_file(title: &str, year: i32, body: &str) -> String {
    format!(
        "+++\ntitle = \"{title}\"\ndescription = \"About {title}\"\ntags = [\"Rust\"]\nyear = {year}\n+++\n\n{body}\n"
    )
}

fn setup() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write(dir.path(), "zephyr.md", &project_file("Zephyr", 2019, "Oldest project."));
    write(dir.path(), "atlas.md", &project_file("Atlas", 2024, "Newest project."));
    write(dir.path(), "meridian.md", &project_file("Meridian", 2021, "Middle project."));
    write(dir.path(), "broken.md", "+++\ntitle = \"Broken\nyear = \n+++\nbody\n");
    write(dir.path(), "notes.txt", "not a project");
    dir
}

#[tokio::test]
async fn test_list_all_sorted_by_year_and_skips_broken_files() {
    let dir = setup();
    let store = LocalContentStore::new(dir.path());

    let projects = store.list_all().await.expect("list_all failed");

    let slugs: Vec<&str> = projects.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["zephyr", "meridian", "atlas"]);
    assert!(projects.windows(2).all(|w| w[0].year < w[1].year));
    assert!(projects.iter().all(|p| p.tags == vec!["Rust".to_string()]));
}

#[tokio::test]
async fn test_every_listed_slug_has_a_body() {
    let dir = setup();
    let store = LocalContentStore::new(dir.path());

    for project in store.list_all().await.unwrap() {
        let detail = store.get_by_slug(&project.slug).await.unwrap();
        assert_eq!(detail.project.slug, project.slug);
        assert!(!detail.content.trim().is_empty());
        assert_eq!(detail.project, project);
    }
}

#[tokio::test]
async fn test_get_by_slug_distinguishes_missing_from_malformed() {
    let dir = setup();
    let store = LocalContentStore::new(dir.path());

    let missing = store.get_by_slug("nope").await.unwrap_err();
    assert!(missing.is_not_found());

    let broken = store.get_by_slug("broken").await.unwrap_err();
    assert!(matches!(broken, ContentError::FrontMatter { .. }));
}

#[tokio::test]
async fn test_source_trait_maps_not_found_to_none() {
    let dir = setup();
    let store = LocalContentStore::new(dir.path());
    let source: &dyn ProjectSource = &store;

    assert!(source.get_by_slug("nope").await.unwrap().is_none());
    assert!(source.get_by_slug("atlas").await.unwrap().is_some());
    assert_eq!(
        source.list_slugs().await.unwrap(),
        vec!["zephyr", "meridian", "atlas"]
    );
}

#[tokio::test]
async fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let store = LocalContentStore::new(dir.path());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_utf8_file_is_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "good.md", &project_file("Good", 2022, "Fine."));
    std::fs::write(dir.path().join("bad.md"), [0xff, 0xfe, b'+', b'+', b'+']).unwrap();
    let store = LocalContentStore::new(dir.path());

    let projects = store.list_all().await.expect("one bad file must not fail the listing");
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].slug, "good");

    let err = store.get_by_slug("bad").await.unwrap_err();
    assert!(matches!(err, ContentError::FrontMatter { .. }));

    let source: &dyn ProjectSource = &store;
    assert!(source.get_by_slug("good").await.unwrap().is_some());
}

#[tokio::test]
async fn test_unrecognised_front_matter_keys_are_listed() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "atlas.md",
        "+++\ntitle = \"Atlas\"\nyear = 2024\ndate = \"2024-01-01\"\norder = 3\n+++\nBody.\n",
    );
    let store = LocalContentStore::new(dir.path());

    let projects = store.list_all().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].title, "Atlas");
    assert_eq!(store.get_by_slug("atlas").await.unwrap().content, "Body.\n");
}

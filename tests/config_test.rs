//! Environment loading tests. These mutate process env so they run serially.

use std::time::Duration;

use portfolio_content::config::{Config, LogFormat};
use serial_test::serial;

const VARS: &[&str] = &[
    "NOTION_API_KEY",
    "NOTION_DATABASE_ID",
    "NOTION_API_BASE",
    "NOTION_VERSION",
    "NOTION_PAGE_SIZE",
    "NOTION_STATUS_TYPE",
    "REMOTE_TIMEOUT_SECS",
    "CONTENT_DIR",
    "PUBLIC_DIR",
    "THUMBNAIL_DIR",
    "THUMBNAIL_URL_PREFIX",
    "BLUR_PREVIEWS",
    "CACHE_WINDOW_SECS",
    "LOG_FORMAT",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_credentials() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert!(config.notion.is_none());
    assert_eq!(config.content_dir.to_str(), Some("content/projects"));
    assert_eq!(config.thumbnail_url_prefix, "/images/projects");
    assert!(config.blur_previews);
    assert_eq!(config.cache_window, Duration::from_secs(3600));
    assert_eq!(config.log_format, LogFormat::Pretty);
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_remote_needs_both_key_and_database() {
    clear_env();
    std::env::set_var("NOTION_API_KEY", "secret_abc");
    assert!(Config::from_env().unwrap().notion.is_none());

    std::env::set_var("NOTION_DATABASE_ID", "db-1");
    std::env::set_var("NOTION_PAGE_SIZE", "50");
    std::env::set_var("CACHE_WINDOW_SECS", "60");
    let config = Config::from_env().unwrap();
    let notion = config.notion.expect("remote should be configured");
    assert_eq!(notion.database_id, "db-1");
    assert_eq!(notion.api_base, "https://api.notion.com");
    assert_eq!(notion.page_size, 50);
    assert_eq!(config.cache_window, Duration::from_secs(60));

    clear_env();
}

#[test]
#[serial]
fn test_malformed_values_are_rejected() {
    clear_env();
    std::env::set_var("BLUR_PREVIEWS", "maybe");
    assert!(Config::from_env().is_err());

    clear_env();
    std::env::set_var("CACHE_WINDOW_SECS", "soon");
    assert!(Config::from_env().is_err());

    clear_env();
    std::env::set_var("THUMBNAIL_URL_PREFIX", "images");
    let config = Config::from_env().unwrap();
    assert!(config.validate().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_log_format_is_available_before_config_loads() {
    clear_env();
    std::env::set_var("LOG_FORMAT", "json");
    std::env::set_var("CACHE_WINDOW_SECS", "abc");
    assert_eq!(LogFormat::from_env(), LogFormat::Json);
    assert!(Config::from_env().is_err());

    std::env::set_var("LOG_FORMAT", "xml");
    assert_eq!(LogFormat::from_env(), LogFormat::Pretty);
    assert!(Config::from_env().is_err());

    clear_env();
}

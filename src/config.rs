use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Remote content (Notion)
    pub notion: Option<NotionConfig>,

    // Local content
    pub content_dir: PathBuf,
    pub public_dir: PathBuf,
    pub thumbnail_dir: PathBuf,
    pub thumbnail_url_prefix: String,
    pub blur_previews: bool,

    // Caching
    pub cache_window: Duration,

    // Logging
    pub log_format: LogFormat,
}

/// Connection settings for the hosted project database.
#[derive(Clone)]
pub struct NotionConfig {
    pub api_base: String,
    pub api_key: String,
    pub database_id: String,
    pub notion_version: String,
    pub page_size: u32,
    pub timeout: Duration,
    /// Property type of the `Status` column; filters must use the same type.
    pub status_type: StatusPropertyType,
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("api_base", &self.api_base)
            .field("database_id", &self.database_id)
            .field("notion_version", &self.notion_version)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .field("status_type", &self.status_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPropertyType {
    #[default]
    Status,
    Select,
}

impl StatusPropertyType {
    /// Key naming this property type in a database query filter.
    #[must_use]
    pub fn filter_key(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Select => "select",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Format named by `LOG_FORMAT`, falling back to pretty output.
    ///
    /// Used to bring logging up before the full configuration is loaded, so
    /// configuration errors are reported. [`Config::from_env`] still rejects
    /// an invalid value.
    #[must_use]
    pub fn from_env() -> Self {
        parse_log_format(&env_or_default("LOG_FORMAT", "pretty")).unwrap_or(Self::Pretty)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The remote client is only configured when both `NOTION_API_KEY` and
    /// `NOTION_DATABASE_ID` are set.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let notion = match (
            optional_env("NOTION_API_KEY"),
            optional_env("NOTION_DATABASE_ID"),
        ) {
            (Some(api_key), Some(database_id)) => Some(NotionConfig {
                api_base: env_or_default("NOTION_API_BASE", "https://api.notion.com"),
                api_key,
                database_id,
                notion_version: env_or_default("NOTION_VERSION", "2022-06-28"),
                page_size: parse_env_u32("NOTION_PAGE_SIZE", 100)?,
                timeout: Duration::from_secs(parse_env_u64("REMOTE_TIMEOUT_SECS", 30)?),
                status_type: parse_status_type(&env_or_default("NOTION_STATUS_TYPE", "status"))?,
            }),
            _ => None,
        };

        Ok(Self {
            notion,

            content_dir: PathBuf::from(env_or_default("CONTENT_DIR", "content/projects")),
            public_dir: PathBuf::from(env_or_default("PUBLIC_DIR", "public")),
            thumbnail_dir: PathBuf::from(env_or_default(
                "THUMBNAIL_DIR",
                "public/images/projects",
            )),
            thumbnail_url_prefix: env_or_default("THUMBNAIL_URL_PREFIX", "/images/projects"),
            blur_previews: parse_env_bool("BLUR_PREVIEWS", true)?,

            cache_window: Duration::from_secs(parse_env_u64("CACHE_WINDOW_SECS", 3600)?),

            log_format: parse_log_format(&env_or_default("LOG_FORMAT", "pretty"))?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(notion) = &self.notion {
            if notion.page_size == 0 || notion.page_size > 100 {
                return Err(ConfigError::InvalidValue {
                    name: "NOTION_PAGE_SIZE".to_string(),
                    message: "must be between 1 and 100".to_string(),
                });
            }
            if !notion.api_base.starts_with("http://") && !notion.api_base.starts_with("https://")
            {
                return Err(ConfigError::InvalidValue {
                    name: "NOTION_API_BASE".to_string(),
                    message: format!("must be an http(s) URL, got '{}'", notion.api_base),
                });
            }
        }
        if !self.thumbnail_url_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                name: "THUMBNAIL_URL_PREFIX".to_string(),
                message: "must start with '/'".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration rooted at the current directory with no remote client.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            notion: None,
            content_dir: PathBuf::from("content/projects"),
            public_dir: PathBuf::from("public"),
            thumbnail_dir: PathBuf::from("public/images/projects"),
            thumbnail_url_prefix: "/images/projects".to_string(),
            blur_previews: false,
            cache_window: Duration::from_secs(3600),
            log_format: LogFormat::Pretty,
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_status_type(value: &str) -> Result<StatusPropertyType, ConfigError> {
    match value.to_lowercase().as_str() {
        "status" => Ok(StatusPropertyType::Status),
        "select" => Ok(StatusPropertyType::Select),
        _ => Err(ConfigError::InvalidValue {
            name: "NOTION_STATUS_TYPE".to_string(),
            message: format!("must be 'status' or 'select', got '{value}'"),
        }),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.to_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" | "structured" => Ok(LogFormat::Json),
        _ => Err(ConfigError::InvalidValue {
            name: "LOG_FORMAT".to_string(),
            message: format!("must be 'pretty' or 'json', got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert_eq!(parse_log_format("json").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format("STRUCTURED").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format("pretty").unwrap(), LogFormat::Pretty);
        assert!(parse_log_format("xml").is_err());
    }

    #[test]
    fn test_parse_status_type() {
        assert_eq!(parse_status_type("select").unwrap(), StatusPropertyType::Select);
        assert_eq!(parse_status_type("Status").unwrap(), StatusPropertyType::Status);
        assert!(parse_status_type("multi_select").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_env_bool("NONEXISTENT_VAR", true).unwrap());
        assert!(!parse_env_bool("NONEXISTENT_VAR", false).unwrap());
    }

    #[test]
    fn test_validate_page_size() {
        let mut config = Config::for_testing();
        config.notion = Some(NotionConfig {
            api_base: "https://api.notion.com".to_string(),
            api_key: "secret".to_string(),
            database_id: "db".to_string(),
            notion_version: "2022-06-28".to_string(),
            page_size: 0,
            timeout: Duration::from_secs(5),
            status_type: StatusPropertyType::Status,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let notion = NotionConfig {
            api_base: "https://api.notion.com".to_string(),
            api_key: "secret_token".to_string(),
            database_id: "db".to_string(),
            notion_version: "2022-06-28".to_string(),
            page_size: 100,
            timeout: Duration::from_secs(5),
            status_type: StatusPropertyType::Status,
        };
        assert!(!format!("{notion:?}").contains("secret_token"));
    }
}

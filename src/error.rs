use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the content sources.
///
/// Sources report failures faithfully; only the resolver decides whether a
/// failure is swallowed in favour of the fallback source.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("project not found: {slug}")]
    NotFound { slug: String },

    #[error("request to content API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content API returned {status} ({code}): {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid front matter in {}: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub(crate) fn not_found(slug: &str) -> Self {
        Self::NotFound {
            slug: slug.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error means "this slug does not exist in the source".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for failures talking to the remote API (network, non-2xx, bad JSON).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Remote { .. } | Self::Decode { .. }
        )
    }
}

pub type Result<T, E = ContentError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = ContentError::Remote {
            status: 401,
            code: "unauthorized".to_string(),
            message: "API token is invalid.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "content API returned 401 (unauthorized): API token is invalid."
        );
        assert!(err.is_transport());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found() {
        let err = ContentError::not_found("ghost");
        assert!(err.is_not_found());
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "project not found: ghost");
    }
}

//! Filesystem-backed project store.
//!
//! One markdown file per project (`{slug}.md`) with TOML front matter. This is
//! the offline fallback used whenever the remote database is unreachable.

mod front_matter;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ContentError, Result};
use crate::project::{ProjectDetail, ProjectRecord};
use crate::source::ProjectSource;

pub use front_matter::{parse_document, split_front_matter, FrontMatter};

const CONTENT_EXTENSION: &str = "md";

/// Reads project files from a single directory.
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    dir: PathBuf,
}

impl LocalContentStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read every project file, sorted ascending by year.
    ///
    /// Files that cannot be read, are not UTF-8 or have broken front matter
    /// are skipped and logged; they never produce a partial record.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory itself cannot be read.
    pub async fn list_all(&self) -> Result<Vec<ProjectRecord>> {
        let mut paths = self.content_files().await?;
        paths.sort();

        let mut projects = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable project file");
                    continue;
                }
            };
            match decode_document(slug, bytes) {
                Ok(detail) => projects.push(detail.project),
                Err(message) => {
                    warn!(path = %path.display(), error = %message, "Skipping project file with invalid front matter");
                }
            }
        }

        projects.sort_by_key(|p| p.year);
        debug!(dir = %self.dir.display(), count = projects.len(), "Loaded local projects");
        Ok(projects)
    }

    /// Read the project file for `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotFound`] when no file exists for the slug,
    /// [`ContentError::FrontMatter`] when it cannot be parsed, and
    /// [`ContentError::Io`] for any other read failure.
    pub async fn get_by_slug(&self, slug: &str) -> Result<ProjectDetail> {
        if !is_safe_slug(slug) {
            return Err(ContentError::not_found(slug));
        }

        let path = self.dir.join(format!("{slug}.{CONTENT_EXTENSION}"));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::not_found(slug));
            }
            Err(e) => return Err(ContentError::io(path, e)),
        };

        decode_document(slug, bytes).map_err(|message| ContentError::FrontMatter { path, message })
    }

    async fn content_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| ContentError::io(&self.dir, e))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ContentError::io(&self.dir, e))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| ContentError::io(&path, e))?
                .is_file();
            if is_file && path.extension().is_some_and(|ext| ext == CONTENT_EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

/// Parse raw file contents; bad encoding counts as a malformed document.
fn decode_document(slug: &str, bytes: Vec<u8>) -> Result<ProjectDetail, String> {
    let text = String::from_utf8(bytes).map_err(|e| format!("file is not valid UTF-8: {e}"))?;
    parse_document(slug, &text)
}

/// Slugs name a file directly inside the content directory, nothing else.
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0'])
}

#[async_trait]
impl ProjectSource for LocalContentStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list_all(&self) -> Result<Vec<ProjectRecord>> {
        LocalContentStore::list_all(self).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ProjectDetail>> {
        match LocalContentStore::get_by_slug(self, slug).await {
            Ok(detail) => Ok(Some(detail)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
